//! # 에디터 세션 레지스트리
//!
//! 마운트된 자동 저장 컨트롤러를 에디터 ID로 보관합니다. 대시보드 화면 하나가
//! 에디터 세션 하나이며, 같은 사용자가 탭을 여러 개 열면 세션도 여러 개입니다.
//!
//! 세션 조회는 항상 소유자 ID와 함께 합니다. 다른 사용자의 에디터 ID를 알아도
//! 조회 결과는 "없음"입니다.
//!
//! ## 수명
//! - 사용자당 최대 `MAX_EDITORS_PER_OWNER`개, 넘으면 가장 오래된 세션부터 언마운트
//! - 조회(입력/상태/발행)가 없는 채로 `idle` 시간이 지나면 주기적 정리 작업이 언마운트
//!
//! 어느 쪽이든 대기 중인 자동 저장은 명시적 언마운트와 똑같이 버려집니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use super::autosave::AutosaveController;

/// 한 사용자가 동시에 가질 수 있는 에디터 수. 넘으면 가장 오래된 세션을 언마운트합니다.
pub const MAX_EDITORS_PER_OWNER: usize = 8;

/// 유휴 세션 정리 주기의 상한
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct EditorSession {
    pub id: String,
    pub owner_id: String,
    pub controller: AutosaveController,
    last_active: Mutex<Instant>,
}

impl EditorSession {
    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last_active = *self.last_active.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_active)
    }
}

#[derive(Clone, Default)]
pub struct EditorRegistry {
    editors: Arc<RwLock<HashMap<String, Arc<EditorSession>>>>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, owner_id: &str, controller: AutosaveController) -> Arc<EditorSession> {
        // UUID v7: 시간순 정렬이 가능하므로 "가장 오래된 세션"을 ID 비교로 찾을 수 있습니다.
        let session = Arc::new(EditorSession {
            id: Uuid::now_v7().to_string(),
            owner_id: owner_id.to_string(),
            controller,
            last_active: Mutex::new(Instant::now()),
        });

        let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<String> = editors
            .values()
            .filter(|s| s.owner_id == owner_id)
            .map(|s| s.id.clone())
            .collect();
        owned.sort();
        let excess = (owned.len() + 1).saturating_sub(MAX_EDITORS_PER_OWNER);
        for id in owned.into_iter().take(excess) {
            if let Some(evicted) = editors.remove(&id) {
                evicted.controller.unmount();
                debug!(editor_id = %id, owner_id, "Evicted oldest editor session");
            }
        }

        editors.insert(session.id.clone(), session.clone());
        info!(editor_id = %session.id, owner_id, "Editor mounted");
        session
    }

    /// 소유자가 일치할 때만 세션을 돌려줍니다. 조회는 활동으로 기록됩니다.
    pub fn get(&self, id: &str, owner_id: &str) -> Option<Arc<EditorSession>> {
        let session = self
            .editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .filter(|s| s.owner_id == owner_id)
            .cloned()?;
        session.touch();
        Some(session)
    }

    /// 세션을 제거하고 타이머를 취소합니다. 저장되지 않은 입력은 버려집니다.
    pub fn unmount(&self, id: &str, owner_id: &str) -> bool {
        let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
        match editors.get(id) {
            Some(session) if session.owner_id == owner_id => {}
            _ => return false,
        }
        if let Some(session) = editors.remove(id) {
            session.controller.unmount();
            info!(editor_id = %id, owner_id, "Editor unmounted");
        }
        true
    }

    /// 로그아웃: 해당 사용자의 모든 세션을 언마운트합니다.
    pub fn unmount_owner(&self, owner_id: &str) -> usize {
        let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
        let ids: Vec<String> = editors
            .values()
            .filter(|s| s.owner_id == owner_id)
            .map(|s| s.id.clone())
            .collect();
        for id in &ids {
            if let Some(session) = editors.remove(id) {
                session.controller.unmount();
            }
        }
        if !ids.is_empty() {
            info!(owner_id, count = ids.len(), "Unmounted editors on logout");
        }
        ids.len()
    }

    /// `max_idle` 이상 활동이 없던 세션을 모두 언마운트하고 개수를 돌려줍니다.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
        let idle: Vec<String> = editors
            .values()
            .filter(|s| s.idle_for(now) >= max_idle)
            .map(|s| s.id.clone())
            .collect();
        for id in &idle {
            if let Some(session) = editors.remove(id) {
                session.controller.unmount();
                debug!(editor_id = %id, owner_id = %session.owner_id, "Idle editor unmounted");
            }
        }
        if !idle.is_empty() {
            info!(count = idle.len(), remaining = editors.len(), "Swept idle editors");
        }
        idle.len()
    }

    /// 유휴 세션 정리 작업을 백그라운드에서 돌립니다.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = max_idle.min(SWEEP_INTERVAL).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                registry.sweep_idle(max_idle);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
