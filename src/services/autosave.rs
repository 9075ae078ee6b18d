//! # 자동 저장(Autosave) 컨트롤러
//!
//! 에디터 하나(=브라우저 탭 하나)의 초안 상태를 소유하고, 잦은 입력 이벤트를
//! 드문 저장 호출로 바꿔 줍니다.
//!
//! ## 동작 규칙
//! - `on_edit`: 대기 중인 텍스트를 즉시 바꾸고, 타이머를 취소 후 다시 겁니다.
//!   (trailing-edge 디바운스. 선행 호출도, 최대 대기 시간도 없습니다.
//!   쉬지 않고 계속 입력하면 입력이 멈출 때까지 저장하지 않습니다.)
//! - 타이머 만료: `{draft_title, updated_at}` 한 번 쓰기. 저장 중에 들어온 입력은
//!   다음 디바운스 주기에서 저장됩니다.
//! - `publish`: 디바운스와 무관하게 즉시 `{published_title, published_at}` 쓰기.
//!   대기 중인 타이머는 건드리지 않으므로 두 쓰기 경로 사이에 순서 보장은 없습니다.
//! - 언마운트: 타이머를 취소하고 마지막 저장을 하지 않습니다. 마지막 디바운스
//!   간격 안의 입력은 사라집니다.
//!
//! 타이머는 세션 객체가 소유한 tokio 태스크입니다. 태스크는 세션을 `Weak`로만
//! 잡고 있으므로, 세션이 사라지면 깨어나도 아무 일도 하지 않습니다.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{
    public_url, DraftUpdate, EditorPhase, EditorStatus, PublishReceipt, PublishUpdate, HOME_SLUG,
};
use crate::store::{RecordStore, StoreError};

pub struct AutosaveController {
    shared: Arc<Shared>,
}

struct Shared {
    store: Arc<dyn RecordStore>,
    /// 인증된 소유자. 없으면 저장과 발행이 모두 조용히 아무 일도 하지 않습니다.
    owner_id: Option<String>,
    username: String,
    slug: String,
    debounce: Duration,
    state: Mutex<EditorState>,
    /// 한 세션의 초안 쓰기가 발행된 순서대로 저장소에 도착하도록 직렬화합니다.
    write_gate: tokio::sync::Mutex<()>,
}

struct EditorState {
    pending_text: String,
    timer: Option<JoinHandle<()>>,
    /// 입력마다 증가. 타이머는 자신이 걸릴 때의 세대와 같을 때만 저장합니다.
    generation: u64,
    phase: EditorPhase,
    in_flight: usize,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Drop for EditorState {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl AutosaveController {
    pub fn new(
        store: Arc<dyn RecordStore>,
        owner_id: Option<String>,
        username: String,
        initial_draft: String,
        debounce: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                owner_id,
                username,
                slug: HOME_SLUG.to_string(),
                debounce,
                state: Mutex::new(EditorState {
                    pending_text: initial_draft,
                    timer: None,
                    generation: 0,
                    phase: EditorPhase::Idle,
                    in_flight: 0,
                    last_saved_at: None,
                    last_error: None,
                }),
                write_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// 입력 이벤트 하나. 블로킹하지 않으며 tokio 런타임 안에서 호출해야 합니다.
    pub fn on_edit(&self, text: impl Into<String>) {
        let mut state = self.shared.lock_state();
        state.pending_text = text.into();
        state.generation += 1;
        state.phase = EditorPhase::PendingWrite;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let generation = state.generation;
        let debounce = self.shared.debounce;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(shared) = shared.upgrade() {
                shared.flush(generation).await;
            }
        }));
    }

    /// 현재 초안을 즉시 발행합니다. 소유자가 없으면 `Ok(None)`.
    pub async fn publish(&self) -> Result<Option<PublishReceipt>, StoreError> {
        let Some(owner_id) = self.shared.owner_id.as_deref() else {
            debug!("Publish requested without an owner; ignoring");
            return Ok(None);
        };

        let update = PublishUpdate {
            published_title: self.shared.lock_state().pending_text.clone(),
            published_at: Utc::now(),
        };
        self.shared
            .store
            .publish_page(owner_id, &self.shared.slug, &update)
            .await?;

        let url = public_url(&self.shared.username);
        info!(owner_id, public_url = %url, "Page published");
        Ok(Some(PublishReceipt {
            public_url: url,
            published_title: update.published_title,
            published_at: update.published_at,
        }))
    }

    pub fn status(&self) -> EditorStatus {
        let state = self.shared.lock_state();
        EditorStatus {
            phase: state.phase,
            draft: state.pending_text.clone(),
            saving: state.in_flight > 0,
            last_saved_at: state.last_saved_at,
            last_error: state.last_error.clone(),
        }
    }

    /// 타이머를 취소합니다. 아직 저장되지 않은 입력은 버려집니다.
    pub fn unmount(&self) {
        let mut state = self.shared.lock_state();
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if state.phase == EditorPhase::PendingWrite {
            debug!(owner_id = ?self.shared.owner_id, "Editor unmounted with an unsaved edit");
        }
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn flush(&self, generation: u64) {
        let Some(owner_id) = self.owner_id.as_deref() else {
            let mut state = self.lock_state();
            if state.generation == generation {
                state.timer = None;
                state.phase = EditorPhase::Idle;
            }
            return;
        };

        let text = {
            let mut state = self.lock_state();
            if state.generation != generation {
                return;
            }
            // 이 태스크가 곧 타이머. 이후의 입력이 진행 중인 쓰기를 취소하지 않도록 분리합니다.
            state.timer = None;
            state.phase = EditorPhase::Saving;
            state.in_flight += 1;
            state.pending_text.clone()
        };

        let result = {
            let _gate = self.write_gate.lock().await;
            let update = DraftUpdate {
                draft_title: text,
                updated_at: Utc::now(),
            };
            self.store
                .update_draft(owner_id, &self.slug, &update)
                .await
                .map(|()| update.updated_at)
        };

        let mut state = self.lock_state();
        state.in_flight -= 1;
        let settled = state.generation == generation && state.in_flight == 0;
        match result {
            Ok(saved_at) => {
                debug!(owner_id, "Draft saved");
                state.last_saved_at = Some(saved_at);
                state.last_error = None;
                if settled {
                    state.phase = EditorPhase::Saved;
                }
            }
            Err(err) => {
                warn!(owner_id, error = %err, "Draft autosave failed");
                state.last_error = Some(err.to_string());
                if settled {
                    state.phase = EditorPhase::Idle;
                }
            }
        }
    }
}
