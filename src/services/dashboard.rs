//! # 대시보드 진입(hydration)
//!
//! 로그인한 사용자가 대시보드를 열 때 한 번 실행됩니다.
//! 1. 이메일에서 사용자명을 만들어 프로필을 upsert
//! 2. 홈 페이지 행을 조회. 있으면 저장된 초안으로, 없으면 기본값으로 시작
//! 3. 행이 없었다면 기본 행을 만듭니다 (이미 있으면 아무것도 바꾸지 않음)
//!
//! 이 과정의 저장소 에러는 화면을 막지 않습니다. 로그만 남기고 기본값으로 진행합니다.

use tracing::{debug, error, warn};

use crate::models::{Identity, NewPage, Profile, DEFAULT_DRAFT_TITLE, HOME_SLUG};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated {
    pub username: String,
    pub draft_title: String,
}

pub async fn hydrate(store: &dyn RecordStore, user: &Identity) -> Hydrated {
    let profile = Profile::for_user(&user.id, user.email.as_deref());
    if let Err(e) = store.upsert_profile(&profile).await {
        warn!(owner_id = %user.id, error = %e, "Profile upsert failed");
    }

    let existing = match store.find_page(&user.id, HOME_SLUG).await {
        Ok(page) => page,
        Err(e) => {
            error!(owner_id = %user.id, error = %e, "Page lookup failed, starting from defaults");
            None
        }
    };

    let draft_title = match existing {
        Some(page) => page.draft_title,
        None => {
            debug!(owner_id = %user.id, "No home page yet, creating default row");
            if let Err(e) = store.ensure_page(&NewPage::home(&user.id)).await {
                warn!(owner_id = %user.id, error = %e, "Default page creation failed");
            }
            DEFAULT_DRAFT_TITLE.to_string()
        }
    };

    Hydrated {
        username: profile.username,
        draft_title,
    }
}
