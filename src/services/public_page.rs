//! # 공개 페이지 서비스
//!
//! `/web/{username}` 요청을 읽기 전용으로 해석합니다.
//! 누구나 볼 수 있으므로 항상 익명 저장소로 조회하고, 발행된 제목만 노출합니다.
//! 초안(draft)은 어떤 경우에도 이 경로로 새어 나가지 않습니다.

use tracing::warn;

use crate::models::{PublicPage, HOME_SLUG};
use crate::store::RecordStore;

pub const USER_NOT_FOUND: &str = "User not found";
pub const NO_TITLE_YET: &str = "No title set yet";
pub const UNKNOWN_USER_DESCRIPTION: &str = "User site";

/// username으로 프로필과 홈 페이지를 찾아 공개용 뷰를 만듭니다.
/// 저장소 에러는 로그만 남기고 "없음"으로 취급합니다.
pub async fn resolve(store: &dyn RecordStore, username: &str) -> PublicPage {
    let profile = match store.find_profile_by_username(username).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(username, error = %e, "Profile lookup failed");
            None
        }
    };
    let Some(profile) = profile else {
        return PublicPage {
            username: username.to_string(),
            found: false,
            published_title: None,
            published_at: None,
        };
    };

    let page = match store.find_page(&profile.id, HOME_SLUG).await {
        Ok(page) => page,
        Err(e) => {
            warn!(username, error = %e, "Page lookup failed");
            None
        }
    };

    PublicPage {
        username: profile.username,
        found: true,
        published_title: page.as_ref().and_then(|p| p.published_title.clone()),
        published_at: page.and_then(|p| p.published_at),
    }
}

impl PublicPage {
    /// 본문 제목: 발행된 제목, 없으면 안내 문구
    pub fn heading(&self) -> &str {
        match (&self.published_title, self.found) {
            (_, false) => USER_NOT_FOUND,
            (Some(title), true) => title.as_str(),
            (None, true) => NO_TITLE_YET,
        }
    }

    /// 문서 제목(<title>): 발행된 제목, 없으면 username
    pub fn document_title(&self) -> &str {
        self.published_title.as_deref().unwrap_or(&self.username)
    }

    /// 검색/공유용 설명 문구
    pub fn description(&self) -> String {
        if self.found {
            format!("Page by {}", self.username)
        } else {
            UNKNOWN_USER_DESCRIPTION.to_string()
        }
    }
}
