use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 사용자당 페이지는 하나뿐이므로 slug는 항상 이 값입니다.
pub const HOME_SLUG: &str = "home";

/// 저장된 페이지가 없을 때 초안 제목의 기본값
pub const DEFAULT_DRAFT_TITLE: &str = "Untitled page";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub owner_id: String,
    pub slug: String,
    pub draft_title: String,
    pub published_title: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// `ensure_page`로 넣는 행. 이미 (owner_id, slug) 행이 있으면 아무것도 바꾸지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct NewPage {
    pub owner_id: String,
    pub slug: String,
    pub draft_title: String,
    pub updated_at: DateTime<Utc>,
}

impl NewPage {
    pub fn home(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            slug: HOME_SLUG.to_string(),
            draft_title: DEFAULT_DRAFT_TITLE.to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// 자동 저장 한 번에 쓰는 부분 레코드. 발행 컬럼은 건드리지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftUpdate {
    pub draft_title: String,
    pub updated_at: DateTime<Utc>,
}

/// 발행 한 번에 쓰는 부분 레코드. 두 필드는 항상 함께 바뀝니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishUpdate {
    pub published_title: String,
    pub published_at: DateTime<Utc>,
}
