use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 에디터 세션의 자동 저장 상태
///
/// ```text
/// Idle ──edit──▶ PendingWrite ──timer──▶ Saving ──done──▶ Saved
///   ▲                 ▲  │edit                │edit
///   │                 └──┘◀───────────────────┘
///   └──────────── write failed (last_error 설정) ◀─ Saving
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorPhase {
    Idle,
    PendingWrite,
    Saving,
    Saved,
}

/// `GET /api/v1/editors/{id}` 응답: 화면의 "Saving… / Saved 12:00:01" 표시용
#[derive(Debug, Clone, Serialize)]
pub struct EditorStatus {
    pub phase: EditorPhase,
    pub draft: String,
    pub saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditDraftRequest {
    pub text: String,
}

/// 대시보드 진입 시 클라이언트가 받는 초기 상태
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub editor_id: String,
    pub username: String,
    pub draft_title: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub public_url: String,
    pub published_title: String,
    pub published_at: DateTime<Utc>,
}

/// 공개 페이지에 그릴 내용. 존재하지 않는 사용자는 `found = false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicPage {
    pub username: String,
    pub found: bool,
    pub published_title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

pub fn public_url(username: &str) -> String {
    format!("/web/{}", username)
}
