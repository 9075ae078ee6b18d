//! # 레코드 저장소 계층 (Record Store)
//!
//! `profiles`, `pages` 두 논리 테이블에 대한 읽기/쓰기를 추상화한 포트입니다.
//! 라우트 핸들러와 자동 저장 컨트롤러는 이 트레잇만 알고, 실제 저장소가
//! 호스팅 REST 서비스인지 로컬 SQLite인지는 모릅니다.
//!
//! 각 하위 모듈:
//! - `postgrest`: Supabase REST(PostgREST) 어댑터 (기본값)
//! - `sqlite`: `DATABASE_URL`이 설정된 경우의 자체 호스팅 어댑터
//! - `memory`: 테스트 전용 인메모리 어댑터
//!
//! ## 조회 결과 규칙
//! 단일 행 조회는 `Ok(None)`으로 "행 없음"을 표현합니다. 이는 실패가 아니라
//! "아직 만들어지지 않음"이며, 호출자가 기본값 생성으로 이어갑니다.
//! 그 외의 모든 문제는 `Err(StoreError)`입니다.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DraftUpdate, NewPage, Page, Profile, PublishUpdate};

#[cfg(test)]
pub mod memory;
pub mod postgrest;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum StoreError {
    /// 전송 계층 오류 (연결 실패, 타임아웃, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 저장소가 성공이 아닌 상태 코드를 반환함 (RLS 거부, 스키마 불일치 등)
    #[error("store rejected request: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// `profiles`/`pages` 테이블에 대해 이 서비스가 사용하는 연산 전부
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// id 기준 insert-or-replace. 같은 값으로 반복 호출해도 결과가 같습니다.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// 사용자명이 정확히 한 행과 일치할 때만 `Some`을 반환합니다.
    async fn find_profile_by_username(&self, username: &str)
        -> Result<Option<Profile>, StoreError>;

    /// (owner_id, slug) 행이 없을 때만 만듭니다. 기존 초안은 절대 덮어쓰지 않습니다.
    async fn ensure_page(&self, page: &NewPage) -> Result<(), StoreError>;

    async fn find_page(&self, owner_id: &str, slug: &str) -> Result<Option<Page>, StoreError>;

    /// `draft_title`, `updated_at`만 바꿉니다.
    async fn update_draft(
        &self,
        owner_id: &str,
        slug: &str,
        update: &DraftUpdate,
    ) -> Result<(), StoreError>;

    /// `published_title`, `published_at`만 함께 바꿉니다.
    async fn publish_page(
        &self,
        owner_id: &str,
        slug: &str,
        update: &PublishUpdate,
    ) -> Result<(), StoreError>;
}

/// 호출자의 자격 증명에 묶인 저장소를 내어 줍니다.
///
/// 호스팅 REST 저장소는 행 수준 보안(RLS)을 로그인한 사용자 권한으로 평가하므로
/// 요청마다 그 사용자의 액세스 토큰이 필요합니다. 로컬 SQLite는 토큰을 무시합니다.
pub trait StoreProvider: Send + Sync {
    /// 헬스체크/로그에 표시할 백엔드 이름
    fn name(&self) -> &'static str;

    fn scoped(&self, access_token: Option<&str>) -> Arc<dyn RecordStore>;
}
