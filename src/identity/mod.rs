//! # 인증 서비스 포트 (Identity Provider)
//!
//! 이 서버는 인증을 직접 구현하지 않습니다. 비밀번호 검증, 토큰 발급, 세션 만료는
//! 모두 외부 인증 서비스가 처리하고, 여기서는 그 결과만 소비합니다.
//!
//! - `supabase`: Supabase Auth(GoTrue) REST 어댑터
//! - `memory`: 테스트 전용 가짜 인증 서비스

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AuthSession, Identity};

#[cfg(test)]
pub mod memory;
pub mod supabase;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// 인증 서비스가 요청을 거절함. 메시지는 사용자에게 그대로 보여줍니다.
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// 가입에 성공해도 이메일 확인이 필요한 프로젝트에서는 세션이 없습니다 (`Ok(None)`).
    async fn sign_up(&self, email: &str, password: &str)
        -> Result<Option<AuthSession>, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError>;

    /// 토큰이 가리키는 사용자. 토큰이 유효하지 않거나 만료되었으면 `Ok(None)`.
    async fn current_session(&self, access_token: &str)
        -> Result<Option<Identity>, IdentityError>;
}
