//! 로그인과 가입을 하나의 폼으로 처리합니다.
//!
//! 로그인이 실패하면 같은 자격 증명으로 가입을 시도합니다. 가입까지 실패하면
//! 가입 쪽 에러를 그대로 돌려줍니다 (로그인 에러는 로그에만 남습니다).

use tracing::debug;

use crate::identity::{IdentityError, IdentityProvider};
use crate::models::AuthSession;

/// 성공 후 이동할 경로. 세션이 없는 경우(이메일 확인 대기)에도 같습니다.
pub const AFTER_LOGIN: &str = "/dashboard";

pub async fn sign_in_or_register(
    identity: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<Option<AuthSession>, IdentityError> {
    match identity.sign_in_with_password(email, password).await {
        Ok(session) => Ok(Some(session)),
        Err(sign_in_error) => {
            debug!(error = %sign_in_error, "Sign-in failed, attempting sign-up");
            identity.sign_up(email, password).await
        }
    }
}
