//! # Supabase Auth(GoTrue) 어댑터
//!
//! 비밀번호 로그인, 가입, 로그아웃, 토큰 갱신, 현재 사용자 조회를
//! `/auth/v1/*` REST 호출로 처리합니다.
//!
//! | 동작 | 엔드포인트 |
//! |---|---|
//! | 로그인 | `POST /auth/v1/token?grant_type=password` |
//! | 갱신 | `POST /auth/v1/token?grant_type=refresh_token` |
//! | 가입 | `POST /auth/v1/signup` |
//! | 로그아웃 | `POST /auth/v1/logout` |
//! | 현재 사용자 | `GET /auth/v1/user` |
//!
//! 4xx 응답은 `IdentityError::Rejected`가 되고, 메시지는 가공 없이 사용자에게 전달됩니다.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{IdentityError, IdentityProvider};
use crate::models::{AuthSession, Identity};

#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: reqwest::Client,
    supabase_url: String,
    anon_key: String,
}

/// GoTrue의 에러 본문은 버전마다 모양이 달라서, 있는 메시지 필드를 순서대로 찾습니다.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

impl SupabaseAuth {
    pub fn new(
        http_client: reqwest::Client,
        supabase_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            supabase_url: supabase_url.into(),
            anon_key: anon_key.into(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url, path)
    }

    async fn post_credentials(
        &self,
        url: String,
        body: &Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response)
    }
}

async fn rejection(response: reqwest::Response) -> IdentityError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Auth request rejected");

    let message = serde_json::from_str::<GoTrueErrorBody>(&body)
        .ok()
        .and_then(GoTrueErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
    IdentityError::Rejected(message)
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        debug!(email = %email, "Attempting email/password sign-in");
        let response = self
            .post_credentials(
                self.auth_url("token?grant_type=password"),
                &json!({ "email": email, "password": password }),
            )
            .await?;

        let session: AuthSession = response.json().await?;
        info!(user_id = %session.user.id, "Sign-in successful");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, IdentityError> {
        debug!(email = %email, "Attempting sign-up");
        let response = self
            .post_credentials(
                self.auth_url("signup"),
                &json!({ "email": email, "password": password }),
            )
            .await?;

        // 이메일 확인이 켜진 프로젝트는 세션 없이 사용자 객체만 돌려줍니다.
        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(body)?;
            info!(user_id = %session.user.id, "Sign-up successful");
            Ok(Some(session))
        } else {
            info!("Sign-up accepted, awaiting email confirmation");
            Ok(None)
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http_client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .post_credentials(
                self.auth_url("token?grant_type=refresh_token"),
                &json!({ "refresh_token": refresh_token }),
            )
            .await?;

        let session: AuthSession = response.json().await?;
        debug!(user_id = %session.user.id, "Session refreshed");
        Ok(session)
    }

    async fn current_session(
        &self,
        access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .http_client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            debug!(status = %status, "Session rejected by auth service");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(rejection(response).await);
        }

        Ok(Some(response.json().await?))
    }
}

impl std::fmt::Debug for SupabaseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseAuth")
            .field("supabase_url", &self.supabase_url)
            .finish_non_exhaustive()
    }
}
