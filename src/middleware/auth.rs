//! # 인증 미들웨어
//!
//! 요청마다 세션을 확인해 `AuthUser`를 만들어 줍니다.
//! - API 라우트: `AuthUser` 추출자가 실패하면 401 JSON
//! - 페이지 라우트: `require_session` 가드가 `/login`으로 리다이렉트
//!
//! `SUPABASE_JWT_SECRET`이 있으면 HS256 서명과 만료를 직접 검증하고,
//! 없으면 인증 서비스에 현재 사용자를 물어봅니다.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use axum_extra::extract::cookie::CookieJar;

use super::cookies::{token, ACCESS_COOKIE};
use crate::models::Identity;
use crate::routes::AppState;

/// 인증 서비스가 사용자 액세스 토큰에 넣는 audience
pub const TOKEN_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: Identity,
    /// 저장소 호출에 그대로 전달해 행 단위 권한(RLS)이 적용되게 합니다.
    pub access_token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await
    }
}

/// 페이지 라우트용 가드: 세션이 없으면 `/login`으로 보냅니다.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers().clone();
    match authenticate(&headers, &state).await {
        Ok(auth) => {
            debug!(user_id = %auth.user.id, "Session accepted");
            next.run(request).await
        }
        Err(err) => {
            debug!(?err, "No usable session, redirecting to login");
            Redirect::to("/login").into_response()
        }
    }
}

pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthUser, AuthError> {
    let token = access_token(headers)?;

    let user = match state.jwt_secret.as_deref() {
        Some(secret) => {
            let claims = verify_access_token(&token, secret)?;
            Identity {
                id: claims.sub,
                email: claims.email,
            }
        }
        None => state
            .identity
            .current_session(&token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Session lookup failed");
                AuthError::ProviderUnavailable
            })?
            .ok_or(AuthError::InvalidToken)?,
    };

    Ok(AuthUser {
        user,
        access_token: token,
    })
}

/// 요청에서 액세스 토큰을 꺼냅니다. `Authorization: Bearer`가 쿠키보다 우선입니다.
pub fn access_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        return header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::InvalidToken);
    }
    token(&CookieJar::from_headers(headers), ACCESS_COOKIE).ok_or(AuthError::MissingToken)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    ProviderUnavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
            AuthError::ProviderUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "identity_unavailable",
                "The authentication service could not be reached",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
