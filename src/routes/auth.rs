//! 인증 라우트: 로그인(가입 폴백), 세션 갱신, 로그아웃, 현재 사용자

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::AppError,
    middleware::auth::{authenticate, AuthUser},
    middleware::cookies::{self, REFRESH_COOKIE},
    models::{Identity, LoginRequest, LoginResponse},
    routes::AppState,
    services::login::{sign_in_or_register, AFTER_LOGIN},
};

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim();
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let session = sign_in_or_register(state.identity.as_ref(), email, &req.password).await?;

    let Some(session) = session else {
        info!("Account created, session pending email confirmation");
        return Ok(Json(LoginResponse {
            redirect: AFTER_LOGIN.to_string(),
            user: None,
        })
        .into_response());
    };

    let body = Json(LoginResponse {
        redirect: AFTER_LOGIN.to_string(),
        user: Some(session.user.clone()),
    });
    Ok((cookies::with_session(jar, &session, state.cookie_secure), body).into_response())
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let refresh_token = cookies::token(&jar, REFRESH_COOKIE)
        .ok_or(AppError::Unauthorized("Refresh token is required".to_string()))?;

    let session = state.identity.refresh_session(&refresh_token).await?;

    Ok((
        cookies::with_session(jar, &session, state.cookie_secure),
        Json(json!({ "user": session.user })),
    )
        .into_response())
}

/// 세션이 이미 만료됐더라도 쿠키는 항상 지웁니다.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    if let Ok(auth) = authenticate(&headers, &state).await {
        if let Err(e) = state.identity.sign_out(&auth.access_token).await {
            warn!(user_id = %auth.user.id, error = %e, "Provider sign-out failed");
        }
        state.editors.unmount_owner(&auth.user.id);
        info!(user_id = %auth.user.id, "Logged out");
    }

    (
        cookies::cleared(jar, state.cookie_secure),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

pub async fn me(auth: AuthUser) -> Json<Identity> {
    Json(auth.user)
}
