//! # 에러 처리 모듈
//!
//! HTTP 핸들러가 반환하는 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError`: 저장소 에러, 인증 서비스 에러, 요청 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: `{ "error": { "code", "message" } }` 형태의 JSON 응답으로 변환
//!
//! 외부 서비스(저장소/인증)의 상세 에러는 로그에만 남기고,
//! 클라이언트에는 일반적인 메시지만 돌려줍니다. 예외는 인증 서비스가 로그인을
//! 거절한 경우로, 이때의 메시지는 사용자에게 그대로 보여줍니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// 에디터 세션이 없거나 요청한 사용자의 것이 아님 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패 (HTTP 401). 메시지는 그대로 클라이언트에 전달됩니다.
    #[error("{0}")]
    Unauthorized(String),

    /// 저장소 호출 실패 (HTTP 502)
    /// #[from]: `?` 연산자로 StoreError → AppError::Store 자동 변환
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// 인증 서비스 호출 실패. 거절(Rejected)은 401, 그 외에는 502.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Store(ref e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "store_error",
                    "The page store could not complete the request".to_string(),
                )
            }
            // 로그인 거절 메시지는 가공하지 않고 그대로 보여줍니다.
            AppError::Identity(IdentityError::Rejected(ref msg)) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Identity(ref e) => {
                tracing::error!("Identity service error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "identity_unavailable",
                    "The authentication service could not be reached".to_string(),
                )
            }
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
