//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러와 라우터 조립을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 로그인(실패 시 가입), 토큰 갱신, 로그아웃, 내 정보
//! - `editors`: 대시보드 진입과 에디터 세션(입력/상태/발행/닫기)
//! - `web`: 공개 페이지 (JSON / HTML)
//! - `health`: 서버 상태 확인

pub mod auth;
pub mod editors;
pub mod health;
pub mod web;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, post, put},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::identity::IdentityProvider;
use crate::middleware::auth::{authenticate, require_session};
use crate::services::editors::EditorRegistry;
use crate::store::StoreProvider;

/// 모든 핸들러가 공유하는 애플리케이션 상태
///
/// 필드가 모두 `Arc`이거나 작은 값이라 요청마다 clone해도 비용이 거의 없습니다.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub stores: Arc<dyn StoreProvider>,
    pub editors: EditorRegistry,
    /// 설정되어 있으면 토큰을 로컬에서 검증, 아니면 인증 서비스에 묻습니다.
    pub jwt_secret: Option<String>,
    pub debounce: Duration,
    pub cookie_secure: bool,
}

/// 전체 라우터를 조립합니다.
///
/// - `/api/v1/*`: JSON API
/// - `/web/{username}`: 서버 렌더링 공개 페이지
/// - `/dashboard`: 세션 가드 뒤의 프론트엔드
/// - 그 외: 프론트엔드 정적 파일 (없는 경로는 index.html)
pub fn app(state: AppState, frontend_dist: &Path) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/dashboard", post(editors::open_dashboard))
        .route(
            "/editors/{id}",
            get(editors::get_editor).delete(editors::close_editor),
        )
        .route("/editors/{id}/draft", put(editors::edit_draft))
        .route("/editors/{id}/publish", post(editors::publish))
        .route("/web/{username}", get(web::public_page_json))
        .route("/health", get(health::health_check));

    let index = frontend_dist.join("index.html");
    let dashboard_page = Router::new()
        .route_service("/dashboard", ServeFile::new(&index))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(root_redirect))
        .route("/web/{username}", get(web::public_page_html))
        .route_service("/login", ServeFile::new(&index))
        .merge(dashboard_page)
        .nest("/api/v1", api_routes)
        .fallback_service(ServeDir::new(frontend_dist).not_found_service(ServeFile::new(&index)))
        .with_state(state)
}

async fn root_redirect(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    match authenticate(&headers, &state).await {
        Ok(_) => Redirect::to("/dashboard"),
        Err(_) => Redirect::to("/login"),
    }
}
