//! # 대시보드/에디터 핸들러
//!
//! ## 엔드포인트
//! - `POST   /api/v1/dashboard`               → 프로필/페이지 준비 후 에디터 마운트
//! - `PUT    /api/v1/editors/{id}/draft`      → 입력 이벤트 (202 + 상태)
//! - `GET    /api/v1/editors/{id}`            → 자동 저장 상태 조회
//! - `POST   /api/v1/editors/{id}/publish`    → 즉시 발행
//! - `DELETE /api/v1/editors/{id}`            → 언마운트 (저장 안 된 입력은 버림)
//!
//! 모든 핸들러는 `AuthUser` 추출기로 보호되며, 다른 사용자의 에디터는 404입니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::{public_url, DashboardResponse, EditDraftRequest, EditorStatus, PublishReceipt},
    routes::AppState,
    services::{autosave::AutosaveController, dashboard, editors::EditorSession},
};

pub async fn open_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<DashboardResponse> {
    let store = state.stores.scoped(Some(&auth.access_token));
    let hydrated = dashboard::hydrate(store.as_ref(), &auth.user).await;

    let controller = AutosaveController::new(
        store,
        Some(auth.user.id.clone()),
        hydrated.username.clone(),
        hydrated.draft_title.clone(),
        state.debounce,
    );
    let session = state.editors.mount(&auth.user.id, controller);

    Json(DashboardResponse {
        editor_id: session.id.clone(),
        public_url: public_url(&hydrated.username),
        username: hydrated.username,
        draft_title: hydrated.draft_title,
    })
}

fn owned_editor(state: &AppState, id: &str, auth: &AuthUser) -> Result<Arc<EditorSession>, AppError> {
    state.editors.get(id, &auth.user.id).ok_or(AppError::NotFound)
}

pub async fn edit_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<EditDraftRequest>,
) -> Result<(StatusCode, Json<EditorStatus>), AppError> {
    let session = owned_editor(&state, &id, &auth)?;

    // 제목은 한 줄. 줄바꿈은 저장하지 않습니다.
    let text: String = req.text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    session.controller.on_edit(text);

    Ok((StatusCode::ACCEPTED, Json(session.controller.status())))
}

pub async fn get_editor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EditorStatus>, AppError> {
    let session = owned_editor(&state, &id, &auth)?;
    Ok(Json(session.controller.status()))
}

pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublishReceipt>, AppError> {
    let session = owned_editor(&state, &id, &auth)?;
    let receipt = session
        .controller
        .publish()
        .await?
        .ok_or(AppError::Unauthorized("Editor has no owner".to_string()))?;
    Ok(Json(receipt))
}

pub async fn close_editor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.editors.unmount(&id, &auth.user.id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
