//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "store": "postgrest", "editors": 3 }`
//!
//! 외부 서비스에 요청을 보내지 않습니다. 저장소 어댑터 이름과
//! 현재 마운트된 에디터 세션 수만 알려줍니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.stores.name(),
        "editors": state.editors.len()
    }))
}
