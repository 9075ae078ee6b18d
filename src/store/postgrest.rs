//! # Supabase REST(PostgREST) 저장소 어댑터
//!
//! `profiles`, `pages` 테이블을 `/rest/v1/{table}`로 읽고 씁니다.
//! 모든 요청에 `apikey` 헤더와 `Authorization: Bearer`를 붙이며,
//! Bearer에는 로그인한 사용자의 토큰을 넣어 행 단위 보안 정책(RLS)이 적용되게 합니다.
//!
//! ## PostgREST 규칙
//! - upsert: `Prefer: resolution=merge-duplicates` + `on_conflict`
//! - 없을 때만 삽입: `Prefer: resolution=ignore-duplicates`
//! - 부분 수정: `PATCH ?owner_id=eq.{id}&slug=eq.home`
//! - 단건 조회: `Accept: application/vnd.pgrst.object+json`, 결과 없음은 `PGRST116`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use super::{RecordStore, StoreError, StoreProvider};
use crate::models::{DraftUpdate, NewPage, Page, Profile, PublishUpdate};

/// 단건 조회에서 일치하는 행이 없을 때 PostgREST가 돌려주는 에러 코드
pub const NO_ROWS_CODE: &str = "PGRST116";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const PAGE_COLUMNS: &str = "owner_id,slug,draft_title,published_title,updated_at,published_at";

/// 모든 사용자별 저장소가 공유하는 연결 정보
#[derive(Clone)]
pub struct PostgrestClient {
    http_client: reqwest::Client,
    api_url: String,
    anon_key: String,
}

impl PostgrestClient {
    /// # 인자
    /// * `api_url` - 프로젝트 API 주소 (예: `https://xyz.supabase.co`)
    /// * `anon_key` - 공개용 익명(anon) API 키
    pub fn new(
        http_client: reqwest::Client,
        api_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// 테이블의 REST 엔드포인트 주소
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl StoreProvider for PostgrestClient {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    fn scoped(&self, access_token: Option<&str>) -> Arc<dyn RecordStore> {
        // 익명 조회(공개 페이지)는 anon 키 자체를 Bearer로 씁니다.
        let bearer = access_token.unwrap_or(&self.anon_key).to_string();
        Arc::new(PostgrestStore {
            client: self.clone(),
            bearer,
        })
    }
}

/// 한 사용자의 토큰에 묶인 저장소
pub struct PostgrestStore {
    client: PostgrestClient,
    bearer: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl PostgrestStore {
    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .http_client
            .request(method, self.client.rest_url(table))
            .header("apikey", &self.client.anon_key)
            .bearer_auth(&self.bearer)
    }

    /// `on_conflict` 충돌 처리(`merge-duplicates` 또는 `ignore-duplicates`)를 지정한 삽입
    async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        resolution: &str,
        body: &T,
    ) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", format!("resolution={},return=minimal", resolution))
            .json(body)
            .send()
            .await?;

        check_response(response).await
    }

    async fn patch<T: Serialize + ?Sized>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &T,
    ) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(filters)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;

        check_response(response).await
    }

    /// 한 행만 조회. 결과가 없으면 `Ok(None)`
    async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(query)
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(Some(response.json().await?));
        }

        match api_error(response).await {
            StoreError::Api { code: Some(code), .. } if code == NO_ROWS_CODE => Ok(None),
            err => Err(err),
        }
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

async fn check_response(response: reqwest::Response) -> Result<(), StoreError> {
    if response.status().is_success() {
        return Ok(());
    }
    let err = api_error(response).await;
    error!("Store request failed: {}", err);
    Err(err)
}

async fn api_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<PostgrestErrorBody>(&body) {
        Ok(parsed) => StoreError::Api {
            status,
            code: parsed.code,
            message: parsed.message.unwrap_or(body),
        },
        Err(_) => StoreError::Api {
            status,
            code: None,
            message: body,
        },
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        debug!(user_id = %profile.id, username = %profile.username, "Upserting profile");
        self.insert("profiles", "id", "merge-duplicates", profile).await
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, StoreError> {
        self.select_single(
            "profiles",
            &[("select", "id,username".to_string()), ("username", eq(username))],
        )
        .await
    }

    async fn ensure_page(&self, page: &NewPage) -> Result<(), StoreError> {
        debug!(owner_id = %page.owner_id, slug = %page.slug, "Ensuring page exists");
        self.insert("pages", "owner_id,slug", "ignore-duplicates", page)
            .await
    }

    async fn find_page(&self, owner_id: &str, slug: &str) -> Result<Option<Page>, StoreError> {
        self.select_single(
            "pages",
            &[
                ("select", PAGE_COLUMNS.to_string()),
                ("owner_id", eq(owner_id)),
                ("slug", eq(slug)),
            ],
        )
        .await
    }

    async fn update_draft(
        &self,
        owner_id: &str,
        slug: &str,
        update: &DraftUpdate,
    ) -> Result<(), StoreError> {
        self.patch(
            "pages",
            &[("owner_id", eq(owner_id)), ("slug", eq(slug))],
            update,
        )
        .await
    }

    async fn publish_page(
        &self,
        owner_id: &str,
        slug: &str,
        update: &PublishUpdate,
    ) -> Result<(), StoreError> {
        self.patch(
            "pages",
            &[("owner_id", eq(owner_id)), ("slug", eq(slug))],
            update,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(url: &str) -> PostgrestClient {
        PostgrestClient::new(reqwest::Client::new(), url, "anon-key")
    }

    #[test]
    fn test_rest_url() {
        let client = client("https://test.supabase.co");
        assert_eq!(
            client.rest_url("pages"),
            "https://test.supabase.co/rest/v1/pages"
        );
    }

    #[tokio::test]
    async fn no_rows_is_not_an_error() {
        let router = Router::new().route(
            "/rest/v1/pages",
            get(|| async {
                (
                    StatusCode::NOT_ACCEPTABLE,
                    Json(json!({
                        "code": "PGRST116",
                        "message": "JSON object requested, multiple (or no) rows returned"
                    })),
                )
            }),
        );
        let url = serve(router).await;
        let store = client(&url).scoped(Some("user-token"));

        let page = store.find_page("u1", "home").await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn other_errors_carry_status_and_code() {
        let router = Router::new().route(
            "/rest/v1/pages",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "code": "PGRST301", "message": "JWT expired" })),
                )
            }),
        );
        let url = serve(router).await;
        let store = client(&url).scoped(Some("user-token"));

        match store.find_page("u1", "home").await {
            Err(StoreError::Api { status, code, message }) => {
                assert_eq!(status, 401);
                assert_eq!(code.as_deref(), Some("PGRST301"));
                assert_eq!(message, "JWT expired");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn single_select_sends_filters_and_credentials() {
        let router = Router::new().route(
            "/rest/v1/pages",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(headers["apikey"], "anon-key");
                    assert_eq!(headers["authorization"], "Bearer user-token");
                    assert_eq!(headers["accept"], SINGLE_OBJECT);
                    assert_eq!(params["owner_id"], "eq.u1");
                    assert_eq!(params["slug"], "eq.home");
                    Json(json!({
                        "owner_id": "u1",
                        "slug": "home",
                        "draft_title": "Hello",
                        "published_title": null,
                        "updated_at": "2026-01-02T03:04:05.123456+00:00",
                        "published_at": null
                    }))
                },
            ),
        );
        let url = serve(router).await;
        let store = client(&url).scoped(Some("user-token"));

        let page = store.find_page("u1", "home").await.unwrap().unwrap();
        assert_eq!(page.draft_title, "Hello");
        assert!(page.published_title.is_none());
    }

    #[tokio::test]
    async fn anonymous_scope_uses_anon_key_as_bearer() {
        let router = Router::new().route(
            "/rest/v1/profiles",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers["authorization"], "Bearer anon-key");
                Json(json!({ "id": "u1", "username": "ada" }))
            }),
        );
        let url = serve(router).await;
        let store = client(&url).scoped(None);

        let profile = store.find_profile_by_username("ada").await.unwrap();
        assert_eq!(profile.map(|p| p.id).as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn ensure_page_ignores_duplicates() {
        let router = Router::new().route(
            "/rest/v1/pages",
            axum::routing::post(
                |headers: HeaderMap,
                 Query(params): Query<HashMap<String, String>>,
                 Json(body): Json<Value>| async move {
                    assert_eq!(
                        headers["prefer"],
                        "resolution=ignore-duplicates,return=minimal"
                    );
                    assert_eq!(params["on_conflict"], "owner_id,slug");
                    assert_eq!(body["draft_title"], "Untitled page");
                    StatusCode::CREATED
                },
            ),
        );
        let url = serve(router).await;
        let store = client(&url).scoped(Some("user-token"));

        store.ensure_page(&NewPage::home("u1")).await.unwrap();
    }
}
