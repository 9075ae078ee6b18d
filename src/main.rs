//! # pagepress 웹 서버 진입점
//!
//! 사용자마다 한 페이지를 가지는 개인 페이지 서비스입니다.
//! 인증과 데이터 저장은 외부 서비스(Supabase)에 맡기고, 이 서버는
//! 에디터 세션의 디바운스 자동 저장과 발행, 공개 페이지 렌더링을 담당합니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 외부 서비스 클라이언트(인증/저장소) 생성
//! 4. 라우터 조립 (API, 공개 페이지, 프론트엔드 정적 파일)
//! 5. HTTP 서버 시작, Ctrl+C에서 정상 종료

mod config;
mod error;
mod identity;
mod middleware;
mod models;
mod routes;
mod services;
mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use config::Config;
use identity::{supabase::SupabaseAuth, IdentityProvider};
use routes::AppState;
use services::editors::EditorRegistry;
use store::{postgrest::PostgrestClient, sqlite::SqliteStore, StoreProvider};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 pagepress, tower_http, axum을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagepress=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting pagepress server on {}:{}", config.host, config.port);

    // ── 4단계: 외부 서비스 클라이언트 ──
    // reqwest::Client는 내부 연결 풀을 공유하므로 하나 만들어 clone해서 씁니다.
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(SupabaseAuth::new(
        http_client.clone(),
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));

    let stores: Arc<dyn StoreProvider> = match &config.database_url {
        Some(url) => {
            tracing::info!("Using SQLite page store at {}", url);
            Arc::new(SqliteStore::connect(url).await?)
        }
        None => {
            tracing::info!("Using hosted REST page store at {}", config.supabase_url);
            Arc::new(PostgrestClient::new(
                http_client,
                config.supabase_url.clone(),
                config.supabase_anon_key.clone(),
            ))
        }
    };

    if config.jwt_secret.is_none() {
        tracing::warn!(
            "SUPABASE_JWT_SECRET not set, every request is verified against the auth service"
        );
    }

    // ── 5단계: 애플리케이션 상태 ──
    // 닫히지 않은 탭의 에디터 세션은 유휴 시간이 지나면 정리합니다.
    let editors = EditorRegistry::new();
    match config.editor_idle {
        Some(idle) => {
            editors.spawn_idle_sweeper(idle);
            tracing::info!("Idle editor sessions expire after {:?}", idle);
        }
        None => tracing::warn!("EDITOR_IDLE_SECS=0, idle editor sessions are never expired"),
    }

    let state = AppState {
        identity,
        stores,
        editors,
        jwt_secret: config.jwt_secret.clone(),
        debounce: config.debounce,
        cookie_secure: config.cookie_secure,
    };

    // ── 6단계: 라우터 + 미들웨어 ──
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend_dist = Path::new(&config.frontend_dist);
    if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", config.frontend_dist);
    } else {
        tracing::warn!(
            "Frontend dist directory {} not found, only the API and public pages will respond",
            config.frontend_dist
        );
    }

    let app = routes::app(state, frontend_dist)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 7단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Ctrl+C를 받으면 새 연결을 받지 않고 진행 중인 요청을 마무리합니다.
/// 에디터 세션의 대기 중인 자동 저장은 프로세스와 함께 사라집니다.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
