//! # 자체 호스팅(SQLite) 저장소 어댑터
//!
//! `DATABASE_URL`이 설정되면 호스팅 REST 저장소 대신 이 어댑터를 사용합니다.
//! 스키마는 `migrations/` 폴더의 SQL로 관리되며 서버 시작 시 자동 적용됩니다.
//!
//! 모든 쓰기는 호스팅 저장소와 같은 의미를 갖습니다:
//! - 프로필 upsert는 id 충돌 시 username만 교체
//! - 페이지 ensure는 (owner_id, slug) 충돌 시 아무것도 하지 않음
//! - 초안 저장과 발행은 서로의 컬럼을 건드리지 않음

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::{RecordStore, StoreError, StoreProvider};
use crate::models::{DraftUpdate, NewPage, Page, Profile, PublishUpdate};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 연결 풀을 만들고 마이그레이션을 실행합니다.
    ///
    /// 데이터베이스 파일이 없으면 새로 만듭니다 (`create_if_missing`).
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5) // 최대 5개의 동시 연결
            .connect_with(options)
            .await?;

        Self::migrated(pool).await
    }

    /// 인메모리 DB는 연결마다 별개의 DB이므로 연결을 하나로 고정하고 끊지 않습니다.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl StoreProvider for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn scoped(&self, _access_token: Option<&str>) -> Arc<dyn RecordStore> {
        // SqlitePool은 내부적으로 Arc이므로 clone해도 같은 풀을 가리킵니다.
        Arc::new(self.clone())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username)
            VALUES (?, ?)
            ON CONFLICT (id) DO UPDATE SET username = excluded.username
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, StoreError> {
        // 같은 사용자명이 둘 이상이면 "정확히 한 행"이 아니므로 없는 것으로 취급합니다.
        let mut rows = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username
            FROM profiles
            WHERE username = ?
            LIMIT 2
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    async fn ensure_page(&self, page: &NewPage) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pages (owner_id, slug, draft_title, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (owner_id, slug) DO NOTHING
            "#,
        )
        .bind(&page.owner_id)
        .bind(&page.slug)
        .bind(&page.draft_title)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_page(&self, owner_id: &str, slug: &str) -> Result<Option<Page>, StoreError> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT owner_id, slug, draft_title, published_title, updated_at, published_at
            FROM pages
            WHERE owner_id = ? AND slug = ?
            "#,
        )
        .bind(owner_id)
        .bind(slug)
        .fetch_optional(&self.pool) // 0행이면 None, 1행이면 Some
        .await?;

        Ok(page)
    }

    async fn update_draft(
        &self,
        owner_id: &str,
        slug: &str,
        update: &DraftUpdate,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE pages
            SET draft_title = ?, updated_at = ?
            WHERE owner_id = ? AND slug = ?
            "#,
        )
        .bind(&update.draft_title)
        .bind(update.updated_at)
        .bind(owner_id)
        .bind(slug)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn publish_page(
        &self,
        owner_id: &str,
        slug: &str,
        update: &PublishUpdate,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE pages
            SET published_title = ?, published_at = ?
            WHERE owner_id = ? AND slug = ?
            "#,
        )
        .bind(&update.published_title)
        .bind(update.published_at)
        .bind(owner_id)
        .bind(slug)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
