//! 테스트용 메모리 저장소. 모든 쓰기를 기록해 두어 테스트가 횟수를 셀 수 있습니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{RecordStore, StoreError, StoreProvider};
use crate::models::{DraftUpdate, NewPage, Page, Profile, PublishUpdate};

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, Profile>,
    pages: HashMap<(String, String), Page>,
    profile_upserts: usize,
    page_creations: usize,
    draft_writes: Vec<DraftUpdate>,
    publish_writes: Vec<PublishUpdate>,
    fail_writes: bool,
    fail_lookups: bool,
    write_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, owner_id: &str, slug: &str) -> Option<Page> {
        let inner = self.inner.lock().unwrap();
        inner
            .pages
            .get(&(owner_id.to_string(), slug.to_string()))
            .cloned()
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.inner.lock().unwrap().profiles.get(id).cloned()
    }

    pub fn draft_writes(&self) -> Vec<DraftUpdate> {
        self.inner.lock().unwrap().draft_writes.clone()
    }

    pub fn publish_writes(&self) -> Vec<PublishUpdate> {
        self.inner.lock().unwrap().publish_writes.clone()
    }

    pub fn profile_upserts(&self) -> usize {
        self.inner.lock().unwrap().profile_upserts
    }

    /// 실제로 행을 만든 `ensure_page` 호출 수
    pub fn page_creations(&self) -> usize {
        self.inner.lock().unwrap().page_creations
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    pub fn set_fail_lookups(&self, fail: bool) {
        self.inner.lock().unwrap().fail_lookups = fail;
    }

    /// 초안 쓰기를 지연시켜, 저장이 진행 중인 상태를 테스트에서 만듭니다.
    pub fn set_write_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().write_delay = Some(delay);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.inner.lock().unwrap().fail_writes {
            return Err(rejected("write rejected"));
        }
        Ok(())
    }
}

fn rejected(message: &str) -> StoreError {
    StoreError::Api {
        status: 503,
        code: None,
        message: message.to_string(),
    }
}

impl StoreProvider for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn scoped(&self, _access_token: Option<&str>) -> Arc<dyn RecordStore> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        inner.profile_upserts += 1;
        inner.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_lookups {
            return Err(rejected("lookup rejected"));
        }
        let mut matches = inner.profiles.values().filter(|p| p.username == username);
        match (matches.next(), matches.next()) {
            (Some(profile), None) => Ok(Some(profile.clone())),
            _ => Ok(None),
        }
    }

    async fn ensure_page(&self, page: &NewPage) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        let key = (page.owner_id.clone(), page.slug.clone());
        if !inner.pages.contains_key(&key) {
            inner.page_creations += 1;
            inner.pages.insert(
                key,
                Page {
                    owner_id: page.owner_id.clone(),
                    slug: page.slug.clone(),
                    draft_title: page.draft_title.clone(),
                    published_title: None,
                    updated_at: page.updated_at,
                    published_at: None,
                },
            );
        }
        Ok(())
    }

    async fn find_page(&self, owner_id: &str, slug: &str) -> Result<Option<Page>, StoreError> {
        if self.inner.lock().unwrap().fail_lookups {
            return Err(rejected("lookup rejected"));
        }
        Ok(self.page(owner_id, slug))
    }

    async fn update_draft(
        &self,
        owner_id: &str,
        slug: &str,
        update: &DraftUpdate,
    ) -> Result<(), StoreError> {
        let delay = self.inner.lock().unwrap().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        inner.draft_writes.push(update.clone());
        if let Some(page) = inner
            .pages
            .get_mut(&(owner_id.to_string(), slug.to_string()))
        {
            page.draft_title = update.draft_title.clone();
            page.updated_at = update.updated_at;
        }
        Ok(())
    }

    async fn publish_page(
        &self,
        owner_id: &str,
        slug: &str,
        update: &PublishUpdate,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        inner.publish_writes.push(update.clone());
        if let Some(page) = inner
            .pages
            .get_mut(&(owner_id.to_string(), slug.to_string()))
        {
            page.published_title = Some(update.published_title.clone());
            page.published_at = Some(update.published_at);
        }
        Ok(())
    }
}
