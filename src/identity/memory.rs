//! 테스트용 가짜 인증 서비스

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{IdentityError, IdentityProvider};
use crate::models::{AuthSession, Identity};

#[derive(Default)]
struct Inner {
    /// 이메일 -> (비밀번호, 사용자 id)
    accounts: HashMap<String, (String, String)>,
    /// 액세스 토큰 -> 사용자
    tokens: HashMap<String, Identity>,
    refresh_tokens: HashMap<String, Identity>,
    require_confirmation: bool,
    sign_up_calls: usize,
    next_id: usize,
    issued: usize,
}

#[derive(Clone, Default)]
pub struct MemoryIdentity {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// 계정을 등록하고 바로 쓸 수 있는 액세스 토큰을 돌려줍니다.
    pub fn with_user(&self, email: &str, password: &str) -> (Identity, String) {
        let mut inner = self.inner.lock().unwrap();
        let user = create_account(&mut inner, email, password);
        let session = issue(&mut inner, &user);
        (user, session.access_token)
    }

    pub fn set_require_confirmation(&self, require: bool) {
        self.inner.lock().unwrap().require_confirmation = require;
    }

    pub fn sign_up_calls(&self) -> usize {
        self.inner.lock().unwrap().sign_up_calls
    }

    pub fn is_live(&self, access_token: &str) -> bool {
        self.inner.lock().unwrap().tokens.contains_key(access_token)
    }
}

fn create_account(inner: &mut Inner, email: &str, password: &str) -> Identity {
    inner.next_id += 1;
    let id = format!("user-{}", inner.next_id);
    inner
        .accounts
        .insert(email.to_string(), (password.to_string(), id.clone()));
    Identity {
        id,
        email: Some(email.to_string()),
    }
}

fn issue(inner: &mut Inner, user: &Identity) -> AuthSession {
    inner.issued += 1;
    let n = inner.issued;
    let session = AuthSession {
        access_token: format!("access-{}-{}", user.id, n),
        refresh_token: format!("refresh-{}-{}", user.id, n),
        expires_in: 3600,
        user: user.clone(),
    };
    inner
        .tokens
        .insert(session.access_token.clone(), user.clone());
    inner
        .refresh_tokens
        .insert(session.refresh_token.clone(), user.clone());
    session
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let mut inner = self.inner.lock().unwrap();
        let user = match inner.accounts.get(email) {
            Some((stored, id)) if stored == password => Identity {
                id: id.clone(),
                email: Some(email.to_string()),
            },
            _ => return Err(IdentityError::Rejected("Invalid login credentials".to_string())),
        };
        Ok(issue(&mut inner, &user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, IdentityError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sign_up_calls += 1;
        if inner.accounts.contains_key(email) {
            return Err(IdentityError::Rejected("User already registered".to_string()));
        }
        if password.len() < 6 {
            return Err(IdentityError::Rejected(
                "Password should be at least 6 characters".to_string(),
            ));
        }
        let user = create_account(&mut inner, email, password);
        if inner.require_confirmation {
            return Ok(None);
        }
        Ok(Some(issue(&mut inner, &user)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.inner.lock().unwrap().tokens.remove(access_token);
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| IdentityError::Rejected("Invalid Refresh Token".to_string()))?;
        Ok(issue(&mut inner, &user))
    }

    async fn current_session(
        &self,
        access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        Ok(self.inner.lock().unwrap().tokens.get(access_token).cloned())
    }
}
