use serde::{Deserialize, Serialize};

/// 세션에 이메일이 없을 때 쓰는 사용자명
pub const FALLBACK_USERNAME: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

impl Profile {
    pub fn for_user(id: &str, email: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            username: derive_username(email),
        }
    }
}

/// 이메일의 로컬 파트(첫 '@' 앞부분)를 사용자명으로 씁니다.
///
/// 같은 이메일은 항상 같은 사용자명이 되므로 프로필 upsert는 몇 번을 해도 결과가 같습니다.
pub fn derive_username(email: Option<&str>) -> String {
    let email = email.unwrap_or(FALLBACK_USERNAME);
    match email.split_once('@') {
        Some((local, _)) => local.to_string(),
        None => email.to_string(),
    }
}
