//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `SUPABASE_URL`: 인증/데이터 서비스 엔드포인트 (필수)
//! - `SUPABASE_ANON_KEY`: 공개(anon) API 키 (필수)
//! - `SUPABASE_JWT_SECRET`: 액세스 토큰 로컬 검증용 비밀키 (선택)
//! - `DATABASE_URL`: 지정하면 SQLite 저장소를 사용 (선택)
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 디렉토리
//! - `AUTOSAVE_DEBOUNCE_MS`: 자동 저장 디바운스 간격 (기본 500ms)
//! - `COOKIE_SECURE`: 세션 쿠키에 `Secure` 속성 부여 여부
//! - `HTTP_TIMEOUT_SECS`: 외부 서비스 호출 타임아웃
//! - `EDITOR_IDLE_SECS`: 이 시간 동안 활동이 없는 에디터 세션을 정리 (0이면 끔)

use std::env;
use std::time::Duration;

use thiserror::Error;

/// 기본 디바운스 간격. 마지막 입력 후 이 시간 동안 조용하면 초안을 저장합니다.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// 에디터 세션 유휴 만료 기본값 (30분)
pub const DEFAULT_EDITOR_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase 프로젝트 URL (예: "https://abc123.supabase.co")
    pub supabase_url: String,
    /// Supabase 공개 API 키. 모든 요청의 `apikey` 헤더로 전달됩니다.
    pub supabase_anon_key: String,
    /// 설정되어 있으면 토큰을 원격 호출 없이 HS256으로 검증합니다.
    pub jwt_secret: Option<String>,
    /// 자체 호스팅 저장소 경로 (예: "sqlite:data/pagepress.db")
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_dist: String,
    pub debounce: Duration,
    pub cookie_secure: bool,
    pub http_timeout: Duration,
    /// `None`이면 유휴 세션을 정리하지 않습니다.
    pub editor_idle: Option<Duration>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `SUPABASE_URL`과 `SUPABASE_ANON_KEY`는 필수이며, 없으면 에러가 발생합니다.
    /// 숫자 항목이 파싱되지 않으면 기본값으로 조용히 넘어가지 않고 에러를 반환합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 조회 함수를 주입받아 설정을 만듭니다. 테스트에서 프로세스 환경을 건드리지 않기 위함입니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 빈 문자열은 "설정 안 됨"으로 취급합니다.
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let supabase_url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_anon_key =
            get("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        Ok(Self {
            // 끝의 '/'를 제거해 두면 "{url}/rest/v1/..." 조합이 항상 올바릅니다.
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            jwt_secret: get("SUPABASE_JWT_SECRET"),
            database_url: get("DATABASE_URL"),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000)?,
            frontend_dist: get("FRONTEND_DIST").unwrap_or_else(|| "../frontend/dist".to_string()),
            debounce: Duration::from_millis(parse_or(
                "AUTOSAVE_DEBOUNCE_MS",
                get("AUTOSAVE_DEBOUNCE_MS"),
                DEFAULT_DEBOUNCE_MS,
            )?),
            cookie_secure: parse_or("COOKIE_SECURE", get("COOKIE_SECURE"), false)?,
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                30,
            )?),
            editor_idle: Some(Duration::from_secs(parse_or(
                "EDITOR_IDLE_SECS",
                get("EDITOR_IDLE_SECS"),
                DEFAULT_EDITOR_IDLE_SECS,
            )?))
            .filter(|idle| !idle.is_zero()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_supabase_endpoint_and_key() {
        let err = Config::from_lookup(lookup(&[("SUPABASE_ANON_KEY", "anon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_URL")));

        let err = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://x.supabase.co");
        assert_eq!(config.port, 3000);
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert!(config.jwt_secret.is_none());
        assert!(config.database_url.is_none());
        assert!(!config.cookie_secure);
        assert_eq!(config.editor_idle, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn zero_idle_timeout_disables_sweeping() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("EDITOR_IDLE_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.editor_idle, None);
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("AUTOSAVE_DEBOUNCE_MS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid { name: "AUTOSAVE_DEBOUNCE_MS", .. }
        ));
    }
}
