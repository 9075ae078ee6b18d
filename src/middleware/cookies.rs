//! # 세션 쿠키
//!
//! 인증 서비스가 발급한 액세스/리프레시 토큰을 브라우저 쿠키로 주고받습니다.
//! 쿠키 파싱과 `Set-Cookie` 생성은 `axum_extra`의 `CookieJar`에 맡깁니다.
//!
//! ## 쿠키 속성
//! - `HttpOnly`: 자바스크립트에서 토큰을 읽을 수 없음
//! - `SameSite=Lax`: 다른 사이트에서 시작된 POST에는 실리지 않음
//! - `Path=/`: 페이지와 API 모두에서 사용
//! - `Secure`: `COOKIE_SECURE=true`일 때만 (로컬 http 개발 환경 고려)

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::models::AuthSession;

pub const ACCESS_COOKIE: &str = "pp-access-token";
pub const REFRESH_COOKIE: &str = "pp-refresh-token";

/// 리프레시 토큰 쿠키 수명. 실제 만료는 인증 서비스가 판단합니다.
const REFRESH_MAX_AGE: Duration = Duration::days(30);

/// 쿠키 값. 비어 있는 값(로그아웃 후 남은 쿠키 등)은 없는 것으로 봅니다.
pub fn token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}

/// 새 세션의 두 토큰을 쿠키로 저장
pub fn with_session(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    let mut access = session_cookie(ACCESS_COOKIE, session.access_token.clone(), secure);
    if session.expires_in > 0 {
        access.set_max_age(Duration::seconds(session.expires_in));
    }
    let mut refresh = session_cookie(REFRESH_COOKIE, session.refresh_token.clone(), secure);
    refresh.set_max_age(REFRESH_MAX_AGE);

    jar.add(access).add(refresh)
}

/// 두 세션 쿠키를 만료시킵니다.
///
/// `CookieJar::remove`는 요청에 실려 온 쿠키만 지우므로,
/// 요청에 쿠키가 없더라도 항상 만료 쿠키를 내려보내도록 직접 추가합니다.
pub fn cleared(jar: CookieJar, secure: bool) -> CookieJar {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            let mut cookie = session_cookie(name, String::new(), secure);
            cookie.make_removal();
            jar.add(cookie)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    fn session() -> AuthSession {
        AuthSession {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 3600,
            user: Identity {
                id: "u1".to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pp-access-token=abc.def; other=1"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(token(&jar, ACCESS_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(token(&jar, REFRESH_COOKIE), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pp-access-token="));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(token(&jar, ACCESS_COOKIE), None);
    }

    #[test]
    fn session_cookies_carry_attributes() {
        let jar = with_session(CookieJar::new(), &session(), true);

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "at");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.max_age(), Some(Duration::seconds(3600)));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.value(), "rt");
        assert_eq!(refresh.http_only(), Some(true));
        assert_eq!(refresh.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn insecure_mode_leaves_secure_off() {
        let jar = with_session(CookieJar::new(), &session(), false);
        assert_eq!(jar.get(ACCESS_COOKIE).unwrap().secure(), Some(false));
    }

    #[test]
    fn unknown_lifetime_gives_a_browser_session_cookie() {
        let mut session = session();
        session.expires_in = 0;
        let jar = with_session(CookieJar::new(), &session, false);
        assert_eq!(jar.get(ACCESS_COOKIE).unwrap().max_age(), None);
    }

    #[test]
    fn clearing_expires_both_cookies_without_request_cookies() {
        let jar = cleared(CookieJar::new(), false);
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.path(), Some("/"));
        }
        assert_eq!(token(&jar, ACCESS_COOKIE), None);
    }
}
