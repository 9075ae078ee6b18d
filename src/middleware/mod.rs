//! # 요청 인증 미들웨어
//!
//! - `auth`: 액세스 토큰 추출/검증, `AuthUser` 추출기, 페이지 라우트 가드
//! - `cookies`: 세션 쿠키 읽기/쓰기

pub mod auth;
pub mod cookies;
