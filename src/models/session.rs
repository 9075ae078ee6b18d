//! # 인증 세션 모델 정의
//!
//! 외부 인증 서비스가 발급한 세션과, 로그인 화면이 주고받는 요청/응답 구조체입니다.
//! 이 서버는 세션을 만들지 않고 **읽기만** 합니다. 세션의 생성/만료/폐기는 모두
//! 인증 서비스의 책임입니다.
//!
//! ## 세션 흐름
//! 1. `POST /api/v1/auth/login` → 로그인 시도, 실패하면 같은 자격 증명으로 가입
//! 2. 응답과 함께 액세스/리프레시 토큰이 쿠키로 설정됨
//! 3. 이후 요청은 쿠키(또는 `Authorization: Bearer`)로 사용자를 식별

use serde::{Deserialize, Serialize};

/// 인증된 사용자: 인증 서비스의 사용자 객체에서 필요한 필드만 꺼낸 것
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// 사용자 식별자 (Supabase에서는 UUID 문자열)
    pub id: String,
    /// 이메일: 전화번호 가입 등에서는 없을 수 있으므로 Option
    #[serde(default)]
    pub email: Option<String>,
}

/// 로그인/가입/갱신 성공 시 인증 서비스가 돌려주는 세션
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// 액세스 토큰 유효 시간(초). 쿠키 Max-Age로 사용합니다.
    #[serde(default)]
    pub expires_in: i64,
    pub user: Identity,
}

/// 로그인 요청: `POST /api/v1/auth/login`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인 응답
///
/// 가입 직후 이메일 확인이 필요한 프로젝트에서는 세션이 없을 수 있습니다.
/// 그래도 `redirect`는 항상 대시보드이며, 세션이 없으면 대시보드 가드가 다시 로그인으로 보냅니다.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub redirect: String,
    pub user: Option<Identity>,
}
