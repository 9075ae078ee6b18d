//! # 비즈니스 로직 서비스 모듈
//!
//! 라우트 핸들러에서 분리한 도메인 로직입니다.
//!
//! - `autosave`: 에디터 하나의 디바운스 자동 저장과 발행
//! - `editors`: 마운트된 에디터 세션 레지스트리
//! - `dashboard`: 대시보드 진입 시 프로필/페이지 준비
//! - `login`: 로그인 실패 시 가입으로 이어가는 흐름
//! - `public_page`: 공개 페이지 조회

pub mod autosave;
pub mod dashboard;
pub mod editors;
pub mod login;
pub mod public_page;
