//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `editor`: 에디터 세션 상태와 대시보드/발행 응답
//! - `page`: `pages` 테이블 한 행과 부분 업데이트 레코드
//! - `profile`: `profiles` 테이블 한 행과 사용자명 파생 규칙
//! - `session`: 인증 서비스가 발급한 세션과 로그인 요청/응답
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Page`처럼 짧게 쓸 수 있게 합니다.

pub mod editor;
pub mod page;
pub mod profile;
pub mod session;

pub use editor::*;
pub use page::*;
pub use profile::*;
pub use session::*;
