//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenService`]: Access/Refresh Token 발급 및 검증
//! - [`CredentialHasher`]: bcrypt 비밀번호 해싱
//! - [`JwtAuth`], [`CandidateAuth`], [`RecruiterAuth`]: Axum 인증 추출기
//! - [`require_role`], [`require_owner`]: 역할/소유자 검사

mod jwt;
mod middleware;
mod password;
mod roles;

pub use jwt::{
    AuthenticatedIdentity, Claims, JwtError, RefreshClaims, TokenPair, TokenService,
    REFRESH_TOKEN_TYPE,
};
pub use middleware::{CandidateAuth, JwtAuth, RecruiterAuth};
pub use password::{hash_password, verify_password, CredentialHasher, PasswordError};
pub use roles::{require_owner, require_role};
