//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직.
//!
//! - Access Token: `{sub, email, role}`, 기본 15분, access 비밀 키로 서명
//! - Refresh Token: `{sub, tokenType: "refresh"}`, 기본 7일, refresh 비밀 키로 서명
//!
//! 만료 판정은 jsonwebtoken이 아닌 주입된 [`Clock`]으로 수행합니다.
//! 토큰은 `now < exp`인 동안만 유효하며 leeway는 없습니다.

use std::sync::Arc;

use careerlaunch_core::{
    AuthConfig, BoardError, Clock, Role, User, MAX_ACCESS_TOKEN_TTL_MINUTES,
    MAX_REFRESH_TOKEN_TTL_DAYS,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::UserRepository;

/// Refresh Token의 `tokenType` 값.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// 사용자 정보로 Claims 생성.
    pub fn new(user: &User, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// Refresh Token 페이로드.
///
/// 이메일/역할을 담지 않으므로 갱신 시 항상 현재 사용자 레코드를 다시 읽습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Token type (항상 "refresh")
    pub token_type: String,
    /// Issued At
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// 검증된 Access Token에서 얻은 요청 단위 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthenticatedIdentity {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 처리 에러.
///
/// 검증 실패는 원인(서명, 형식, 만료, 종류)과 무관하게 `InvalidToken` 하나로 합쳐집니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("사용자 조회 실패: {0}")]
    Store(#[from] BoardError),
}

/// 토큰 발급/검증 서비스.
///
/// 프로세스 시작 시 [`AuthConfig`]로 한 번 생성되며 이후 불변입니다.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// 설정과 시간 소스로 서비스 생성.
    ///
    /// 만료 시간은 `1..=상한` 범위로 제한됩니다.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let access_secret = config.access_secret.expose_secret().as_bytes();
        let refresh_secret = config.refresh_secret.expose_secret().as_bytes();

        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl: Duration::minutes(
                config
                    .access_token_ttl_minutes
                    .clamp(1, MAX_ACCESS_TOKEN_TTL_MINUTES),
            ),
            refresh_ttl: Duration::days(
                config
                    .refresh_token_ttl_days
                    .clamp(1, MAX_REFRESH_TOKEN_TTL_DAYS),
            ),
            clock,
        }
    }

    /// Access Token 유효 기간 (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Access Token 발급.
    pub fn issue_access_token(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims::new(user, self.clock.now(), self.access_ttl);
        Ok(encode(&Header::default(), &claims, &self.access_encoding)?)
    }

    /// Refresh Token 발급.
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, JwtError> {
        let claims = RefreshClaims::new(user.id, self.clock.now(), self.refresh_ttl);
        Ok(encode(&Header::default(), &claims, &self.refresh_encoding)?)
    }

    /// Access Token + Refresh Token 쌍 발급.
    pub fn issue_token_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    /// Access Token 검증.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedIdentity, JwtError> {
        let claims: Claims = self.decode_checked(token, &self.access_decoding)?;
        if self.is_expired(claims.exp) {
            return Err(JwtError::InvalidToken);
        }
        AuthenticatedIdentity::try_from(claims)
    }

    /// Refresh Token 검증. 성공 시 사용자 ID를 반환합니다.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Uuid, JwtError> {
        let claims: RefreshClaims = self.decode_checked(token, &self.refresh_decoding)?;
        if claims.token_type != REFRESH_TOKEN_TYPE || self.is_expired(claims.exp) {
            return Err(JwtError::InvalidToken);
        }
        Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
    }

    /// Refresh Token으로 새 Access Token 발급.
    ///
    /// 사용자 레코드를 다시 읽어 현재 이메일/역할로 토큰을 만듭니다.
    /// 사용자가 없으면 `InvalidToken`입니다. Refresh Token은 교체하지 않습니다.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        users: &dyn UserRepository,
    ) -> Result<String, JwtError> {
        let user_id = self.verify_refresh_token(refresh_token)?;
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or(JwtError::InvalidToken)?;
        self.issue_access_token(&user)
    }

    fn is_expired(&self, exp: i64) -> bool {
        self.clock.timestamp() >= exp
    }

    fn decode_checked<T: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> Result<T, JwtError> {
        decode::<T>(token, key, &validation())
            .map(|data| data.claims)
            .map_err(|_| JwtError::InvalidToken)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// 서명/형식 검증 설정. 만료는 [`TokenService`]가 직접 판정합니다.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerlaunch_core::{FixedClock, NewUser};
    use proptest::prelude::*;

    use crate::repository::InMemoryStore;

    const ACCESS_SECRET: &str = "test-access-secret-key-minimum-32-chars";
    const REFRESH_SECRET: &str = "test-refresh-secret-key-minimum-32-chars";
    const T0: i64 = 1_700_000_000;

    fn service_with_clock(clock: Arc<FixedClock>) -> TokenService {
        TokenService::new(&AuthConfig::new(ACCESS_SECRET, REFRESH_SECRET), clock)
    }

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "unused".to_string(),
            phone_number: None,
            school: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let mut config = AuthConfig::new(ACCESS_SECRET, REFRESH_SECRET);
        config.access_token_ttl_minutes = i64::MAX;
        config.refresh_token_ttl_days = i64::MAX;

        let service = TokenService::new(&config, Arc::new(FixedClock::new(T0)));
        assert_eq!(service.access_ttl_secs(), MAX_ACCESS_TOKEN_TTL_MINUTES * 60);

        let user = user(Role::Candidate);
        let refresh = service.issue_refresh_token(&user).unwrap();
        assert_eq!(service.verify_refresh_token(&refresh).unwrap(), user.id);
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service_with_clock(Arc::new(FixedClock::new(T0)));
        let user = user(Role::Recruiter);

        let token = service.issue_access_token(&user).unwrap();
        let identity = service.verify_access_token(&token).unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.role, Role::Recruiter);
    }

    #[test]
    fn test_access_token_expiry_boundary() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_with_clock(clock.clone());
        let token = service.issue_access_token(&user(Role::Candidate)).unwrap();

        // 14분 59초: 유효
        clock.advance(Duration::seconds(14 * 60 + 59));
        assert!(service.verify_access_token(&token).is_ok());

        // 15분: 만료
        clock.advance(Duration::seconds(1));
        assert!(matches!(
            service.verify_access_token(&token),
            Err(JwtError::InvalidToken)
        ));

        clock.advance(Duration::hours(1));
        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_expiry_boundary() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_with_clock(clock.clone());
        let user = user(Role::Candidate);
        let token = service.issue_refresh_token(&user).unwrap();

        clock.advance(Duration::days(7) - Duration::seconds(1));
        assert_eq!(service.verify_refresh_token(&token).unwrap(), user.id);

        clock.advance(Duration::seconds(1));
        assert!(service.verify_refresh_token(&token).is_err());
    }

    #[test]
    fn test_token_kind_confusion_rejected() {
        let service = service_with_clock(Arc::new(FixedClock::new(T0)));
        let user = user(Role::Candidate);
        let pair = service.issue_token_pair(&user).unwrap();

        assert!(service.verify_access_token(&pair.refresh_token).is_err());
        assert!(service.verify_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_token_kind_confusion_rejected_with_shared_secret() {
        // 비밀 키가 같아도 페이로드 종류 검사로 거부되어야 함
        let config = AuthConfig::new(ACCESS_SECRET, ACCESS_SECRET);
        let service = TokenService::new(&config, Arc::new(FixedClock::new(T0)));
        let pair = service.issue_token_pair(&user(Role::Recruiter)).unwrap();

        assert!(service.verify_access_token(&pair.refresh_token).is_err());
        assert!(service.verify_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_with_clock(clock.clone());
        let forger = TokenService::new(
            &AuthConfig::new("attacker-access-secret", "attacker-refresh-secret"),
            clock,
        );
        let user = user(Role::Recruiter);

        let forged = forger.issue_access_token(&user).unwrap();
        assert!(matches!(
            service.verify_access_token(&forged),
            Err(JwtError::InvalidToken)
        ));

        let forged_refresh = forger.issue_refresh_token(&user).unwrap();
        assert!(service.verify_refresh_token(&forged_refresh).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let service = service_with_clock(Arc::new(FixedClock::new(T0)));

        for token in ["", "invalid.token.here", "a.b", "Bearer xyz"] {
            assert!(matches!(
                service.verify_access_token(token),
                Err(JwtError::InvalidToken)
            ));
            assert!(service.verify_refresh_token(token).is_err());
        }
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "a@b.com".to_string(),
            role: Role::Candidate,
            iat: T0,
            exp: T0 + 900,
            jti: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        let service = service_with_clock(Arc::new(FixedClock::new(T0)));
        assert!(service.verify_access_token(&token).is_err());
    }

    #[tokio::test]
    async fn test_refresh_reflects_current_role() {
        let clock = Arc::new(FixedClock::new(T0));
        let service = service_with_clock(clock.clone());
        let store = InMemoryStore::new();
        let created = UserRepository::create(
            &store,
            NewUser {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                email: "a@b.com".to_string(),
                password_hash: "unused".to_string(),
                phone_number: None,
                school: None,
                role: Role::Candidate,
            },
        )
        .await
        .unwrap();

        let refresh_token = service.issue_refresh_token(&created).unwrap();

        // 토큰 발급 이후 역할 변경
        store.set_role(created.id, Role::Recruiter).await;
        clock.advance(Duration::days(1));

        let access = service.refresh(&refresh_token, &store).await.unwrap();
        let identity = service.verify_access_token(&access).unwrap();
        assert_eq!(identity.user_id, created.id);
        assert_eq!(identity.role, Role::Recruiter);
    }

    #[tokio::test]
    async fn test_refresh_for_missing_user_is_invalid() {
        let service = service_with_clock(Arc::new(FixedClock::new(T0)));
        let store = InMemoryStore::new();
        let ghost = user(Role::Candidate);

        let refresh_token = service.issue_refresh_token(&ghost).unwrap();
        let result = service.refresh(&refresh_token, &store).await;
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    proptest! {
        #[test]
        fn prop_access_token_round_trip(
            local in "[a-z0-9]{1,16}",
            domain in "[a-z]{1,12}",
            recruiter in any::<bool>(),
            elapsed in 0i64..900,
        ) {
            let clock = Arc::new(FixedClock::new(T0));
            let service = service_with_clock(clock.clone());
            let mut u = user(if recruiter { Role::Recruiter } else { Role::Candidate });
            u.email = format!("{}@{}.com", local, domain);

            let token = service.issue_access_token(&u).unwrap();
            clock.advance(Duration::seconds(elapsed));
            let identity = service.verify_access_token(&token).unwrap();

            prop_assert_eq!(identity.user_id, u.id);
            prop_assert_eq!(identity.email, u.email);
            prop_assert_eq!(identity.role, u.role);
        }
    }
}
