//! 비밀번호 해싱 유틸리티.
//!
//! bcrypt 기반 비밀번호 해싱 및 검증.
//! 해싱은 CPU를 오래 점유하므로 비동기 경로에서는 [`CredentialHasher`]를 통해
//! blocking 스레드 풀에서 실행합니다.

use std::sync::Arc;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// 솔트는 자동으로 생성되며 결과 문자열(`$2b$<cost>$...`)에 포함됩니다.
///
/// # Arguments
///
/// * `password` - 해싱할 평문 비밀번호
/// * `cost` - bcrypt work factor (4~31)
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|_| PasswordError::HashingFailed)
}

/// 비밀번호 검증.
///
/// 저장된 해시와 같은 알고리즘/비용으로 평문을 해싱해 비교합니다.
///
/// # Returns
///
/// 비밀번호가 일치하면 Ok(()), 불일치하면 `VerificationFailed`
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::VerificationFailed),
        Err(_) => Err(PasswordError::InvalidHashFormat),
    }
}

/// blocking 스레드 풀에서 해싱/검증을 수행하는 해셔.
///
/// 존재하지 않는 이메일로 로그인할 때도 같은 비용의 검증을 한 번 수행하도록
/// 더미 해시를 보관합니다.
#[derive(Clone)]
pub struct CredentialHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl CredentialHasher {
    /// 주어진 bcrypt 비용으로 해셔 생성.
    ///
    /// 더미 해시를 한 번 계산하므로 비용만큼 시간이 걸립니다.
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = hash_password("careerlaunch-unknown-account", cost)?;
        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// bcrypt work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// 비밀번호 해싱 (blocking 풀).
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|_| PasswordError::HashingFailed)?
    }

    /// 비밀번호 검증 (blocking 풀).
    pub async fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|_| PasswordError::VerificationFailed)?
    }

    /// 더미 해시에 대해 검증을 수행하고 결과는 버립니다.
    pub async fn verify_dummy(&self, password: &str) {
        let hash = self.dummy_hash.clone();
        let _ = self.verify(password, &hash).await;
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
