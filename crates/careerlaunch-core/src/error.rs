//! 채용 게시판 핵심 에러 타입.
//!
//! 저장소와 설정 계층에서 발생하는 에러를 정의합니다.
//! HTTP 응답으로의 변환은 API 크레이트가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum BoardError {
    /// 이미 사용 중인 이메일 (저장소 유일성 제약 위반 포함)
    #[error("이미 사용 중인 이메일입니다")]
    DuplicateEmail,

    /// 같은 공고에 이미 지원함
    #[error("이미 지원한 공고입니다")]
    DuplicateApplication,

    /// 레코드를 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 저장된 데이터가 도메인 규칙과 맞지 않음
    #[error("손상된 레코드: {0}")]
    CorruptRecord(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 채용 게시판 작업을 위한 Result 타입.
pub type BoardResult<T> = Result<T, BoardError>;

impl BoardError {
    /// 유일성 제약 위반인지 확인합니다.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BoardError::DuplicateEmail | BoardError::DuplicateApplication
        )
    }
}

impl From<config::ConfigError> for BoardError {
    fn from(err: config::ConfigError) -> Self {
        BoardError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conflict() {
        assert!(BoardError::DuplicateEmail.is_conflict());
        assert!(BoardError::DuplicateApplication.is_conflict());
        assert!(!BoardError::NotFound("job".to_string()).is_conflict());
        assert!(!BoardError::Database("timeout".to_string()).is_conflict());
    }

    #[test]
    fn test_error_display() {
        let err = BoardError::Database("connection refused".to_string());
        assert_eq!(err.to_string(), "데이터베이스 에러: connection refused");
    }
}
