//! Error types for SeedBridge
//!
//! 시작 단계(설정 로드)에서 발생하는 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SeedBridge 에러 타입
///
/// 호출 단위 에러는 `seedbridge-dispatch`의 `DispatchError`가 담당하고,
/// 여기의 에러는 프로세스 수준(설정, I/O)에서만 쓰인다.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    /// Malformed configuration. Fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 설정 에러 생성 헬퍼
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
