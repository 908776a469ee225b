//! 스크리닝 시스템의 에러 타입.
//!
//! 배치 파이프라인의 에러 처리 규칙:
//! - 일시적 수집 실패는 해당 종목만 건너뛰고 배치를 계속합니다.
//! - 계산 실패는 null/0으로 해소하며 치명적 에러로 전파하지 않습니다.
//! - 설정 에러는 배치를 즉시 중단합니다.

use thiserror::Error;

/// 핵심 스크리너 에러.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// 설정 에러 (배치 즉시 중단)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 수집 에러 (일시적, 종목 단위 스킵)
    #[error("데이터 수집 에러: {0}")]
    Fetch(String),

    /// 지표/점수 계산 에러
    #[error("계산 에러: {0}")]
    Computation(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),
}

/// 스크리너 작업을 위한 Result 타입.
pub type ScreenerResult<T> = Result<T, ScreenerError>;

impl ScreenerError {
    /// 종목 단위로 건너뛰고 배치를 계속할 수 있는 에러인지 확인합니다.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScreenerError::Fetch(_) | ScreenerError::Computation(_) | ScreenerError::NotFound(_)
        )
    }

    /// 배치 전체를 중단해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScreenerError::Config(_))
    }
}

impl From<serde_json::Error> for ScreenerError {
    fn from(err: serde_json::Error) -> Self {
        ScreenerError::Parse(err.to_string())
    }
}
