//! 데이터 모듈 오류 타입.

use screener_core::ScreenerError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 데이터 삭제 오류
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::FetchError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<DataError> for ScreenerError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::FetchError(msg) => ScreenerError::Fetch(msg),
            DataError::ParseError(msg) | DataError::InvalidData(msg) => ScreenerError::Parse(msg),
            DataError::NotFound(msg) => ScreenerError::NotFound(msg),
            DataError::ConfigError(msg) => ScreenerError::Config(msg),
            DataError::SerializationError(msg) => ScreenerError::Parse(msg),
            other => ScreenerError::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_maps_to_transient() {
        let err: ScreenerError = DataError::FetchError("timeout".to_string()).into();
        assert!(err.is_transient());
    }

    #[test]
    fn test_config_error_maps_to_fatal() {
        let err: ScreenerError = DataError::ConfigError("missing key".to_string()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_query_error_maps_to_database() {
        let err: ScreenerError = DataError::QueryError("syntax".to_string()).into();
        assert!(matches!(err, ScreenerError::Database(_)));
    }
}
