//! 일일 스크리닝 파이프라인 배치 수집기.
//!
//! 이 crate는 서빙 계층과 독립적으로 실행되는 배치 바이너리를 제공합니다:
//! - 종목 유니버스 동기화 (KRX, 시가총액 상위)
//! - 일봉 수집 + 지표 계산
//! - 매수 신호 스크리닝 및 reconcile
//! - 시장 지수 수집과 일일 시장 요약 생성

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
