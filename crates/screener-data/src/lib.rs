//! 시장 데이터 수집과 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - `MarketDataProvider`: 외부 시세 소스 추상화 (KRX Open API 구현 포함)
//! - PostgreSQL 저장소: 일봉, 지표, 신호, 종목 마스터, 지수/요약
//!
//! 모든 쓰기는 식별 키 기준 upsert라 같은 배치를 다시 실행해도
//! 안전합니다.

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// Provider 재내보내기
pub use provider::{
    KrxClient, MarketDataProvider, ProviderBar, StockListing, INDEX_KOSDAQ, INDEX_KOSPI,
};

// 저장소 재내보내기
pub use storage::{
    IndicatorStore, MarketHealth, MarketStore, PriceBreadth, PriceStore, ReconcileOutcome,
    ScreeningCandidate, SignalStore, StockStore,
};
