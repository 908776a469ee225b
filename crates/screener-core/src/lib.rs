//! 스크리너 핵심 도메인 모델.
//!
//! 이 crate는 스크리닝 파이프라인 전반에서 사용되는 타입을 정의합니다:
//! - 일별 주가 / 기술적 지표 / 매수 신호 / 종목 마스터 레코드
//! - 공통 에러 타입 (`ScreenerError`)

pub mod domain;
pub mod error;

pub use domain::indicator::IndicatorSnapshot;
pub use domain::market::{IndexBar, MarketSummary};
pub use domain::price::DailyBar;
pub use domain::signal::{BuySignal, SIGNAL_RSI_OVERSOLD_MACD_GOLDEN};
pub use domain::stock::{Market, StockInfo};
pub use error::{ScreenerError, ScreenerResult};
