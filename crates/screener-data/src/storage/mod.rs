//! PostgreSQL 저장소.
//!
//! 엔티티별 저장소는 모두 `PgPool`을 소유하며, 식별 키 기준의
//! ON CONFLICT upsert와 조회 쿼리를 제공합니다. 일괄 쓰기는
//! UNNEST 패턴으로 N+1 쿼리를 피합니다.

pub mod indicators;
pub mod market;
pub mod prices;
pub mod signals;
pub mod stocks;

pub use indicators::{IndicatorStore, ScreeningCandidate};
pub use market::{MarketHealth, MarketStore, PriceBreadth};
pub use prices::PriceStore;
pub use signals::{ReconcileOutcome, SignalStore};
pub use stocks::StockStore;
