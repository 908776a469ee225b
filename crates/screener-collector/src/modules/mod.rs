//! 파이프라인 단계 모듈.

pub mod daily_update;
pub mod index_collect;
pub mod market_summary;
pub mod screening;
pub mod symbol_sync;

pub use daily_update::collect_daily;
pub use index_collect::collect_indices;
pub use market_summary::update_summary;
pub use screening::{run_screening, MAX_SIGNALS, MIN_SIGNAL_STRENGTH};
pub use symbol_sync::sync_symbols;
