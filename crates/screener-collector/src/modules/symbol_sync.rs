//! 종목 유니버스 동기화 모듈.
//!
//! KRX에서 전종목 목록을 받아 시가총액 상위 N개를 유니버스로 뽑고
//! 종목 마스터에 upsert합니다. 유니버스에서 빠진 종목은 비활성으로
//! 전환될 뿐 삭제되지 않습니다.

use std::time::Instant;

use sqlx::PgPool;

use crate::{CollectionStats, CollectorConfig, Result};
use screener_core::StockInfo;
use screener_data::{MarketDataProvider, StockListing, StockStore};

/// 종목 유니버스 동기화
pub async fn sync_symbols(
    pool: &PgPool,
    config: &CollectorConfig,
    provider: &dyn MarketDataProvider,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("종목 유니버스 동기화 시작");

    let listings = provider.fetch_listing().await?;
    tracing::info!(count = listings.len(), "KRX 종목 목록 조회 완료");

    let universe = select_universe(listings, config.universe.max_stocks as usize);
    stats.total = universe.len();

    let stocks: Vec<StockInfo> = universe.iter().map(to_stock_info).collect();
    let keep: Vec<String> = stocks.iter().map(|s| s.symbol.clone()).collect();

    let store = StockStore::new(pool.clone());
    let saved = store.upsert_listings(&stocks).await?;
    let deactivated = store.deactivate_missing(&keep).await?;

    stats.success = saved;
    stats.total_records = saved;
    stats.skipped = deactivated as usize;
    stats.elapsed = start.elapsed();

    tracing::info!(
        universe = stats.total,
        deactivated = deactivated,
        "유니버스 동기화 완료"
    );
    Ok(stats)
}

/// 시가총액 상위 `max`개 선별.
///
/// 시가총액이 없는 종목은 뒤로 밀리며, 동률은 종목코드 순으로
/// 안정적으로 정렬됩니다.
fn select_universe(mut listings: Vec<StockListing>, max: usize) -> Vec<StockListing> {
    listings.sort_by(|a, b| {
        b.market_cap
            .cmp(&a.market_cap)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    listings.truncate(max);
    listings
}

/// 목록 항목 → 종목 마스터 레코드 변환.
///
/// 현재가 캐시 필드는 비워 둡니다 (Data Updater가 채움).
fn to_stock_info(listing: &StockListing) -> StockInfo {
    StockInfo {
        symbol: listing.symbol.clone(),
        name: listing.name.clone(),
        market: listing.market,
        sector: listing.sector.clone(),
        industry: None,
        market_cap: listing.market_cap,
        is_active: true,
        price: None,
        change: None,
        change_percent: None,
        volume: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::Market;

    fn listing(symbol: &str, market_cap: Option<i64>) -> StockListing {
        StockListing {
            symbol: symbol.to_string(),
            name: format!("종목{}", symbol),
            market: Market::Kospi,
            sector: Some("전기전자".to_string()),
            market_cap,
        }
    }

    #[test]
    fn test_select_universe_by_market_cap() {
        let listings = vec![
            listing("000100", Some(100)),
            listing("000200", Some(300)),
            listing("000300", Some(200)),
            listing("000400", None),
        ];

        let universe = select_universe(listings, 2);

        assert_eq!(universe.len(), 2);
        assert_eq!(universe[0].symbol, "000200");
        assert_eq!(universe[1].symbol, "000300");
    }

    #[test]
    fn test_select_universe_missing_cap_sorts_last() {
        let listings = vec![listing("000100", None), listing("000200", Some(1))];

        let universe = select_universe(listings, 10);

        assert_eq!(universe[0].symbol, "000200");
        assert_eq!(universe[1].symbol, "000100");
    }

    #[test]
    fn test_to_stock_info_leaves_quote_empty() {
        let info = to_stock_info(&listing("005930", Some(500)));

        assert_eq!(info.symbol, "005930");
        assert!(info.is_active);
        assert!(info.price.is_none());
        assert!(info.volume.is_none());
    }
}
