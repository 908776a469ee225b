//! 시장 지수 수집 모듈.
//!
//! 코스피/코스닥 대표 지수의 최근 일봉을 받아 upsert합니다.

use std::time::Instant;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::{CollectionStats, CollectorConfig, Result};
use screener_core::IndexBar;
use screener_data::{MarketDataProvider, MarketStore, ProviderBar, INDEX_KOSDAQ, INDEX_KOSPI};

/// 수집 대상 지수 (코드, 표시명).
const INDICES: [(&str, &str); 2] = [(INDEX_KOSPI, "KOSPI"), (INDEX_KOSDAQ, "KOSDAQ")];

/// 시장 지수 수집
pub async fn collect_indices(
    pool: &PgPool,
    config: &CollectorConfig,
    provider: &dyn MarketDataProvider,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(config.index_collect.lookback_days);

    tracing::info!(
        start_date = %start_date,
        end_date = %end_date,
        "지수 수집 시작"
    );

    let store = MarketStore::new(pool.clone());

    for (code, name) in INDICES {
        stats.total += 1;

        match provider.fetch_series(code, start_date, end_date).await {
            Ok(bars) if bars.is_empty() => {
                stats.empty += 1;
                tracing::warn!(code = code, "지수 데이터 없음");
            }
            Ok(bars) => {
                let index_bars = to_index_bars(code, name, bars);
                match store.save_index_bars(&index_bars).await {
                    Ok(saved) => {
                        stats.success += 1;
                        stats.total_records += saved;
                        tracing::info!(code = code, bars = saved, "지수 저장 완료");
                    }
                    Err(e) => {
                        stats.errors += 1;
                        tracing::error!(code = code, error = %e, "지수 저장 실패");
                    }
                }
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(code = code, error = %e, "지수 조회 실패");
            }
        }

        tokio::time::sleep(config.index_collect.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// Provider 일봉 → 지수 레코드 변환.
fn to_index_bars(code: &str, name: &str, bars: Vec<ProviderBar>) -> Vec<IndexBar> {
    bars.into_iter()
        .map(|b| IndexBar {
            code: code.to_string(),
            name: name.to_string(),
            trade_date: b.date,
            value: b.close,
            change: b.change,
            change_percent: b.change_percent,
            volume: Some(b.volume),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_index_bars() {
        let bars = vec![ProviderBar {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            open: dec!(2650),
            high: dec!(2670),
            low: dec!(2640),
            close: dec!(2666.84),
            volume: 500_000,
            change: Some(dec!(25.19)),
            change_percent: Some(dec!(0.95)),
        }];

        let index_bars = to_index_bars(INDEX_KOSPI, "KOSPI", bars);

        assert_eq!(index_bars.len(), 1);
        assert_eq!(index_bars[0].code, "KS11");
        assert_eq!(index_bars[0].value, dec!(2666.84));
        assert_eq!(index_bars[0].change_percent, Some(dec!(0.95)));
    }
}
