//! 일봉 수집 + 지표 계산 모듈.
//!
//! 종목별로 조회 구간의 일봉을 받아 최근 N개로 잘라내고, 지표를
//! 계산해 종목 단위 트랜잭션으로 저장합니다. 한 종목의 실패가 다른
//! 종목의 수집을 막지 않습니다.

use std::time::Instant;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::{CollectionStats, CollectorConfig, Result};
use screener_analytics::IndicatorEngine;
use screener_core::DailyBar;
use screener_data::{MarketDataProvider, PriceStore, ProviderBar, StockStore};

/// 일봉 수집 및 지표 갱신
pub async fn collect_daily(
    pool: &PgPool,
    config: &CollectorConfig,
    provider: &dyn MarketDataProvider,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("일봉 수집 시작");

    // 수집할 심볼 목록 결정
    let target_symbols = match symbols {
        Some(ref s) => {
            let syms: Vec<String> = s.split(',').map(|s| s.trim().to_string()).collect();
            tracing::info!(count = syms.len(), "특정 심볼 수집");
            syms
        }
        None => {
            let store = StockStore::new(pool.clone());
            let syms = store.active_symbols(config.universe.max_stocks).await?;
            tracing::info!(count = syms.len(), "활성 종목 조회 완료");
            syms
        }
    };

    if target_symbols.is_empty() {
        tracing::warn!("수집할 심볼이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(config.daily_update.lookback_days);

    tracing::info!(
        symbols = target_symbols.len(),
        start_date = %start_date,
        end_date = %end_date,
        "수집 범위 설정 완료"
    );

    let price_store = PriceStore::new(pool.clone());
    let engine = IndicatorEngine::new();

    for (idx, symbol) in target_symbols.iter().enumerate() {
        stats.total += 1;

        tracing::debug!(
            symbol = symbol.as_str(),
            progress = format!("{}/{}", idx + 1, target_symbols.len()),
            "수집 시작"
        );

        match provider.fetch_series(symbol, start_date, end_date).await {
            Ok(provider_bars) if provider_bars.is_empty() => {
                stats.empty += 1;
                tracing::debug!(symbol = symbol.as_str(), "데이터 없음");
            }
            Ok(provider_bars) => {
                let bars = tail_trim(
                    to_daily_bars(symbol, provider_bars),
                    config.daily_update.retention_bars,
                );

                let annotated = engine.annotate(&bars);
                let (bars, snapshots): (Vec<_>, Vec<_>) = annotated
                    .into_iter()
                    .map(|day| (day.bar, day.snapshot))
                    .unzip();

                match price_store.save_series(symbol, &bars, &snapshots).await {
                    Ok(saved) => {
                        stats.success += 1;
                        stats.total_records += saved;
                        tracing::info!(
                            symbol = symbol.as_str(),
                            bars = bars.len(),
                            "수집 및 저장 완료"
                        );
                    }
                    Err(e) => {
                        stats.errors += 1;
                        tracing::error!(symbol = symbol.as_str(), error = %e, "저장 실패");
                    }
                }
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "조회 실패");
            }
        }

        // Rate limiting
        tokio::time::sleep(config.daily_update.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// Provider 일봉 → 도메인 일봉 변환.
///
/// 변동률 필드는 지표 엔진이 전체 시계열에서 다시 계산하므로
/// 여기서는 비워 둡니다.
fn to_daily_bars(symbol: &str, bars: Vec<ProviderBar>) -> Vec<DailyBar> {
    bars.into_iter()
        .map(|b| DailyBar {
            symbol: symbol.to_string(),
            trade_date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
            change_amount: None,
            change_percent: None,
        })
        .collect()
}

/// 최근 `retention`개 캔들만 남기는 꼬리 자르기.
fn tail_trim(mut bars: Vec<DailyBar>, retention: usize) -> Vec<DailyBar> {
    if bars.len() > retention {
        bars.drain(..bars.len() - retention);
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn make_bars(count: usize) -> Vec<DailyBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..count)
            .map(|i| DailyBar {
                symbol: "005930".to_string(),
                trade_date: start + Duration::days(i as i64),
                open: Decimal::from(100),
                high: Decimal::from(110),
                low: Decimal::from(90),
                close: Decimal::from(105),
                volume: 1_000,
                change_amount: None,
                change_percent: None,
            })
            .collect()
    }

    #[test]
    fn test_tail_trim_keeps_most_recent() {
        let bars = make_bars(200);
        let trimmed = tail_trim(bars.clone(), 180);

        assert_eq!(trimmed.len(), 180);
        assert_eq!(trimmed[0].trade_date, bars[20].trade_date);
        assert_eq!(trimmed[179].trade_date, bars[199].trade_date);
    }

    #[test]
    fn test_tail_trim_short_series_untouched() {
        let bars = make_bars(50);
        let trimmed = tail_trim(bars, 180);
        assert_eq!(trimmed.len(), 50);
    }

    #[test]
    fn test_to_daily_bars_clears_change_fields() {
        let provider_bars = vec![ProviderBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: Decimal::from(100),
            high: Decimal::from(110),
            low: Decimal::from(90),
            close: Decimal::from(105),
            volume: 1_000,
            change: Some(Decimal::from(5)),
            change_percent: Some(Decimal::from(5)),
        }];

        let bars = to_daily_bars("005930", provider_bars);

        assert_eq!(bars[0].symbol, "005930");
        assert!(bars[0].change_amount.is_none());
        assert!(bars[0].change_percent.is_none());
    }
}
