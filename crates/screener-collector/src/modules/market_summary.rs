//! 일일 시장 요약 생성 모듈.
//!
//! 기준일의 신호 집계, 등락 종목 수, 대표 지수, 섹터 분포를 모아
//! `market_summary` 한 행으로 upsert합니다.

use std::time::Instant;

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::CollectorError;
use crate::{CollectionStats, CollectorConfig, Result};
use screener_core::MarketSummary;
use screener_data::{MarketStore, PriceStore, SignalStore, INDEX_KOSDAQ, INDEX_KOSPI};

/// 섹터 분포에 포함하는 상위 섹터 수.
const TOP_SECTOR_COUNT: i64 = 5;

/// 일일 시장 요약 생성
pub async fn update_summary(
    pool: &PgPool,
    _config: &CollectorConfig,
    date: Option<NaiveDate>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();
    stats.total = 1;

    let price_store = PriceStore::new(pool.clone());
    let signal_store = SignalStore::new(pool.clone());
    let market_store = MarketStore::new(pool.clone());

    let target_date = match date {
        Some(d) => d,
        None => price_store
            .latest_trade_date()
            .await?
            .ok_or_else(|| CollectorError::DataSource("일봉 데이터가 없습니다".to_string()))?,
    };

    tracing::info!(target_date = %target_date, "시장 요약 생성 시작");

    let (total_signals, strong_signals) = signal_store.signal_counts(target_date).await?;
    let breadth = market_store.price_breadth(target_date).await?;
    let kospi = market_store.latest_index(INDEX_KOSPI).await?;
    let kosdaq = market_store.latest_index(INDEX_KOSDAQ).await?;
    let sectors = signal_store.top_sectors(target_date, TOP_SECTOR_COUNT).await?;

    let summary = MarketSummary {
        summary_date: target_date,
        kospi_index: kospi.as_ref().map(|b| b.value),
        kospi_change_pct: kospi.as_ref().and_then(|b| b.change_percent),
        kosdaq_index: kosdaq.as_ref().map(|b| b.value),
        kosdaq_change_pct: kosdaq.as_ref().and_then(|b| b.change_percent),
        total_signals: total_signals as i32,
        strong_signals: strong_signals as i32,
        rising_stocks: breadth.rising as i32,
        declining_stocks: breadth.declining as i32,
        unchanged_stocks: breadth.unchanged as i32,
        top_sectors: format_top_sectors(&sectors),
    };

    market_store.upsert_summary(&summary).await?;

    stats.success = 1;
    stats.total_records = 1;
    stats.elapsed = start.elapsed();

    tracing::info!(
        target_date = %target_date,
        total_signals = total_signals,
        strong_signals = strong_signals,
        rising = breadth.rising,
        declining = breadth.declining,
        "시장 요약 생성 완료"
    );
    Ok(stats)
}

/// 섹터 분포 직렬화 ("섹터:건수,섹터:건수" 형식).
fn format_top_sectors(sectors: &[(String, i64)]) -> Option<String> {
    if sectors.is_empty() {
        return None;
    }

    Some(
        sectors
            .iter()
            .map(|(sector, count)| format!("{}:{}", sector, count))
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_top_sectors() {
        let sectors = vec![
            ("전기전자".to_string(), 5),
            ("화학".to_string(), 3),
            ("운수장비".to_string(), 1),
        ];

        assert_eq!(
            format_top_sectors(&sectors),
            Some("전기전자:5,화학:3,운수장비:1".to_string())
        );
    }

    #[test]
    fn test_format_top_sectors_empty() {
        assert_eq!(format_top_sectors(&[]), None);
    }
}
