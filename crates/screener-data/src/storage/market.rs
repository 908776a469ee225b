//! 시장 지수/요약 저장소.
//!
//! 대표 지수(코스피/코스닥) 일봉과 하루 단위 시장 요약을 관리하고,
//! 데이터 상태 점검용 집계(market_health)를 제공합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};
use screener_core::{IndexBar, MarketSummary};

/// 기준일의 등락 종목 수.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceBreadth {
    /// 상승 종목 수
    pub rising: i64,
    /// 하락 종목 수
    pub declining: i64,
    /// 보합 종목 수
    pub unchanged: i64,
}

/// 데이터 상태 점검 집계.
#[derive(Debug, Clone)]
pub struct MarketHealth {
    /// 전체 종목 수
    pub total_symbols: i64,
    /// 활성 종목 수
    pub active_symbols: i64,
    /// 현재가 캐시가 비어 있는 활성 종목 수
    pub missing_quote: i64,
    /// 가장 최근 일봉 날짜
    pub latest_price_date: Option<NaiveDate>,
    /// 가장 최근 지표 날짜
    pub latest_indicator_date: Option<NaiveDate>,
    /// 최근 지표 날짜 기준 RSI 미정의 종목 수
    pub missing_rsi: i64,
}

impl MarketHealth {
    /// 활성 종목 중 현재가 캐시 누락 비율.
    pub fn quote_missing_ratio(&self) -> f64 {
        if self.active_symbols == 0 {
            return 0.0;
        }
        self.missing_quote as f64 / self.active_symbols as f64
    }
}

/// 시장 지수/요약 저장소.
#[derive(Clone)]
pub struct MarketStore {
    pool: PgPool,
}

impl MarketStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 지수 일봉 upsert.
    #[instrument(skip(self, bars), fields(count = bars.len()))]
    pub async fn save_index_bars(&self, bars: &[IndexBar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let codes: Vec<&str> = bars.iter().map(|b| b.code.as_str()).collect();
        let names: Vec<&str> = bars.iter().map(|b| b.name.as_str()).collect();
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.trade_date).collect();
        let values: Vec<Decimal> = bars.iter().map(|b| b.value).collect();
        let changes: Vec<Option<Decimal>> = bars.iter().map(|b| b.change).collect();
        let change_percents: Vec<Option<Decimal>> =
            bars.iter().map(|b| b.change_percent).collect();
        let volumes: Vec<Option<i64>> = bars.iter().map(|b| b.volume).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO market_indices
                (code, name, trade_date, value, change, change_percent,
                 volume, updated_at)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::date[], $4::numeric[],
                $5::numeric[], $6::numeric[], $7::bigint[]
            ), NOW()
            ON CONFLICT (code, trade_date) DO UPDATE SET
                name = EXCLUDED.name,
                value = EXCLUDED.value,
                change = EXCLUDED.change,
                change_percent = EXCLUDED.change_percent,
                volume = EXCLUDED.volume,
                updated_at = NOW()
            "#,
        )
        .bind(&codes)
        .bind(&names)
        .bind(&dates)
        .bind(&values)
        .bind(&changes)
        .bind(&change_percents)
        .bind(&volumes)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(e.to_string()))?;

        let saved = result.rows_affected() as usize;
        info!(saved = saved, "지수 일봉 저장 완료");
        Ok(saved)
    }

    /// 지수 코드의 가장 최근 일봉 조회.
    pub async fn latest_index(&self, code: &str) -> Result<Option<IndexBar>> {
        let bar: Option<IndexBar> = sqlx::query_as(
            r#"
            SELECT code, name, trade_date, value, change, change_percent, volume
            FROM market_indices
            WHERE code = $1
            ORDER BY trade_date DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bar)
    }

    /// 하루 단위 시장 요약 upsert (summary_date 기준).
    #[instrument(skip(self, summary), fields(summary_date = %summary.summary_date))]
    pub async fn upsert_summary(&self, summary: &MarketSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO market_summary
                (summary_date, kospi_index, kospi_change_pct,
                 kosdaq_index, kosdaq_change_pct,
                 total_signals, strong_signals,
                 rising_stocks, declining_stocks, unchanged_stocks,
                 top_sectors, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (summary_date) DO UPDATE SET
                kospi_index = EXCLUDED.kospi_index,
                kospi_change_pct = EXCLUDED.kospi_change_pct,
                kosdaq_index = EXCLUDED.kosdaq_index,
                kosdaq_change_pct = EXCLUDED.kosdaq_change_pct,
                total_signals = EXCLUDED.total_signals,
                strong_signals = EXCLUDED.strong_signals,
                rising_stocks = EXCLUDED.rising_stocks,
                declining_stocks = EXCLUDED.declining_stocks,
                unchanged_stocks = EXCLUDED.unchanged_stocks,
                top_sectors = EXCLUDED.top_sectors,
                updated_at = NOW()
            "#,
        )
        .bind(summary.summary_date)
        .bind(summary.kospi_index)
        .bind(summary.kospi_change_pct)
        .bind(summary.kosdaq_index)
        .bind(summary.kosdaq_change_pct)
        .bind(summary.total_signals)
        .bind(summary.strong_signals)
        .bind(summary.rising_stocks)
        .bind(summary.declining_stocks)
        .bind(summary.unchanged_stocks)
        .bind(&summary.top_sectors)
        .execute(&self.pool)
        .await?;

        info!("시장 요약 저장 완료");
        Ok(())
    }

    /// 기준일의 등락 종목 수 집계.
    ///
    /// 전일 대비 변화량 기준이며, 변화량이 없는 행은 보합으로 셉니다.
    pub async fn price_breadth(&self, target_date: NaiveDate) -> Result<PriceBreadth> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE change_amount > 0),
                   COUNT(*) FILTER (WHERE change_amount < 0),
                   COUNT(*) FILTER (WHERE COALESCE(change_amount, 0) = 0)
            FROM daily_prices
            WHERE trade_date = $1
            "#,
        )
        .bind(target_date)
        .fetch_one(&self.pool)
        .await?;

        let breadth = PriceBreadth {
            rising: row.0,
            declining: row.1,
            unchanged: row.2,
        };

        debug!(
            target_date = %target_date,
            rising = breadth.rising,
            declining = breadth.declining,
            unchanged = breadth.unchanged,
            "등락 종목 수 집계"
        );
        Ok(breadth)
    }

    /// 데이터 상태 점검 집계 조회.
    pub async fn market_health(&self) -> Result<MarketHealth> {
        let row: (i64, i64, i64, Option<NaiveDate>, Option<NaiveDate>, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM stocks),
                (SELECT COUNT(*) FROM stocks WHERE is_active),
                (SELECT COUNT(*) FROM stocks WHERE is_active AND price IS NULL),
                (SELECT MAX(trade_date) FROM daily_prices),
                (SELECT MAX(trade_date) FROM technical_indicators),
                (SELECT COUNT(*) FROM technical_indicators
                 WHERE trade_date = (SELECT MAX(trade_date) FROM technical_indicators)
                   AND rsi IS NULL)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(MarketHealth {
            total_symbols: row.0,
            active_symbols: row.1,
            missing_quote: row.2,
            latest_price_date: row.3,
            latest_indicator_date: row.4,
            missing_rsi: row.5,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_missing_ratio() {
        let health = MarketHealth {
            total_symbols: 250,
            active_symbols: 200,
            missing_quote: 50,
            latest_price_date: None,
            latest_indicator_date: None,
            missing_rsi: 0,
        };
        assert_eq!(health.quote_missing_ratio(), 0.25);
    }

    #[test]
    fn test_quote_missing_ratio_no_active() {
        let health = MarketHealth {
            total_symbols: 0,
            active_symbols: 0,
            missing_quote: 0,
            latest_price_date: None,
            latest_indicator_date: None,
            missing_rsi: 0,
        };
        assert_eq!(health.quote_missing_ratio(), 0.0);
    }
}
