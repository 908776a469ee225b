//! 일봉 가격 저장소.
//!
//! 일봉과 지표 스냅샷을 종목 단위 트랜잭션으로 upsert하고, 종목
//! 마스터의 현재가 캐시를 최신 일봉으로 갱신합니다. 같은 구간을
//! 다시 저장해도 결과는 동일합니다 (멱등).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};
use screener_core::{DailyBar, IndicatorSnapshot};

/// 일봉 가격 저장소.
#[derive(Clone)]
pub struct PriceStore {
    pool: PgPool,
}

impl PriceStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 한 종목의 일봉 + 지표 시계열 저장.
    ///
    /// 하나의 트랜잭션으로 처리됩니다:
    /// 1. 일봉 upsert (symbol, trade_date 기준)
    /// 2. 지표 스냅샷 upsert (symbol, trade_date 기준)
    /// 3. 종목 마스터의 현재가 캐시를 마지막 일봉으로 갱신
    ///
    /// 중간 실패 시 전체 롤백되어 종목 단위 일관성이 유지됩니다.
    #[instrument(skip(self, bars, snapshots), fields(count = bars.len()))]
    pub async fn save_series(
        &self,
        symbol: &str,
        bars: &[DailyBar],
        snapshots: &[IndicatorSnapshot],
    ) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }
        if bars.len() != snapshots.len() {
            return Err(DataError::InvalidData(format!(
                "일봉({})과 지표({}) 시계열 길이 불일치: {}",
                bars.len(),
                snapshots.len(),
                symbol
            )));
        }

        let mut tx = self.pool.begin().await?;
        let mut saved = 0;

        // UNNEST 패턴으로 일괄 삽입 (N+1 쿼리 문제 해결)
        for chunk in bars.chunks(500) {
            let symbols: Vec<&str> = chunk.iter().map(|_| symbol).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|b| b.trade_date).collect();
            let opens: Vec<Decimal> = chunk.iter().map(|b| b.open).collect();
            let highs: Vec<Decimal> = chunk.iter().map(|b| b.high).collect();
            let lows: Vec<Decimal> = chunk.iter().map(|b| b.low).collect();
            let closes: Vec<Decimal> = chunk.iter().map(|b| b.close).collect();
            let volumes: Vec<i64> = chunk.iter().map(|b| b.volume).collect();
            let change_amounts: Vec<Option<Decimal>> =
                chunk.iter().map(|b| b.change_amount).collect();
            let change_percents: Vec<Option<Decimal>> =
                chunk.iter().map(|b| b.change_percent).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO daily_prices
                    (symbol, trade_date, open, high, low, close, volume,
                     change_amount, change_percent, updated_at)
                SELECT * FROM UNNEST(
                    $1::text[], $2::date[],
                    $3::numeric[], $4::numeric[], $5::numeric[], $6::numeric[], $7::bigint[],
                    $8::numeric[], $9::numeric[]
                ), NOW()
                ON CONFLICT (symbol, trade_date) DO UPDATE SET
                    open = EXCLUDED.open,
                    high = EXCLUDED.high,
                    low = EXCLUDED.low,
                    close = EXCLUDED.close,
                    volume = EXCLUDED.volume,
                    change_amount = EXCLUDED.change_amount,
                    change_percent = EXCLUDED.change_percent,
                    updated_at = NOW()
                "#,
            )
            .bind(&symbols)
            .bind(&dates)
            .bind(&opens)
            .bind(&highs)
            .bind(&lows)
            .bind(&closes)
            .bind(&volumes)
            .bind(&change_amounts)
            .bind(&change_percents)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            saved += result.rows_affected() as usize;
        }

        for chunk in snapshots.chunks(500) {
            let symbols: Vec<&str> = chunk.iter().map(|_| symbol).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|s| s.trade_date).collect();
            let rsis: Vec<Option<Decimal>> = chunk.iter().map(|s| s.rsi).collect();
            let macds: Vec<Option<Decimal>> = chunk.iter().map(|s| s.macd).collect();
            let macd_signals: Vec<Option<Decimal>> =
                chunk.iter().map(|s| s.macd_signal).collect();
            let macd_histograms: Vec<Option<Decimal>> =
                chunk.iter().map(|s| s.macd_histogram).collect();
            let sma_20s: Vec<Option<Decimal>> = chunk.iter().map(|s| s.sma_20).collect();
            let sma_60s: Vec<Option<Decimal>> = chunk.iter().map(|s| s.sma_60).collect();

            sqlx::query(
                r#"
                INSERT INTO technical_indicators
                    (symbol, trade_date, rsi, macd, macd_signal, macd_histogram,
                     sma_20, sma_60, updated_at)
                SELECT * FROM UNNEST(
                    $1::text[], $2::date[],
                    $3::numeric[], $4::numeric[], $5::numeric[], $6::numeric[],
                    $7::numeric[], $8::numeric[]
                ), NOW()
                ON CONFLICT (symbol, trade_date) DO UPDATE SET
                    rsi = EXCLUDED.rsi,
                    macd = EXCLUDED.macd,
                    macd_signal = EXCLUDED.macd_signal,
                    macd_histogram = EXCLUDED.macd_histogram,
                    sma_20 = EXCLUDED.sma_20,
                    sma_60 = EXCLUDED.sma_60,
                    updated_at = NOW()
                "#,
            )
            .bind(&symbols)
            .bind(&dates)
            .bind(&rsis)
            .bind(&macds)
            .bind(&macd_signals)
            .bind(&macd_histograms)
            .bind(&sma_20s)
            .bind(&sma_60s)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;
        }

        // 종목 마스터의 현재가 캐시는 항상 마지막 일봉을 따라감
        if let Some(last) = bars.last() {
            sqlx::query(
                r#"
                UPDATE stocks SET
                    price = $2,
                    change = $3,
                    change_percent = $4,
                    volume = $5,
                    updated_at = NOW()
                WHERE symbol = $1
                "#,
            )
            .bind(symbol)
            .bind(last.close)
            .bind(last.change_amount)
            .bind(last.change_percent)
            .bind(last.volume)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(symbol = symbol, saved = saved, "일봉/지표 시계열 저장 완료");
        Ok(saved)
    }

    /// 최신 일봉 조회 (날짜 오름차순, 최신 `limit`개).
    pub async fn history(&self, symbol: &str, limit: i64) -> Result<Vec<DailyBar>> {
        let mut bars: Vec<DailyBar> = sqlx::query_as(
            r#"
            SELECT symbol, trade_date, open, high, low, close, volume,
                   change_amount, change_percent
            FROM daily_prices
            WHERE symbol = $1
            ORDER BY trade_date DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // 시간순 정렬 (오래된 것부터)
        bars.reverse();

        debug!(symbol = symbol, count = bars.len(), "일봉 이력 조회");
        Ok(bars)
    }

    /// 기준일 이전의 최근 거래량 조회 (최신순, 최대 `limit`개).
    ///
    /// 거래량 비율 계산에 사용됩니다. 기준일 당일은 제외됩니다.
    pub async fn recent_volumes(
        &self,
        symbol: &str,
        before: NaiveDate,
        limit: i64,
    ) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT volume FROM daily_prices
            WHERE symbol = $1 AND trade_date < $2
            ORDER BY trade_date DESC
            LIMIT $3
            "#,
        )
        .bind(symbol)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// 전체 테이블에서 가장 최근 거래일 조회.
    pub async fn latest_trade_date(&self) -> Result<Option<NaiveDate>> {
        let row: (Option<NaiveDate>,) =
            sqlx::query_as("SELECT MAX(trade_date) FROM daily_prices")
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
