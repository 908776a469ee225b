//! 기술적 지표 저장소 (조회 전용).
//!
//! 지표 쓰기는 `PriceStore::save_series`의 종목 단위 트랜잭션에
//! 포함되므로, 이 저장소는 스크리닝 후보 조회와 이력 조회만 담당합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::debug;

use crate::error::Result;
use screener_core::IndicatorSnapshot;

/// 스크리닝 후보 행.
///
/// 기준일의 지표 스냅샷 중 1차 조건(RSI 과매도 + MACD 골든크로스)을
/// 만족하는 활성 종목입니다. 점수화에 필요한 값만 담습니다.
#[derive(Debug, Clone, FromRow)]
pub struct ScreeningCandidate {
    /// 종목 코드
    pub symbol: String,
    /// 기준일 RSI
    pub rsi: Decimal,
    /// 기준일 MACD
    pub macd: Decimal,
    /// 기준일 MACD 시그널
    pub macd_signal: Decimal,
    /// 기준일 종가
    pub price: Decimal,
    /// 기준일 거래량
    pub volume: i64,
}

/// 기술적 지표 저장소.
#[derive(Clone)]
pub struct IndicatorStore {
    pool: PgPool,
}

impl IndicatorStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 기준일의 스크리닝 1차 후보 조회.
    ///
    /// 조건: 활성 종목, RSI 정의됨 + 30 이하, MACD > 시그널.
    /// 거래량 비율과 점수 계산은 호출자(수집기)의 몫입니다.
    pub async fn screening_candidates(
        &self,
        target_date: NaiveDate,
    ) -> Result<Vec<ScreeningCandidate>> {
        let candidates: Vec<ScreeningCandidate> = sqlx::query_as(
            r#"
            SELECT i.symbol, i.rsi, i.macd, i.macd_signal,
                   p.close AS price, p.volume
            FROM technical_indicators i
            JOIN stocks s
              ON s.symbol = i.symbol AND s.is_active = true
            JOIN daily_prices p
              ON p.symbol = i.symbol AND p.trade_date = i.trade_date
            WHERE i.trade_date = $1
              AND i.rsi IS NOT NULL
              AND i.rsi <= 30
              AND i.macd IS NOT NULL
              AND i.macd_signal IS NOT NULL
              AND i.macd > i.macd_signal
            ORDER BY i.symbol
            "#,
        )
        .bind(target_date)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            target_date = %target_date,
            count = candidates.len(),
            "스크리닝 후보 조회"
        );
        Ok(candidates)
    }

    /// 기간 내 지표 이력 조회 (날짜 오름차순).
    pub async fn history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<IndicatorSnapshot>> {
        let snapshots: Vec<IndicatorSnapshot> = sqlx::query_as(
            r#"
            SELECT symbol, trade_date, rsi, macd, macd_signal, macd_histogram,
                   sma_20, sma_60
            FROM technical_indicators
            WHERE symbol = $1 AND trade_date >= $2 AND trade_date <= $3
            ORDER BY trade_date ASC
            "#,
        )
        .bind(symbol)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }

    /// 전체 테이블에서 가장 최근 지표 날짜 조회.
    pub async fn latest_date(&self) -> Result<Option<NaiveDate>> {
        let row: (Option<NaiveDate>,) =
            sqlx::query_as("SELECT MAX(trade_date) FROM technical_indicators")
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
