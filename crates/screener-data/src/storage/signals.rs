//! 매수 신호 저장소.
//!
//! 신호 레코드는 (symbol, trade_date, signal_type)으로 식별되며
//! 삭제되지 않습니다. 하루치 스크리닝 결과 반영은 단일 트랜잭션의
//! reconcile로 처리되어, 어떤 시점에도 (symbol, signal_type)당 활성
//! 신호는 최근 처리일의 것 하나만 존재합니다.

use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use tracing::{info, instrument};

use crate::error::Result;
use screener_core::BuySignal;

/// reconcile 수행 결과.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOutcome {
    /// 비활성으로 전환된 과거 신호 수
    pub deactivated: u64,
    /// upsert된 당일 신호 수
    pub upserted: usize,
}

/// 매수 신호 저장소.
#[derive(Clone)]
pub struct SignalStore {
    pool: PgPool,
}

impl SignalStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 하루치 스크리닝 결과 반영.
    ///
    /// 단일 트랜잭션으로:
    /// 1. 기준일이 아닌 모든 활성 신호를 비활성으로 전환
    /// 2. 당일 신호를 (symbol, trade_date, signal_type) 기준 upsert
    /// 3. 한 번에 커밋 (실패 시 전체 롤백)
    ///
    /// 당일 신호가 0건이어도 1번은 수행되고 커밋됩니다.
    #[instrument(skip(self, signals), fields(count = signals.len()))]
    pub async fn reconcile(
        &self,
        target_date: NaiveDate,
        signals: &[BuySignal],
    ) -> Result<ReconcileOutcome> {
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(
            r#"
            UPDATE buy_signals
            SET is_active = false, updated_at = NOW()
            WHERE trade_date <> $1 AND is_active = true
            "#,
        )
        .bind(target_date)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for signal in signals {
            sqlx::query(
                r#"
                INSERT INTO buy_signals
                    (symbol, trade_date, signal_type, strength, reason,
                     rsi, macd, macd_signal, price, is_active, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, NOW())
                ON CONFLICT (symbol, trade_date, signal_type) DO UPDATE SET
                    strength = EXCLUDED.strength,
                    reason = EXCLUDED.reason,
                    rsi = EXCLUDED.rsi,
                    macd = EXCLUDED.macd,
                    macd_signal = EXCLUDED.macd_signal,
                    price = EXCLUDED.price,
                    is_active = true,
                    updated_at = NOW()
                "#,
            )
            .bind(&signal.symbol)
            .bind(signal.trade_date)
            .bind(&signal.signal_type)
            .bind(signal.strength)
            .bind(&signal.reason)
            .bind(signal.rsi)
            .bind(signal.macd)
            .bind(signal.macd_signal)
            .bind(signal.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let outcome = ReconcileOutcome {
            deactivated,
            upserted: signals.len(),
        };

        info!(
            target_date = %target_date,
            deactivated = outcome.deactivated,
            upserted = outcome.upserted,
            "신호 reconcile 완료"
        );
        Ok(outcome)
    }

    /// 활성 신호 목록 조회 (강도 내림차순, 종목코드 오름차순).
    ///
    /// 서빙 계층이 소비하는 조회입니다. `sector`가 지정되면 종목
    /// 마스터의 섹터로 필터링합니다.
    pub async fn list_active(
        &self,
        min_strength: i32,
        sector: Option<&str>,
        limit: i64,
    ) -> Result<Vec<BuySignal>> {
        let signals: Vec<BuySignal> = sqlx::query_as(
            r#"
            SELECT b.symbol, b.trade_date, b.signal_type, b.strength, b.reason,
                   b.rsi, b.macd, b.macd_signal, b.price, b.is_active
            FROM buy_signals b
            JOIN stocks s ON s.symbol = b.symbol
            WHERE b.is_active = true
              AND b.strength >= $1
              AND ($2::text IS NULL OR s.sector = $2)
            ORDER BY b.strength DESC, b.symbol ASC
            LIMIT $3
            "#,
        )
        .bind(min_strength)
        .bind(sector)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(signals)
    }

    /// 기준일의 활성 신호 수 집계 (전체, 강한 신호).
    ///
    /// 강한 신호는 강도 80 이상입니다. 시장 요약 생성에 사용됩니다.
    pub async fn signal_counts(&self, target_date: NaiveDate) -> Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE strength >= 80)
            FROM buy_signals
            WHERE trade_date = $1 AND is_active = true
            "#,
        )
        .bind(target_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// 기준일 활성 신호의 섹터별 상위 집계.
    pub async fn top_sectors(
        &self,
        target_date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT COALESCE(s.sector, '기타') AS sector, COUNT(*) AS cnt
            FROM buy_signals b
            JOIN stocks s ON s.symbol = b.symbol
            WHERE b.trade_date = $1 AND b.is_active = true
            GROUP BY COALESCE(s.sector, '기타')
            ORDER BY cnt DESC, sector ASC
            LIMIT $2
            "#,
        )
        .bind(target_date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
