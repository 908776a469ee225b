//! 종목 마스터 저장소.
//!
//! 유니버스 동기화는 "빠진 종목은 비활성, 새 종목은 추가" 원칙을
//! 따릅니다. 레코드를 삭제하지 않아 과거 신호와 가격 이력의 참조가
//! 항상 유효합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};
use screener_core::{Market, StockInfo};

/// stocks 테이블 행 (market은 텍스트로 저장).
#[derive(Debug, Clone, FromRow)]
struct StockRow {
    symbol: String,
    name: String,
    market: String,
    sector: Option<String>,
    industry: Option<String>,
    market_cap: Option<i64>,
    is_active: bool,
    price: Option<Decimal>,
    change: Option<Decimal>,
    change_percent: Option<Decimal>,
    volume: Option<i64>,
}

impl From<StockRow> for StockInfo {
    fn from(row: StockRow) -> Self {
        StockInfo {
            symbol: row.symbol,
            name: row.name,
            market: row.market.parse::<Market>().unwrap_or_default(),
            sector: row.sector,
            industry: row.industry,
            market_cap: row.market_cap,
            is_active: row.is_active,
            price: row.price,
            change: row.change,
            change_percent: row.change_percent,
            volume: row.volume,
        }
    }
}

/// 종목 마스터 저장소.
#[derive(Clone)]
pub struct StockStore {
    pool: PgPool,
}

impl StockStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 종목 목록 upsert.
    ///
    /// symbol 기준으로 이름/시장/섹터/시가총액을 갱신하고 활성으로
    /// 전환합니다. 현재가 캐시는 건드리지 않습니다 (Data Updater 소유).
    #[instrument(skip(self, stocks), fields(count = stocks.len()))]
    pub async fn upsert_listings(&self, stocks: &[StockInfo]) -> Result<usize> {
        if stocks.is_empty() {
            return Ok(0);
        }

        let mut saved = 0;

        for chunk in stocks.chunks(500) {
            let symbols: Vec<&str> = chunk.iter().map(|s| s.symbol.as_str()).collect();
            let names: Vec<&str> = chunk.iter().map(|s| s.name.as_str()).collect();
            let markets: Vec<String> = chunk.iter().map(|s| s.market.to_string()).collect();
            let sectors: Vec<Option<&str>> =
                chunk.iter().map(|s| s.sector.as_deref()).collect();
            let industries: Vec<Option<&str>> =
                chunk.iter().map(|s| s.industry.as_deref()).collect();
            let market_caps: Vec<Option<i64>> = chunk.iter().map(|s| s.market_cap).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stocks
                    (symbol, name, market, sector, industry, market_cap,
                     updated_at, is_active)
                SELECT *, true FROM UNNEST(
                    $1::text[], $2::text[], $3::text[],
                    $4::text[], $5::text[], $6::bigint[]
                ), NOW()
                ON CONFLICT (symbol) DO UPDATE SET
                    name = EXCLUDED.name,
                    market = EXCLUDED.market,
                    sector = EXCLUDED.sector,
                    industry = EXCLUDED.industry,
                    market_cap = EXCLUDED.market_cap,
                    is_active = true,
                    updated_at = NOW()
                "#,
            )
            .bind(&symbols)
            .bind(&names)
            .bind(&markets)
            .bind(&sectors)
            .bind(&industries)
            .bind(&market_caps)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            saved += result.rows_affected() as usize;
        }

        info!(saved = saved, "종목 마스터 upsert 완료");
        Ok(saved)
    }

    /// 유니버스에서 빠진 종목 비활성 전환.
    ///
    /// `keep`에 포함되지 않은 활성 종목을 is_active = false로 바꿉니다.
    /// 삭제는 하지 않습니다.
    pub async fn deactivate_missing(&self, keep: &[String]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE stocks
            SET is_active = false, updated_at = NOW()
            WHERE is_active = true AND symbol <> ALL($1)
            "#,
        )
        .bind(keep)
        .execute(&self.pool)
        .await?;

        let deactivated = result.rows_affected();
        if deactivated > 0 {
            info!(deactivated = deactivated, "유니버스 이탈 종목 비활성 전환");
        }
        Ok(deactivated)
    }

    /// 활성 종목 코드 목록 (시가총액 내림차순, 최대 `limit`개).
    pub async fn active_symbols(&self, limit: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT symbol FROM stocks
            WHERE is_active = true
            ORDER BY market_cap DESC NULLS LAST, symbol ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// 종목 단건 조회.
    pub async fn get(&self, symbol: &str) -> Result<Option<StockInfo>> {
        let row: Option<StockRow> = sqlx::query_as(
            r#"
            SELECT symbol, name, market, sector, industry, market_cap,
                   is_active, price, change, change_percent, volume
            FROM stocks
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StockInfo::from))
    }

    /// 전체/활성 종목 수 집계.
    pub async fn counts(&self) -> Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE is_active)
            FROM stocks
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// 특정 날짜 이후 시세가 갱신되지 않은 활성 종목 수.
    pub async fn stale_quote_count(&self, since: NaiveDate) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM stocks s
            WHERE s.is_active = true
              AND NOT EXISTS (
                  SELECT 1 FROM daily_prices p
                  WHERE p.symbol = s.symbol AND p.trade_date >= $1
              )
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        debug!(since = %since, stale = row.0, "시세 미갱신 종목 수 조회");
        Ok(row.0)
    }
}
