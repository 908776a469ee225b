//! 시장 데이터 Provider.
//!
//! 외부 데이터 소스(KRX Open API 등)에서 일봉 시세와 종목 목록을
//! 가져오는 추상화 계층입니다. 수집기는 이 trait에만 의존하므로
//! 데이터 소스 교체 시 수집 로직은 변경되지 않습니다.

pub mod krx;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use screener_core::Market;

pub use krx::KrxClient;

/// Provider가 반환하는 원시 일봉.
///
/// 종목과 지수 모두 이 형태로 정규화됩니다. 지수의 경우 open/high/low는
/// 제공되지 않을 수 있어 close로 채워집니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가 (지수는 지수값)
    pub close: Decimal,
    /// 거래량
    pub volume: i64,
    /// 전일 대비 (소스가 제공하는 경우)
    pub change: Option<Decimal>,
    /// 등락률 % (소스가 제공하는 경우)
    pub change_percent: Option<Decimal>,
}

/// Provider가 반환하는 종목 목록 항목.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListing {
    /// 단축코드 (6자리)
    pub symbol: String,
    /// 종목명
    pub name: String,
    /// 소속 시장
    pub market: Market,
    /// 업종
    pub sector: Option<String>,
    /// 시가총액 (원)
    pub market_cap: Option<i64>,
}

/// KOSPI 지수 코드.
pub const INDEX_KOSPI: &str = "KS11";
/// KOSDAQ 지수 코드.
pub const INDEX_KOSDAQ: &str = "KQ11";

/// 시장 데이터 소스 추상화.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 일봉 시계열 조회 (날짜 오름차순).
    ///
    /// `code`는 6자리 종목코드 또는 지수 코드(`KS11`, `KQ11`)입니다.
    async fn fetch_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderBar>>;

    /// 전체 종목 목록 조회 (KOSPI + KOSDAQ).
    async fn fetch_listing(&self) -> Result<Vec<StockListing>>;
}
