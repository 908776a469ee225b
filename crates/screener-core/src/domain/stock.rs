//! 종목 마스터 타입.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시장 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Market {
    /// 유가증권시장 (코스피)
    #[default]
    Kospi,
    /// 코스닥
    Kosdaq,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kospi => write!(f, "KOSPI"),
            Self::Kosdaq => write!(f, "KOSDAQ"),
        }
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_uppercase();
        if s.contains("KOSPI") || s.contains("유가증권") || s == "STK" {
            Ok(Self::Kospi)
        } else if s.contains("KOSDAQ") || s.contains("코스닥") || s == "KSQ" {
            Ok(Self::Kosdaq)
        } else {
            Err(format!("알 수 없는 시장 구분: {}", s))
        }
    }
}

/// 종목 마스터 레코드.
///
/// 현재가 필드(price/change/change_percent/volume)는 최신 일봉에서
/// 복제된 캐시이며 Data Updater만 갱신합니다. 시가총액 상위 유니버스에서
/// 빠진 종목은 삭제하지 않고 `is_active = false`로 전환합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInfo {
    /// 종목 코드 (6자리)
    pub symbol: String,
    /// 종목명
    pub name: String,
    /// 시장 구분
    pub market: Market,
    /// 섹터
    pub sector: Option<String>,
    /// 업종
    pub industry: Option<String>,
    /// 시가총액 (원)
    pub market_cap: Option<i64>,
    /// 활성 여부 (스크리닝/목록 포함 여부)
    pub is_active: bool,
    /// 현재가 (최신 일봉 종가)
    pub price: Option<Decimal>,
    /// 전일 대비 변화량
    pub change: Option<Decimal>,
    /// 전일 대비 변화율 (%)
    pub change_percent: Option<Decimal>,
    /// 최신 거래량
    pub volume: Option<i64>,
}
