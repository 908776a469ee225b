//! 일별 주가 데이터 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일별 OHLCV 캔들 데이터.
///
/// (symbol, trade_date)로 유일하게 식별되며, 같은 날짜에 대한
/// 재수집 시 기존 행을 덮어씁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct DailyBar {
    /// 종목 코드 (6자리)
    pub symbol: String,
    /// 거래일
    pub trade_date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: i64,
    /// 전일 대비 변화량 (첫 거래일은 None)
    pub change_amount: Option<Decimal>,
    /// 전일 대비 변화율 (%, 첫 거래일은 None)
    pub change_percent: Option<Decimal>,
}

impl DailyBar {
    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(open: Decimal, close: Decimal) -> DailyBar {
        DailyBar {
            symbol: "005930".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1_000_000,
            change_amount: None,
            change_percent: None,
        }
    }

    #[test]
    fn test_bullish() {
        assert!(bar(dec!(70000), dec!(71000)).is_bullish());
        assert!(!bar(dec!(71000), dec!(70000)).is_bullish());
    }
}
