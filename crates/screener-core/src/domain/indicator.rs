//! 기술적 지표 스냅샷 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루치 기술적 지표 스냅샷.
///
/// (symbol, trade_date)로 유일하게 식별됩니다. 모든 지표는 해당 날짜까지의
/// 과거 주가만으로 계산되며, 워밍업 기간이 부족한 지표는 None입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct IndicatorSnapshot {
    /// 종목 코드
    pub symbol: String,
    /// 거래일
    pub trade_date: NaiveDate,
    /// RSI(14) - 14개 이상의 과거 구간이 있어야 정의됨
    pub rsi: Option<Decimal>,
    /// MACD 라인 (EMA12 - EMA26)
    pub macd: Option<Decimal>,
    /// MACD 시그널 라인 (MACD의 EMA9)
    pub macd_signal: Option<Decimal>,
    /// MACD 히스토그램 (MACD - 시그널)
    pub macd_histogram: Option<Decimal>,
    /// 20일 단순 이동평균
    pub sma_20: Option<Decimal>,
    /// 60일 단순 이동평균
    pub sma_60: Option<Decimal>,
}

impl IndicatorSnapshot {
    /// 모든 지표가 비어 있는 스냅샷을 생성합니다.
    pub fn empty(symbol: impl Into<String>, trade_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            trade_date,
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            sma_20: None,
            sma_60: None,
        }
    }

    /// MACD 골든크로스(MACD > 시그널) 상태인지 확인합니다.
    ///
    /// 둘 중 하나라도 정의되지 않았으면 false입니다.
    pub fn has_golden_cross(&self) -> bool {
        match (self.macd, self.macd_signal) {
            (Some(macd), Some(signal)) => macd > signal,
            _ => false,
        }
    }

    /// RSI 과매도(RSI <= 30) 상태인지 확인합니다.
    pub fn is_oversold(&self) -> bool {
        self.rsi.is_some_and(|rsi| rsi <= Decimal::from(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_golden_cross() {
        let mut snapshot =
            IndicatorSnapshot::empty("005930", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(!snapshot.has_golden_cross());

        snapshot.macd = Some(dec!(150));
        snapshot.macd_signal = Some(dec!(100));
        assert!(snapshot.has_golden_cross());

        snapshot.macd_signal = Some(dec!(200));
        assert!(!snapshot.has_golden_cross());
    }

    #[test]
    fn test_oversold() {
        let mut snapshot =
            IndicatorSnapshot::empty("005930", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(!snapshot.is_oversold());

        snapshot.rsi = Some(dec!(28.5));
        assert!(snapshot.is_oversold());

        snapshot.rsi = Some(dec!(45.0));
        assert!(!snapshot.is_oversold());
    }
}
