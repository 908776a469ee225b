//! 매수 신호 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// RSI 과매도 + MACD 골든크로스 스크리닝 규칙의 신호 타입 태그.
pub const SIGNAL_RSI_OVERSOLD_MACD_GOLDEN: &str = "rsi_oversold_macd_golden";

/// 매수 신호 레코드.
///
/// (symbol, trade_date, signal_type)으로 유일하게 식별됩니다.
/// 과거 신호는 삭제하지 않으며, 종목이 조건을 벗어나면 `is_active`만
/// false로 전환하여 이력을 보존합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct BuySignal {
    /// 종목 코드
    pub symbol: String,
    /// 신호 발생일
    pub trade_date: NaiveDate,
    /// 신호 타입 (스크리닝 규칙 태그)
    pub signal_type: String,
    /// 신호 강도 (0-100)
    pub strength: i32,
    /// 신호 발생 이유
    pub reason: Option<String>,
    /// 신호 발생 시점 RSI
    pub rsi: Decimal,
    /// 신호 발생 시점 MACD
    pub macd: Decimal,
    /// 신호 발생 시점 MACD 시그널
    pub macd_signal: Decimal,
    /// 신호 발생 시점 가격
    pub price: Decimal,
    /// 활성 여부
    pub is_active: bool,
}

impl BuySignal {
    /// 기본 스크리닝 규칙의 신호 발생 이유 문자열을 생성합니다.
    pub fn oversold_golden_cross_reason(rsi: Decimal) -> String {
        format!("RSI 과매도({:.1}) + MACD 골든크로스", rsi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reason_format() {
        let reason = BuySignal::oversold_golden_cross_reason(dec!(28.54));
        assert_eq!(reason, "RSI 과매도(28.5) + MACD 골든크로스");
    }
}
