//! 모멘텀 지표 (Momentum Indicators).
//!
//! 과매수/과매도 상태를 측정하는 RSI를 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 평균은 최근 period개 일간 변화량의 단순 이동평균입니다
    /// (Wilder 지수 가중 방식이 아님). 평균 하락폭이 0이면 RSI를
    /// 정의하지 않고 None을 반환합니다 (0으로 나누기 회피, 100 조작 금지).
    ///
    /// # 반환
    /// 각 시점의 RSI 값. 변화량 window가 다 차기 전(처음 period개)은 None.
    pub fn rsi(
        &self,
        prices: &[Decimal],
        params: RsiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        // 일간 변화량 (인덱스 1부터 정의)
        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        gains.push(Decimal::ZERO);
        losses.push(Decimal::ZERO);
        for i in 1..prices.len() {
            let delta = prices[i] - prices[i - 1];
            if delta > Decimal::ZERO {
                gains.push(delta);
                losses.push(Decimal::ZERO);
            } else {
                gains.push(Decimal::ZERO);
                losses.push(delta.abs());
            }
        }

        let period_decimal = Decimal::from(period);
        let mut result = Vec::with_capacity(prices.len());

        for i in 0..prices.len() {
            // 변화량은 인덱스 1부터 존재하므로 window는 i >= period에서 완성됨
            if i < period {
                result.push(None);
                continue;
            }

            let start = i + 1 - period;
            let avg_gain: Decimal = gains[start..=i].iter().sum::<Decimal>() / period_decimal;
            let avg_loss: Decimal = losses[start..=i].iter().sum::<Decimal>() / period_decimal;

            if avg_loss == Decimal::ZERO {
                result.push(None);
            } else {
                let rs = avg_gain / avg_loss;
                let rsi = dec!(100) - (dec!(100) / (Decimal::ONE + rs));
                result.push(Some(rsi));
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alternating_prices(len: usize) -> Vec<Decimal> {
        // 상승과 하락이 섞인 시계열
        (0..len)
            .map(|i| {
                let base = Decimal::from(100 + (i / 2) as i64);
                if i % 2 == 0 {
                    base
                } else {
                    base + dec!(3)
                }
            })
            .collect()
    }

    #[test]
    fn test_rsi_warmup_nulls() {
        let momentum = MomentumCalculator::new();
        let prices = alternating_prices(30);

        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();

        assert_eq!(rsi.len(), prices.len());

        // 14개의 과거 변화량이 쌓이기 전까지는 None
        for value in rsi.iter().take(14) {
            assert!(value.is_none());
        }
        assert!(rsi[14].is_some());
    }

    #[test]
    fn test_rsi_bounds() {
        let momentum = MomentumCalculator::new();
        let prices = alternating_prices(60);

        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();

        for value in rsi.iter().flatten() {
            assert!(*value >= Decimal::ZERO);
            assert!(*value <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_no_losses_is_undefined() {
        let momentum = MomentumCalculator::new();

        // 계속 상승하는 시장: 평균 하락폭 0 → RSI 정의 안 됨 (100 조작 금지)
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 + i)).collect();

        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert!(rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let momentum = MomentumCalculator::new();

        // 계속 하락하는 시장: 평균 상승폭 0 → RSI = 0
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(200 - i)).collect();

        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi[14], Some(Decimal::ZERO));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let momentum = MomentumCalculator::new();
        let prices = alternating_prices(10);

        let result = momentum.rsi(&prices, RsiParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 15, .. })
        ));
    }
}
