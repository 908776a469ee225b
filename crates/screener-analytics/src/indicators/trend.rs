//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간 (span).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 특정 시점의 MACD 값.
///
/// 성장 구간 EMA를 사용하므로 첫 캔들부터 모든 값이 정의됩니다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdPoint {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Decimal,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Decimal,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Decimal,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let mut result = Vec::with_capacity(prices.len());
        let period_decimal = Decimal::from(period);

        for i in 0..prices.len() {
            if i < period - 1 {
                result.push(None);
            } else {
                let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
                result.push(Some(sum / period_decimal));
            }
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1)
    ///
    /// 첫 값으로 시드하는 성장 구간 방식이므로 워밍업 없이
    /// 모든 시점에서 값이 정의됩니다.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Decimal>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.is_empty() {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let multiplier = dec!(2) / Decimal::from(period + 1);
        let mut result = Vec::with_capacity(prices.len());

        let mut prev_ema = prices[0];
        result.push(prev_ema);

        for price in prices.iter().skip(1) {
            let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
            result.push(ema);
            prev_ema = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdPoint>> {
        let fast_ema = self.ema(
            prices,
            EmaParams {
                period: params.fast_period,
            },
        )?;
        let slow_ema = self.ema(
            prices,
            EmaParams {
                period: params.slow_period,
            },
        )?;

        let macd_line: Vec<Decimal> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(fast, slow)| fast - slow)
            .collect();

        let signal_line = self.ema(
            &macd_line,
            EmaParams {
                period: params.signal_period,
            },
        )?;

        let result = macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(macd, signal)| MacdPoint {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(109.0),
        ]
    }

    #[test]
    fn test_sma_basic() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();

        let sma = trend.sma(&prices, SmaParams { period: 3 }).unwrap();

        // 처음 2개는 None
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());

        // 3번째 값: (100 + 102 + 101) / 3 = 101
        assert_eq!(sma[2], Some(dec!(101)));
    }

    #[test]
    fn test_sma_exact_window_length() {
        let trend = TrendIndicators::new();
        let prices: Vec<Decimal> = (1..=60).map(Decimal::from).collect();

        let sma = trend.sma(&prices, SmaParams { period: 60 }).unwrap();

        // 마지막 값에서만 정의되고, 정확한 산술평균
        assert!(sma[58].is_none());
        assert_eq!(sma[59], Some(dec!(30.5)));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();

        let result = trend.sma(&prices, SmaParams { period: 20 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 20, .. })
        ));
    }

    #[test]
    fn test_ema_seeded_from_first_value() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();

        let ema = trend.ema(&prices, EmaParams { period: 3 }).unwrap();

        // 첫 값으로 시드, 워밍업 없음
        assert_eq!(ema.len(), prices.len());
        assert_eq!(ema[0], dec!(100.0));

        // k = 2/4 = 0.5 → ema[1] = 102*0.5 + 100*0.5 = 101
        assert_eq!(ema[1], dec!(101.0));
    }

    #[test]
    fn test_macd_defined_from_first_bar() {
        let trend = TrendIndicators::new();
        let prices: Vec<Decimal> = (0..50).map(|i| Decimal::from(100 + i)).collect();

        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(macd.len(), prices.len());

        // 첫 캔들: 단기 EMA == 장기 EMA == 종가 → MACD 0
        assert_eq!(macd[0].macd, Decimal::ZERO);
        assert_eq!(macd[0].histogram, macd[0].macd - macd[0].signal);

        // 지속 상승 구간에서는 단기 EMA가 장기보다 높음
        assert!(macd[40].macd > Decimal::ZERO);
    }

    #[test]
    fn test_macd_empty_input() {
        let trend = TrendIndicators::new();
        let result = trend.macd(&[], MacdParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { .. })
        ));
    }
}
