//! 일봉 시계열 → 지표 스냅샷 시계열 변환.
//!
//! 데이터 수집기가 받은 원시 일봉 시계열에 기술적 지표와 전일 대비
//! 변동률을 주석(annotate)으로 붙입니다. 입력은 날짜 오름차순으로
//! 정렬된 한 종목의 시계열이어야 하며, 거래일 공백은 허용됩니다
//! (달력이 아닌 시퀀스 순서 기준으로 계산).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use screener_core::{DailyBar, IndicatorSnapshot};

use crate::indicators::{
    MacdParams, MomentumCalculator, RsiParams, SmaParams, TrendIndicators,
};

/// 지표가 주석된 하루치 데이터.
#[derive(Debug, Clone)]
pub struct AnnotatedDay {
    /// 변동률이 채워진 일봉
    pub bar: DailyBar,
    /// 해당 날짜의 지표 스냅샷
    pub snapshot: IndicatorSnapshot,
}

/// 통합 지표 엔진.
///
/// 워밍업 기간이 부족한 지표는 에러 대신 None으로 처리합니다.
/// 빈 입력은 빈 출력을 반환하며 예외를 발생시키지 않습니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 일봉 시계열에 지표와 변동률을 주석으로 붙입니다.
    ///
    /// 출력은 입력과 같은 길이의 병렬 시계열입니다. RSI(14)는 14개의
    /// 과거 변화량이 쌓인 뒤부터, SMA(N)은 N개 캔들부터 정의되고
    /// MACD는 성장 구간 EMA 방식이라 첫 캔들부터 정의됩니다.
    pub fn annotate(&self, bars: &[DailyBar]) -> Vec<AnnotatedDay> {
        if bars.is_empty() {
            return Vec::new();
        }

        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        let n = closes.len();

        // 워밍업 부족(InsufficientData)은 전체 None 컬럼으로 해소
        let rsi = self
            .momentum
            .rsi(&closes, RsiParams::default())
            .unwrap_or_else(|e| {
                debug!(error = %e, "RSI 계산 불가, None으로 대체");
                vec![None; n]
            });
        let sma_20 = self
            .trend
            .sma(&closes, SmaParams { period: 20 })
            .unwrap_or_else(|e| {
                debug!(error = %e, "SMA20 계산 불가, None으로 대체");
                vec![None; n]
            });
        let sma_60 = self
            .trend
            .sma(&closes, SmaParams { period: 60 })
            .unwrap_or_else(|e| {
                debug!(error = %e, "SMA60 계산 불가, None으로 대체");
                vec![None; n]
            });
        let macd = self.trend.macd(&closes, MacdParams::default()).ok();

        let mut result = Vec::with_capacity(n);

        for (i, bar) in bars.iter().enumerate() {
            let mut bar = bar.clone();

            // 전일 대비 변동 (첫 캔들은 None)
            if i > 0 && closes[i - 1] != Decimal::ZERO {
                bar.change_amount = Some(closes[i] - closes[i - 1]);
                bar.change_percent = Some((closes[i] / closes[i - 1] - Decimal::ONE) * dec!(100));
            } else {
                bar.change_amount = None;
                bar.change_percent = None;
            }

            let point = macd.as_ref().map(|m| m[i]);
            let snapshot = IndicatorSnapshot {
                symbol: bar.symbol.clone(),
                trade_date: bar.trade_date,
                rsi: rsi[i],
                macd: point.map(|p| p.macd),
                macd_signal: point.map(|p| p.signal),
                macd_histogram: point.map(|p| p.histogram),
                sma_20: sma_20[i],
                sma_60: sma_60[i],
            };

            result.push(AnnotatedDay { bar, snapshot });
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_bars(closes: &[Decimal]) -> Vec<DailyBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| DailyBar {
                symbol: "005930".to_string(),
                trade_date: start + chrono::Duration::days(i as i64),
                open: *close,
                high: *close + dec!(100),
                low: *close - dec!(100),
                close: *close,
                volume: 1_000_000 + i as i64,
                change_amount: None,
                change_percent: None,
            })
            .collect()
    }

    fn wavy_closes(len: usize) -> Vec<Decimal> {
        (0..len)
            .map(|i| {
                let base = Decimal::from(70_000 + (i as i64) * 50);
                if i % 3 == 0 {
                    base - dec!(200)
                } else {
                    base
                }
            })
            .collect()
    }

    #[test]
    fn test_annotate_empty_series() {
        let engine = IndicatorEngine::new();
        assert!(engine.annotate(&[]).is_empty());
    }

    #[test]
    fn test_annotate_single_bar_all_null() {
        let engine = IndicatorEngine::new();
        let bars = make_bars(&[dec!(70000)]);

        let annotated = engine.annotate(&bars);
        assert_eq!(annotated.len(), 1);

        let day = &annotated[0];
        assert!(day.bar.change_amount.is_none());
        assert!(day.snapshot.rsi.is_none());
        assert!(day.snapshot.sma_20.is_none());
        // 성장 구간 EMA라 MACD는 첫 캔들부터 정의 (값은 0)
        assert_eq!(day.snapshot.macd, Some(Decimal::ZERO));
    }

    #[test]
    fn test_annotate_parallel_lengths_and_warmup() {
        let engine = IndicatorEngine::new();
        let bars = make_bars(&wavy_closes(80));

        let annotated = engine.annotate(&bars);
        assert_eq!(annotated.len(), 80);

        // RSI: 14개 과거 변화량부터
        assert!(annotated[13].snapshot.rsi.is_none());
        assert!(annotated[14].snapshot.rsi.is_some());

        // SMA60: 60번째 캔들부터
        assert!(annotated[58].snapshot.sma_60.is_none());
        assert!(annotated[59].snapshot.sma_60.is_some());

        // SMA20: 20번째 캔들부터
        assert!(annotated[18].snapshot.sma_20.is_none());
        assert!(annotated[19].snapshot.sma_20.is_some());
    }

    #[test]
    fn test_annotate_daily_change() {
        let engine = IndicatorEngine::new();
        let bars = make_bars(&[dec!(100), dec!(110)]);

        let annotated = engine.annotate(&bars);

        assert!(annotated[0].bar.change_amount.is_none());
        assert_eq!(annotated[1].bar.change_amount, Some(dec!(10)));
        assert_eq!(annotated[1].bar.change_percent, Some(dec!(10)));
    }

    #[test]
    fn test_annotate_sma60_exact_mean() {
        let engine = IndicatorEngine::new();
        let closes: Vec<Decimal> = (1..=60).map(Decimal::from).collect();
        let bars = make_bars(&closes);

        let annotated = engine.annotate(&bars);
        assert_eq!(annotated[59].snapshot.sma_60, Some(dec!(30.5)));
    }
}
