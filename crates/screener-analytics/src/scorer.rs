//! 매수 신호 강도 점수화.
//!
//! 과매도 RSI, MACD 골든크로스, 거래량 급증을 합산해 0-100 범위의
//! 신호 강도를 산출합니다. 점수 체계:
//!
//! | 구성 요소          | 최대 점수 |
//! |-------------------|----------|
//! | RSI 과매도 깊이    | 40       |
//! | MACD 크로스 강도   | 30       |
//! | 거래량 비율        | 20       |
//! | 복합 보너스        | 10       |

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 점수 계산 입력.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput {
    /// RSI(14) 값
    pub rsi: Decimal,
    /// MACD 라인
    pub macd: Decimal,
    /// MACD 시그널 라인
    pub macd_signal: Decimal,
    /// 당일 거래량 / 최근 20일 평균 거래량
    pub volume_ratio: Decimal,
}

impl ScoreInput {
    /// 거래량 비율을 중립값(1.0)으로 두고 입력을 생성합니다.
    pub fn new(rsi: Decimal, macd: Decimal, macd_signal: Decimal) -> Self {
        Self {
            rsi,
            macd,
            macd_signal,
            volume_ratio: Decimal::ONE,
        }
    }

    /// 거래량 비율 설정.
    pub fn with_volume_ratio(mut self, ratio: Decimal) -> Self {
        self.volume_ratio = ratio;
        self
    }
}

/// 신호 강도 점수 계산기.
#[derive(Debug, Default)]
pub struct SignalScorer;

impl SignalScorer {
    /// 새로운 점수 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 신호 강도 계산 (0-100).
    ///
    /// RSI가 낮을수록, MACD 크로스가 강할수록, 거래량이 평균 대비
    /// 많을수록 점수가 높아집니다. RSI 25 이하 + 골든크로스 동시
    /// 충족 시 보너스 10점이 추가되고, 합계는 100점으로 캡됩니다.
    pub fn score(&self, input: ScoreInput) -> i32 {
        let mut strength = 0;

        // RSI 과매도 깊이 (최대 40점)
        if input.rsi <= dec!(20) {
            strength += 40;
        } else if input.rsi <= dec!(25) {
            strength += 35;
        } else if input.rsi <= dec!(30) {
            strength += 30;
        } else if input.rsi <= dec!(35) {
            strength += 20;
        }

        // MACD 크로스 강도 (최대 30점)
        let golden_cross = input.macd > input.macd_signal;
        if golden_cross {
            if input.macd_signal <= Decimal::ZERO {
                // 시그널이 0 이하면 비율 판정이 뒤집히므로 기본 등급
                strength += 20;
            } else {
                let diff = input.macd - input.macd_signal;
                if diff > input.macd_signal * dec!(0.1) {
                    strength += 30;
                } else if diff > input.macd_signal * dec!(0.05) {
                    strength += 25;
                } else {
                    strength += 20;
                }
            }
        }

        // 거래량 비율 (최대 20점)
        if input.volume_ratio >= dec!(2.0) {
            strength += 20;
        } else if input.volume_ratio >= dec!(1.5) {
            strength += 15;
        } else if input.volume_ratio >= dec!(1.2) {
            strength += 10;
        } else if input.volume_ratio >= dec!(1.0) {
            strength += 5;
        }

        // 복합 보너스: 깊은 과매도 + 골든크로스
        if input.rsi <= dec!(25) && golden_cross {
            strength += 10;
        }

        strength.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_score_moderate_signal() {
        let scorer = SignalScorer::new();

        // RSI 30점 + MACD 강한 크로스 30점 + 거래량 중립 5점
        let input = ScoreInput::new(dec!(28), dec!(150), dec!(100));
        assert_eq!(scorer.score(input), 65);
    }

    #[test]
    fn test_score_strong_signal_with_bonus() {
        let scorer = SignalScorer::new();

        // RSI 35점 + MACD 30점 + 거래량 20점 + 보너스 10점
        let input =
            ScoreInput::new(dec!(22), dec!(120), dec!(100)).with_volume_ratio(dec!(2.5));
        assert_eq!(scorer.score(input), 95);
    }

    #[test]
    fn test_score_rsi_tiers() {
        let scorer = SignalScorer::new();

        // MACD 크로스 없음, 거래량 1.0 미만 → RSI 점수만
        let base = |rsi| ScoreInput {
            rsi,
            macd: dec!(-10),
            macd_signal: dec!(10),
            volume_ratio: dec!(0.5),
        };

        assert_eq!(scorer.score(base(dec!(20))), 40);
        assert_eq!(scorer.score(base(dec!(25))), 35);
        assert_eq!(scorer.score(base(dec!(30))), 30);
        assert_eq!(scorer.score(base(dec!(35))), 20);
        assert_eq!(scorer.score(base(dec!(36))), 0);
    }

    #[test]
    fn test_score_macd_tiers() {
        let scorer = SignalScorer::new();

        // RSI 50 (0점), 거래량 0.5 (0점) → MACD 점수만
        let base = |macd, signal| ScoreInput {
            rsi: dec!(50),
            macd,
            macd_signal: signal,
            volume_ratio: dec!(0.5),
        };

        // diff > 10% → 30점
        assert_eq!(scorer.score(base(dec!(111), dec!(100))), 30);
        // 5% < diff <= 10% → 25점
        assert_eq!(scorer.score(base(dec!(107), dec!(100))), 25);
        // diff <= 5% → 20점
        assert_eq!(scorer.score(base(dec!(103), dec!(100))), 20);
        // 크로스 없음 → 0점
        assert_eq!(scorer.score(base(dec!(100), dec!(100))), 0);
    }

    #[test]
    fn test_score_negative_signal_line_gets_base_tier() {
        let scorer = SignalScorer::new();

        // 시그널 0 이하에서 비율 판정이 뒤집히면 안 됨
        let input = ScoreInput {
            rsi: dec!(50),
            macd: dec!(-50),
            macd_signal: dec!(-100),
            volume_ratio: dec!(0.5),
        };
        assert_eq!(scorer.score(input), 20);

        let input = ScoreInput {
            rsi: dec!(50),
            macd: dec!(10),
            macd_signal: Decimal::ZERO,
            volume_ratio: dec!(0.5),
        };
        assert_eq!(scorer.score(input), 20);
    }

    #[test]
    fn test_score_volume_tiers() {
        let scorer = SignalScorer::new();

        let base = |ratio| ScoreInput {
            rsi: dec!(50),
            macd: dec!(-10),
            macd_signal: dec!(10),
            volume_ratio: ratio,
        };

        assert_eq!(scorer.score(base(dec!(2.0))), 20);
        assert_eq!(scorer.score(base(dec!(1.5))), 15);
        assert_eq!(scorer.score(base(dec!(1.2))), 10);
        assert_eq!(scorer.score(base(dec!(1.0))), 5);
        assert_eq!(scorer.score(base(dec!(0.9))), 0);
    }

    #[test]
    fn test_score_capped_at_100() {
        let scorer = SignalScorer::new();

        // 40 + 30 + 20 + 10 = 100 (캡 경계)
        let input =
            ScoreInput::new(dec!(15), dec!(200), dec!(100)).with_volume_ratio(dec!(3.0));
        assert_eq!(scorer.score(input), 100);
    }

    proptest! {
        #[test]
        fn prop_score_within_bounds(
            rsi in 0i64..=100,
            macd in -1000i64..=1000,
            signal in -1000i64..=1000,
            ratio in 0i64..=50,
        ) {
            let scorer = SignalScorer::new();
            let input = ScoreInput {
                rsi: Decimal::from(rsi),
                macd: Decimal::from(macd),
                macd_signal: Decimal::from(signal),
                volume_ratio: Decimal::from(ratio) / dec!(10),
            };

            let strength = scorer.score(input);
            prop_assert!((0..=100).contains(&strength));

            // 같은 입력은 항상 같은 점수
            prop_assert_eq!(strength, scorer.score(input));
        }
    }
}
