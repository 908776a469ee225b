//! 기술적 지표 계산과 매수 신호 점수화.
//!
//! 이 crate는 스크리닝 파이프라인의 순수 계산 영역을 담당합니다:
//! - `IndicatorEngine`: 일봉 시계열 → 기술적 지표 스냅샷 시계열
//! - `SignalScorer`: 지표 스냅샷 + 거래량 비율 → 신호 강도 (0-100)
//!
//! 두 컴포넌트 모두 데이터베이스나 네트워크에 의존하지 않는 순수 함수입니다.

pub mod indicators;
pub mod scorer;
pub mod snapshot;

pub use indicators::{IndicatorError, IndicatorResult};
pub use scorer::{ScoreInput, SignalScorer};
pub use snapshot::{AnnotatedDay, IndicatorEngine};
