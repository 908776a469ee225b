//! 매수 신호 스크리닝 모듈.
//!
//! 기준일의 지표 스냅샷에서 1차 후보(RSI 과매도 + MACD 골든크로스)를
//! 뽑고, 거래량 비율을 반영해 점수화한 뒤 임계값 이상 상위 종목을
//! 신호로 reconcile합니다.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::CollectorError;
use crate::{CollectionStats, CollectorConfig, Result};
use screener_analytics::{ScoreInput, SignalScorer};
use screener_core::{BuySignal, SIGNAL_RSI_OVERSOLD_MACD_GOLDEN};
use screener_data::{IndicatorStore, PriceStore, ScreeningCandidate, SignalStore};

/// 신호로 채택되는 최소 강도.
pub const MIN_SIGNAL_STRENGTH: i32 = 50;

/// 하루에 유지하는 최대 신호 수.
pub const MAX_SIGNALS: usize = 15;

/// 거래량 비율 계산에 쓰는 과거 거래일 수.
const VOLUME_WINDOW: i64 = 20;

/// 매수 신호 스크리닝 실행
pub async fn run_screening(
    pool: &PgPool,
    _config: &CollectorConfig,
    date: Option<NaiveDate>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let price_store = PriceStore::new(pool.clone());
    let indicator_store = IndicatorStore::new(pool.clone());
    let signal_store = SignalStore::new(pool.clone());

    // 기준일: 지정되지 않으면 가장 최근 거래일
    let target_date = match date {
        Some(d) => d,
        None => price_store
            .latest_trade_date()
            .await?
            .ok_or_else(|| CollectorError::DataSource("일봉 데이터가 없습니다".to_string()))?,
    };

    tracing::info!(target_date = %target_date, "스크리닝 시작");

    let candidates = indicator_store.screening_candidates(target_date).await?;
    tracing::info!(count = candidates.len(), "1차 후보 조회 완료");

    let scorer = SignalScorer::new();
    let mut signals = Vec::new();

    for candidate in &candidates {
        stats.total += 1;

        // 거래량 비율: 기준일 이전 최대 20거래일 평균 대비
        let trailing = match price_store
            .recent_volumes(&candidate.symbol, target_date, VOLUME_WINDOW)
            .await
        {
            Ok(volumes) => volumes,
            Err(e) => {
                stats.errors += 1;
                tracing::warn!(
                    symbol = candidate.symbol.as_str(),
                    error = %e,
                    "거래량 조회 실패, 종목 건너뜀"
                );
                continue;
            }
        };

        let ratio = volume_ratio(candidate.volume, &trailing);
        let strength = scorer.score(
            ScoreInput::new(candidate.rsi, candidate.macd, candidate.macd_signal)
                .with_volume_ratio(ratio),
        );

        if strength >= MIN_SIGNAL_STRENGTH {
            signals.push(build_signal(candidate, target_date, strength));
            stats.success += 1;
        } else {
            stats.skipped += 1;
            tracing::debug!(
                symbol = candidate.symbol.as_str(),
                strength = strength,
                "임계값 미달"
            );
        }
    }

    let ranked = rank_signals(signals);

    // 후보가 0건이어도 reconcile은 수행 (과거 신호 비활성 전환)
    let outcome = signal_store.reconcile(target_date, &ranked).await?;
    stats.total_records = outcome.upserted;

    stats.elapsed = start.elapsed();
    tracing::info!(
        target_date = %target_date,
        signals = ranked.len(),
        deactivated = outcome.deactivated,
        "스크리닝 완료"
    );
    Ok(stats)
}

/// 거래량 비율 계산.
///
/// 과거 거래량이 없거나 평균이 0이면 중립값 1을 반환합니다.
fn volume_ratio(day_volume: i64, trailing: &[i64]) -> Decimal {
    if trailing.is_empty() {
        return Decimal::ONE;
    }

    let sum: i64 = trailing.iter().sum();
    if sum <= 0 {
        return Decimal::ONE;
    }

    let mean = Decimal::from(sum) / Decimal::from(trailing.len() as i64);
    Decimal::from(day_volume) / mean
}

/// 후보 → 신호 레코드 변환.
fn build_signal(
    candidate: &ScreeningCandidate,
    target_date: NaiveDate,
    strength: i32,
) -> BuySignal {
    BuySignal {
        symbol: candidate.symbol.clone(),
        trade_date: target_date,
        signal_type: SIGNAL_RSI_OVERSOLD_MACD_GOLDEN.to_string(),
        strength,
        reason: Some(BuySignal::oversold_golden_cross_reason(candidate.rsi)),
        rsi: candidate.rsi,
        macd: candidate.macd,
        macd_signal: candidate.macd_signal,
        price: candidate.price,
        is_active: true,
    }
}

/// 신호 정렬 및 상한 적용 (강도 내림차순, 종목코드 오름차순).
fn rank_signals(mut signals: Vec<BuySignal>) -> Vec<BuySignal> {
    signals.sort_by(|a, b| {
        b.strength
            .cmp(&a.strength)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    signals.truncate(MAX_SIGNALS);
    signals
}
