//! 시장 지수 및 일별 시장 요약 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시장 지수 일별 값.
///
/// (code, trade_date)로 유일하게 식별됩니다. 코드는 데이터 소스의
/// 지수 코드를 그대로 사용합니다 (KS11: 코스피, KQ11: 코스닥).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct IndexBar {
    /// 지수 코드
    pub code: String,
    /// 지수명
    pub name: String,
    /// 거래일
    pub trade_date: NaiveDate,
    /// 지수 종가
    pub value: Decimal,
    /// 전일 대비 변화량
    pub change: Option<Decimal>,
    /// 전일 대비 변화율 (%)
    pub change_percent: Option<Decimal>,
    /// 거래량
    pub volume: Option<i64>,
}

/// 일별 시장 요약 통계.
///
/// summary_date로 유일하게 식별되며 하루 한 번 upsert됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSummary {
    /// 요약 기준일
    pub summary_date: NaiveDate,
    /// 코스피 지수
    pub kospi_index: Option<Decimal>,
    /// 코스피 전일 대비 변화율 (%)
    pub kospi_change_pct: Option<Decimal>,
    /// 코스닥 지수
    pub kosdaq_index: Option<Decimal>,
    /// 코스닥 전일 대비 변화율 (%)
    pub kosdaq_change_pct: Option<Decimal>,
    /// 당일 매수 신호 수
    pub total_signals: i32,
    /// 강신호 수 (강도 80 이상)
    pub strong_signals: i32,
    /// 상승 종목 수
    pub rising_stocks: i32,
    /// 하락 종목 수
    pub declining_stocks: i32,
    /// 보합 종목 수
    pub unchanged_stocks: i32,
    /// 신호 상위 섹터 ("반도체:5,자동차:3" 형식, 상위 5개)
    pub top_sectors: Option<String>,
}
