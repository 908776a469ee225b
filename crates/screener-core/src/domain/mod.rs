//! 도메인 레코드 정의.
//!
//! 영속화되는 4개 엔티티(일별 주가, 기술적 지표, 매수 신호, 종목 마스터)와
//! 시장 지수/요약 레코드를 정의합니다. 모든 엔티티는 (symbol, date) 계열의
//! 복합 키로 식별되며 upsert 가능합니다.

pub mod indicator;
pub mod market;
pub mod price;
pub mod signal;
pub mod stock;
