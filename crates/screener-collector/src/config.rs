//! 환경변수 기반 설정 모듈.

use crate::Result;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 유니버스 설정
    pub universe: UniverseConfig,
    /// 일봉 수집 설정
    pub daily_update: DailyUpdateConfig,
    /// 지수 수집 설정
    pub index_collect: IndexCollectConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 스크리닝 유니버스 설정
#[derive(Debug, Clone)]
pub struct UniverseConfig {
    /// 시가총액 상위 최대 종목 수
    pub max_stocks: i64,
}

/// 일봉 수집 설정
#[derive(Debug, Clone)]
pub struct DailyUpdateConfig {
    /// 조회 구간 (달력 일수)
    pub lookback_days: i64,
    /// 종목당 보존 캔들 수
    pub retention_bars: usize,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 지수 수집 설정
#[derive(Debug, Clone)]
pub struct IndexCollectConfig {
    /// 조회 구간 (달력 일수)
    pub lookback_days: i64,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            crate::error::CollectorError::Config(
                "DATABASE_URL 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        Ok(Self {
            database_url,
            universe: UniverseConfig {
                max_stocks: env_var_parse("UNIVERSE_MAX_STOCKS", 200),
            },
            daily_update: DailyUpdateConfig {
                lookback_days: env_var_parse("DAILY_LOOKBACK_DAYS", 200),
                retention_bars: env_var_parse("DAILY_RETENTION_BARS", 180),
                request_delay_ms: env_var_parse("DAILY_REQUEST_DELAY_MS", 500),
            },
            index_collect: IndexCollectConfig {
                lookback_days: env_var_parse("INDEX_LOOKBACK_DAYS", 30),
                request_delay_ms: env_var_parse("INDEX_REQUEST_DELAY_MS", 500),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1440),
            },
        })
    }
}

impl DailyUpdateConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl IndexCollectConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parse_default() {
        assert_eq!(env_var_parse("NONEXISTENT_KEY_FOR_TEST", 42i64), 42);
    }

    #[test]
    fn test_daemon_interval() {
        let daemon = DaemonConfig {
            interval_minutes: 90,
        };
        assert_eq!(daemon.interval(), Duration::from_secs(5400));
    }
}
