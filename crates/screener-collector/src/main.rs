//! Standalone screening pipeline CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use screener_collector::{modules, CollectorConfig, CollectorError};
use screener_data::KrxClient;

#[derive(Parser)]
#[command(name = "screener-collector")]
#[command(about = "Daily Buy-Signal Screening Pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 유니버스 동기화 (KRX 시가총액 상위)
    SyncSymbols,

    /// 일봉 수집 + 지표 계산
    CollectDaily {
        /// 특정 심볼만 수집 (쉼표로 구분, 예: "005930,000660")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 매수 신호 스크리닝
    RunScreening {
        /// 기준일 (YYYY-MM-DD, 생략 시 가장 최근 거래일)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 시장 지수 수집 (코스피/코스닥)
    CollectIndices,

    /// 일일 시장 요약 생성
    UpdateSummary {
        /// 기준일 (YYYY-MM-DD, 생략 시 가장 최근 거래일)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 전체 파이프라인 실행 (유니버스 → 일봉 → 스크리닝 → 지수 → 요약)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 파이프라인 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("screener_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Screening Pipeline 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(database_url = %config.database_url, "설정 로드 완료");

    // DB 연결
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 명령 실행
    match cli.command {
        Commands::SyncSymbols => {
            let provider = krx_provider()?;
            let stats = modules::sync_symbols(&pool, &config, &provider).await?;
            stats.log_summary("유니버스 동기화");
        }
        Commands::CollectDaily { symbols } => {
            let provider = krx_provider()?;
            let stats = modules::collect_daily(&pool, &config, &provider, symbols).await?;
            stats.log_summary("일봉 수집");
        }
        Commands::RunScreening { date } => {
            let stats = modules::run_screening(&pool, &config, date).await?;
            stats.log_summary("스크리닝");
        }
        Commands::CollectIndices => {
            let provider = krx_provider()?;
            let stats = modules::collect_indices(&pool, &config, &provider).await?;
            stats.log_summary("지수 수집");
        }
        Commands::UpdateSummary { date } => {
            let stats = modules::update_summary(&pool, &config, date).await?;
            stats.log_summary("시장 요약");
        }
        Commands::RunAll => {
            let provider = krx_provider()?;
            run_pipeline(&pool, &config, &provider, true).await?;
        }
        Commands::Daemon => {
            let provider = krx_provider()?;

            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = run_pipeline(&pool, &config, &provider, false).await {
                            tracing::error!(error = %e, "파이프라인 실행 실패");
                        }
                        tracing::info!(
                            "=== 파이프라인 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("Screening Pipeline 종료");

    Ok(())
}

/// KRX Provider 생성 (환경변수 기반).
fn krx_provider() -> Result<KrxClient, CollectorError> {
    KrxClient::from_env().map_err(CollectorError::from)
}

/// 전체 파이프라인 실행.
///
/// `fail_fast`가 true면 첫 실패에서 중단하고 (run-all), false면
/// 단계별 실패를 로깅만 하고 계속 진행합니다 (daemon).
async fn run_pipeline(
    pool: &sqlx::PgPool,
    config: &CollectorConfig,
    provider: &KrxClient,
    fail_fast: bool,
) -> Result<(), CollectorError> {
    tracing::info!("=== 전체 파이프라인 시작 ===");

    tracing::info!("Step 1/5: 유니버스 동기화");
    handle_step(
        "유니버스 동기화",
        modules::sync_symbols(pool, config, provider).await,
        fail_fast,
    )?;

    tracing::info!("Step 2/5: 일봉 수집");
    handle_step(
        "일봉 수집",
        modules::collect_daily(pool, config, provider, None).await,
        fail_fast,
    )?;

    tracing::info!("Step 3/5: 스크리닝");
    handle_step(
        "스크리닝",
        modules::run_screening(pool, config, None).await,
        fail_fast,
    )?;

    tracing::info!("Step 4/5: 지수 수집");
    handle_step(
        "지수 수집",
        modules::collect_indices(pool, config, provider).await,
        fail_fast,
    )?;

    tracing::info!("Step 5/5: 시장 요약");
    handle_step(
        "시장 요약",
        modules::update_summary(pool, config, None).await,
        fail_fast,
    )?;

    tracing::info!("=== 전체 파이프라인 완료 ===");
    Ok(())
}

/// 파이프라인 단계 결과 처리.
fn handle_step(
    label: &str,
    result: Result<screener_collector::CollectionStats, CollectorError>,
    fail_fast: bool,
) -> Result<(), CollectorError> {
    match result {
        Ok(stats) => {
            stats.log_summary(label);
            Ok(())
        }
        Err(e) if fail_fast => Err(e),
        Err(e) => {
            tracing::error!(step = label, error = %e, "단계 실패");
            Ok(())
        }
    }
}
