//! Standalone data collector CLI.

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use findata_collector::{modules, CollectorConfig};

#[derive(Parser)]
#[command(name = "findata-collector")]
#[command(about = "FinData Standalone Data Collector", long_about = None)]
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
    /// 주식 일별 OHLCV 수집 (AlphaVantage)
    CollectOhlcv {
        /// 특정 심볼만 수집 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 암호화폐 일봉 수집 (Binance)
    CollectCrypto {
        /// 특정 거래쌍만 수집 (쉼표로 구분, 예: "BTC/USDT,ETH/USDT")
        #[arg(long)]
        pairs: Option<String>,
    },

    /// 기업 개요 + 재무제표 동기화 (AlphaVantage)
    SyncFinancials {
        /// 특정 심볼만 동기화 (쉼표로 구분)
        #[arg(long)]
        symbols: Option<String>,
    },

    /// FMP 분기 재무 요약 동기화
    SyncFmp {
        /// 특정 심볼만 동기화 (쉼표로 구분)
        #[arg(long)]
        symbols: Option<String>,
    },

    /// FRED 경제지표 동기화
    SyncFred,

    /// World Bank 지표 동기화
    SyncWorldbank {
        /// 체크포인트에서 재개
        #[arg(long)]
        resume: bool,
    },

    /// 뉴스 수집 (AlphaVantage NEWS_SENTIMENT + NewsAPI)
    CollectNews {
        /// 특정 티커만 수집 (쉼표로 구분)
        #[arg(long)]
        tickers: Option<String>,
    },

    /// LLM 뉴스 감성 분석 (Gemini)
    AnalyzeSentiment {
        /// 특정 티커만 분석 (쉼표로 구분)
        #[arg(long)]
        tickers: Option<String>,
    },

    /// 전체 워크플로우 실행 (OHLCV → 재무 → 거시지표 → 뉴스)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("findata_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("FinData Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(database_url = %config.database_url, "설정 로드 완료");

    // DB 연결
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 명령 실행
    match cli.command {
        Commands::CollectOhlcv { symbols } => {
            let stats = modules::collect_ohlcv(&pool, &config, symbols).await?;
            stats.log_summary("주식 OHLCV 수집");
        }
        Commands::CollectCrypto { pairs } => {
            let stats = modules::collect_crypto(&pool, &config, pairs).await?;
            stats.log_summary("암호화폐 수집");
        }
        Commands::SyncFinancials { symbols } => {
            let stats = modules::sync_financials(&pool, &config, symbols).await?;
            stats.log_summary("재무제표 동기화");
        }
        Commands::SyncFmp { symbols } => {
            let stats = modules::sync_fmp(&pool, &config, symbols).await?;
            stats.log_summary("FMP 동기화");
        }
        Commands::SyncFred => {
            let stats = modules::sync_fred(&pool, &config).await?;
            stats.log_summary("FRED 동기화");
        }
        Commands::SyncWorldbank { resume } => {
            let stats = modules::sync_worldbank(&pool, &config, resume).await?;
            stats.log_summary("World Bank 동기화");
        }
        Commands::CollectNews { tickers } => {
            let stats = modules::collect_news(&pool, &config, tickers).await?;
            stats.log_summary("뉴스 수집");
        }
        Commands::AnalyzeSentiment { tickers } => {
            let stats = modules::analyze_sentiment(&pool, &config, tickers).await?;
            stats.log_summary("감성 분석");
        }
        Commands::RunAll => {
            tracing::info!("=== 전체 워크플로우 시작 ===");
            run_all_steps(&pool, &config).await;
            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
        Commands::Daemon => {
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
                        tracing::info!("=== 워크플로우 실행 시작 ===");
                        run_all_steps(&pool, &config).await;
                        tracing::info!(
                            "=== 워크플로우 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("FinData Collector 종료");

    Ok(())
}

/// 전체 워크플로우 단계를 순차 실행.
///
/// 한 단계의 실패가 다른 단계를 막지 않도록 단계별로 에러를 로그만
/// 남기고 계속 진행합니다.
async fn run_all_steps(pool: &PgPool, config: &CollectorConfig) {
    tracing::info!("Step 1/7: 주식 OHLCV 수집");
    match modules::collect_ohlcv(pool, config, None).await {
        Ok(stats) => stats.log_summary("주식 OHLCV 수집"),
        Err(e) => tracing::error!("주식 OHLCV 수집 실패: {}", e),
    }

    tracing::info!("Step 2/7: 재무제표 동기화");
    match modules::sync_financials(pool, config, None).await {
        Ok(stats) => stats.log_summary("재무제표 동기화"),
        Err(e) => tracing::error!("재무제표 동기화 실패: {}", e),
    }

    tracing::info!("Step 3/7: FMP 동기화");
    match modules::sync_fmp(pool, config, None).await {
        Ok(stats) => stats.log_summary("FMP 동기화"),
        Err(e) => tracing::error!("FMP 동기화 실패: {}", e),
    }

    tracing::info!("Step 4/7: 암호화폐 수집");
    match modules::collect_crypto(pool, config, None).await {
        Ok(stats) => stats.log_summary("암호화폐 수집"),
        Err(e) => tracing::error!("암호화폐 수집 실패: {}", e),
    }

    tracing::info!("Step 5/7: FRED 동기화");
    match modules::sync_fred(pool, config).await {
        Ok(stats) => stats.log_summary("FRED 동기화"),
        Err(e) => tracing::error!("FRED 동기화 실패: {}", e),
    }

    tracing::info!("Step 6/7: World Bank 동기화");
    match modules::sync_worldbank(pool, config, false).await {
        Ok(stats) => stats.log_summary("World Bank 동기화"),
        Err(e) => tracing::error!("World Bank 동기화 실패: {}", e),
    }

    tracing::info!("Step 7/7: 뉴스 수집");
    match modules::collect_news(pool, config, None).await {
        Ok(stats) => stats.log_summary("뉴스 수집"),
        Err(e) => tracing::error!("뉴스 수집 실패: {}", e),
    }
}
