//! 주식 일별 OHLCV 수집 모듈 (AlphaVantage).

use crate::{CollectionStats, CollectorConfig, Result};
use chrono::Utc;
use findata_data::{
    AlphaVantageClient, CompanyRepository, CsvExporter, Database, DataError, OhlcvRepository,
};
use sqlx::PgPool;
use std::time::Instant;

/// OHLCV 저장 시 source 컬럼 값
const SOURCE: &str = "alphavantage";

/// 최근 데이터가 이 일수 이내면 compact 조회로 충분
const COMPACT_WINDOW_DAYS: i64 = 100;

/// 주식 일별 OHLCV 수집
pub async fn collect_ohlcv(
    pool: &PgPool,
    config: &CollectorConfig,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("주식 OHLCV 수집 시작");

    let api_key = config.alphavantage.api_key.as_deref().ok_or_else(|| {
        crate::error::CollectorError::Config(
            "ALPHAVANTAGE_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
        )
    })?;

    let target_symbols =
        super::resolve_target_symbols(pool, symbols, &config.stock_symbols).await?;

    if target_symbols.is_empty() {
        tracing::warn!("수집할 심볼이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = AlphaVantageClient::new(api_key);
    let db = Database::from_pool(pool.clone());
    let ohlcv_repo = OhlcvRepository::new(db.clone());
    let company_repo = CompanyRepository::new(db);
    let exporter = CsvExporter::new(&config.csv.base_dir);

    for (idx, symbol) in target_symbols.iter().enumerate() {
        stats.total += 1;

        tracing::debug!(
            symbol = symbol.as_str(),
            progress = format!("{}/{}", idx + 1, target_symbols.len()),
            "수집 시작"
        );

        // 최근 데이터가 있으면 compact 조회로 전환 (증분 수집)
        let outputsize = match ohlcv_repo.get_last_date(SOURCE, symbol).await? {
            Some(last_date)
                if (Utc::now().date_naive() - last_date).num_days() <= COMPACT_WINDOW_DAYS =>
            {
                "compact"
            }
            _ => config.alphavantage.outputsize.as_str(),
        };

        match client.fetch_daily_ohlcv(symbol, outputsize).await {
            Ok(bars) if !bars.is_empty() => {
                let upserted = ohlcv_repo.upsert_batch(SOURCE, &bars).await?;
                stats.success += 1;
                stats.total_rows += upserted;

                if config.csv.enabled {
                    let company = company_repo.get(symbol).await?;
                    let (exchange, industry) = company
                        .map(|c| (c.exchange, c.industry))
                        .unwrap_or((None, None));
                    if let Err(e) = exporter.export_stock_bars(
                        exchange.as_deref(),
                        industry.as_deref(),
                        symbol,
                        &bars,
                    ) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "CSV 내보내기 실패");
                    }
                }

                tracing::info!(
                    symbol = symbol.as_str(),
                    bars = bars.len(),
                    "수집 및 저장 완료"
                );
            }
            Ok(_) => {
                stats.empty += 1;
                tracing::debug!(symbol = symbol.as_str(), "데이터 없음");
            }
            Err(DataError::RateLimited(msg)) => {
                stats.errors += 1;
                tracing::warn!(symbol = symbol.as_str(), msg = %msg, "요청 한도 초과, 딜레이 후 계속");
                // 한도 초과 시 한 주기 더 대기
                tokio::time::sleep(config.alphavantage.request_delay()).await;
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "조회 실패");
            }
        }

        // Rate limiting
        tokio::time::sleep(config.alphavantage.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
