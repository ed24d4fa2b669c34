//! FMP 분기 재무 요약 동기화 모듈.

use crate::{CollectionStats, CollectorConfig, Result};
use findata_data::{CsvExporter, Database, FinancialsRepository, FmpClient};
use sqlx::PgPool;
use std::time::Instant;

/// FMP 분기 재무 요약 동기화
pub async fn sync_fmp(
    pool: &PgPool,
    config: &CollectorConfig,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("FMP 재무 동기화 시작");

    let api_key = config.fmp.api_key.as_deref().ok_or_else(|| {
        crate::error::CollectorError::Config(
            "FMP_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
        )
    })?;

    let target_symbols =
        super::resolve_target_symbols(pool, symbols, &config.stock_symbols).await?;

    if target_symbols.is_empty() {
        tracing::warn!("동기화할 심볼이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = FmpClient::new(api_key);
    let repo = FinancialsRepository::new(Database::from_pool(pool.clone()));
    let exporter = CsvExporter::new(&config.csv.base_dir);

    for (idx, symbol) in target_symbols.iter().enumerate() {
        stats.total += 1;

        tracing::debug!(
            symbol = symbol.as_str(),
            progress = format!("{}/{}", idx + 1, target_symbols.len()),
            "동기화 시작"
        );

        match client
            .fetch_quarterly_financials(symbol, config.fmp.quarter_limit)
            .await
        {
            Ok(summaries) if !summaries.is_empty() => {
                let upserted = repo.upsert_summaries(&summaries).await?;
                stats.success += 1;
                stats.total_rows += upserted;

                if config.csv.enabled {
                    if let Err(e) = exporter.export_financial_summaries(symbol, &summaries) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "CSV 내보내기 실패");
                    }
                }

                tracing::info!(
                    symbol = symbol.as_str(),
                    rows = summaries.len(),
                    "FMP 재무 저장 완료"
                );
            }
            Ok(_) => {
                stats.empty += 1;
                tracing::debug!(symbol = symbol.as_str(), "데이터 없음");
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "조회 실패");
            }
        }

        tokio::time::sleep(config.fmp.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
