//! 암호화폐 일봉 수집 모듈 (Binance 공개 API).

use crate::config::parse_list;
use crate::{CollectionStats, CollectorConfig, Result};
use chrono::{Duration, Utc};
use findata_data::{BinanceClient, CsvExporter, Database, OhlcvRepository};
use sqlx::PgPool;
use std::time::Instant;

/// OHLCV 저장 시 source 컬럼 값
const SOURCE: &str = "binance";

/// 암호화폐 일봉 수집
pub async fn collect_crypto(
    pool: &PgPool,
    config: &CollectorConfig,
    pairs: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("암호화폐 일봉 수집 시작");

    let target_pairs = match pairs {
        Some(ref s) => parse_list(s),
        None => config.crypto.pairs.clone(),
    };

    if target_pairs.is_empty() {
        tracing::warn!("수집할 거래쌍이 없습니다 (CRYPTO_PAIRS 환경변수 확인)");
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = BinanceClient::new();
    let repo = OhlcvRepository::new(Database::from_pool(pool.clone()));
    let exporter = CsvExporter::new(&config.csv.base_dir);
    let since = Utc::now() - Duration::days(config.crypto.since_days);

    for (idx, pair) in target_pairs.iter().enumerate() {
        stats.total += 1;

        tracing::debug!(
            pair = pair.as_str(),
            progress = format!("{}/{}", idx + 1, target_pairs.len()),
            "수집 시작"
        );

        match client.fetch_daily_klines(pair, since, 1000).await {
            Ok(bars) if !bars.is_empty() => {
                let upserted = repo.upsert_batch(SOURCE, &bars).await?;
                stats.success += 1;
                stats.total_rows += upserted;

                if config.csv.enabled {
                    if let Err(e) = exporter.export_crypto_bars(pair, &bars) {
                        tracing::warn!(pair = pair.as_str(), error = %e, "CSV 내보내기 실패");
                    }
                }

                tracing::info!(pair = pair.as_str(), bars = bars.len(), "수집 및 저장 완료");
            }
            Ok(_) => {
                stats.empty += 1;
                tracing::debug!(pair = pair.as_str(), "데이터 없음");
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(pair = pair.as_str(), error = %e, "조회 실패");
            }
        }

        tokio::time::sleep(config.crypto.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
