//! FRED 경제지표 동기화 모듈.
//!
//! FRED 시리즈는 행 수가 작으므로 매번 전체 기간을 조회하고
//! upsert로 중복을 처리합니다.

use crate::{CollectionStats, CollectorConfig, Result};
use findata_data::{CsvExporter, Database, FredClient, MacroRepository};
use sqlx::PgPool;
use std::time::Instant;

/// FRED 시리즈 동기화
pub async fn sync_fred(pool: &PgPool, config: &CollectorConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("FRED 동기화 시작");

    let api_key = config.fred.api_key.as_deref().ok_or_else(|| {
        crate::error::CollectorError::Config(
            "FRED_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
        )
    })?;

    if config.fred.series.is_empty() {
        tracing::warn!("수집할 FRED 시리즈가 없습니다 (FRED_SERIES 환경변수 확인)");
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = FredClient::new(api_key);
    let repo = MacroRepository::new(Database::from_pool(pool.clone()));
    let exporter = CsvExporter::new(&config.csv.base_dir);

    for (idx, series_id) in config.fred.series.iter().enumerate() {
        stats.total += 1;

        tracing::info!(
            series_id = series_id.as_str(),
            progress = format!("{}/{}", idx + 1, config.fred.series.len()),
            "시리즈 다운로드 시작"
        );

        match client
            .fetch_series_observations(series_id, None, None)
            .await
        {
            Ok(observations) if !observations.is_empty() => {
                let upserted = repo.upsert_fred_batch(&observations).await?;
                stats.success += 1;
                stats.total_rows += upserted;

                if config.csv.enabled {
                    if let Err(e) = exporter.export_fred_series(series_id, &observations) {
                        tracing::warn!(
                            series_id = series_id.as_str(),
                            error = %e,
                            "CSV 내보내기 실패"
                        );
                    }
                }

                tracing::info!(
                    series_id = series_id.as_str(),
                    rows = observations.len(),
                    "시리즈 저장 완료"
                );
            }
            Ok(_) => {
                stats.empty += 1;
                tracing::warn!(
                    series_id = series_id.as_str(),
                    "관측치 없음 (시리즈 ID 확인 필요)"
                );
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(series_id = series_id.as_str(), error = %e, "조회 실패");
            }
        }

        tokio::time::sleep(config.fred.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
