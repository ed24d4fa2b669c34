//! World Bank 지표 동기화 모듈.
//!
//! 국가 × 지표의 이중 루프로 가장 오래 걸리는 워크플로우입니다.
//! 국가 단위로 체크포인트를 저장하여 중단 후 `--resume`으로 이어서
//! 처리할 수 있습니다.

use crate::modules::checkpoint::{load_checkpoint, save_checkpoint, CheckpointStatus};
use crate::{CollectionStats, CollectorConfig, Result};
use chrono::{Datelike, Utc};
use findata_data::{Database, MacroRepository, WorldBankClient};
use sqlx::PgPool;
use std::time::Instant;

/// 체크포인트 워크플로우 이름
const WORKFLOW: &str = "worldbank_sync";

/// World Bank 지표 동기화
pub async fn sync_worldbank(
    pool: &PgPool,
    config: &CollectorConfig,
    resume: bool,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("World Bank 동기화 시작");

    if config.worldbank.countries.is_empty() || config.worldbank.indicators.is_empty() {
        tracing::warn!(
            "수집할 국가/지표 목록이 없습니다 (WB_COUNTRIES, WB_INDICATORS 환경변수 확인)"
        );
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let (start_year, end_year) = resolve_year_range(config);
    tracing::info!(start_year, end_year, "수집 연도 범위 설정 완료");

    let client = WorldBankClient::new()
        .with_retries(config.worldbank.retries, config.worldbank.retry_delay());
    let repo = MacroRepository::new(Database::from_pool(pool.clone()));

    // 국가 목록 검증 (집계 그룹 제외)
    let available_countries = client.fetch_countries().await?;

    let target_countries: Vec<(String, String)> = config
        .worldbank
        .countries
        .iter()
        .filter_map(|code| match available_countries.get(code) {
            Some(name) => Some((code.clone(), name.clone())),
            None => {
                tracing::warn!(code = code.as_str(), "World Bank에 없는 국가 코드, 건너뜀");
                None
            }
        })
        .collect();

    if target_countries.is_empty() {
        tracing::warn!("유효한 국가가 없습니다");
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    // 중단점 재개: 저장된 국가 이후부터 처리
    let resume_after = if resume {
        let checkpoint = load_checkpoint(pool, WORKFLOW).await?;
        if let Some(ref country) = checkpoint {
            tracing::info!(country = country.as_str(), "체크포인트에서 재개");
        }
        checkpoint
    } else {
        None
    };
    let mut skipping = resume_after.is_some();
    let mut processed: i32 = 0;

    for (country_idx, (country_code, country_name)) in target_countries.iter().enumerate() {
        if skipping {
            if Some(country_code.as_str()) == resume_after.as_deref() {
                skipping = false;
            }
            tracing::debug!(country = country_code.as_str(), "재개 전 구간, 건너뜀");
            continue;
        }

        tracing::info!(
            country = country_name.as_str(),
            progress = format!("{}/{}", country_idx + 1, target_countries.len()),
            "국가 수집 시작"
        );

        for (indicator_idx, indicator_code) in config.worldbank.indicators.iter().enumerate() {
            stats.total += 1;

            tracing::debug!(
                indicator = indicator_code.as_str(),
                progress = format!("{}/{}", indicator_idx + 1, config.worldbank.indicators.len()),
                "지표 수집"
            );

            match client
                .fetch_indicator(country_code, indicator_code, start_year, end_year)
                .await
            {
                Ok(observations) if !observations.is_empty() => {
                    let upserted = repo.upsert_indicator_batch(&observations).await?;
                    stats.success += 1;
                    stats.total_rows += upserted;
                }
                Ok(_) => {
                    stats.empty += 1;
                    tracing::debug!(
                        country = country_code.as_str(),
                        indicator = indicator_code.as_str(),
                        "해당 기간 데이터 없음"
                    );
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::error!(
                        country = country_code.as_str(),
                        indicator = indicator_code.as_str(),
                        error = %e,
                        "지표 조회 실패"
                    );
                }
            }

            tokio::time::sleep(config.worldbank.indicator_delay()).await;
        }

        processed += 1;
        save_checkpoint(pool, WORKFLOW, country_code, processed, CheckpointStatus::Running)
            .await?;

        tracing::info!(
            country = country_name.as_str(),
            "국가 수집 완료, 다음 국가까지 대기"
        );
        tokio::time::sleep(config.worldbank.country_delay()).await;
    }

    if skipping {
        // 체크포인트 국가가 현재 대상 목록에 없음 (설정이 바뀐 경우)
        tracing::warn!(
            resume_after = ?resume_after,
            "체크포인트 국가를 찾지 못해 아무것도 처리하지 않았습니다. --resume 없이 다시 실행하세요"
        );
    }

    save_checkpoint(pool, WORKFLOW, "", processed, CheckpointStatus::Completed).await?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 수집 연도 범위 결정. 설정이 없으면 최근 5년.
fn resolve_year_range(config: &CollectorConfig) -> (i32, i32) {
    let current_year = Utc::now().year();
    let start_year = config.worldbank.start_year.unwrap_or(current_year - 5);
    let end_year = config.worldbank.end_year.unwrap_or(current_year);
    (start_year, end_year)
}
