//! 뉴스 수집 모듈.
//!
//! 설정된 모든 뉴스 API에서 기사를 수집하여 URL 기준으로 중복을
//! 제거하며 저장합니다.

use crate::{CollectionStats, CollectorConfig, Result};
use findata_data::{
    AlphaVantageClient, Database, NewsApiClient, NewsProvider, NewsRepository,
};
use sqlx::PgPool;
use std::time::Instant;

/// 뉴스 수집
pub async fn collect_news(
    pool: &PgPool,
    config: &CollectorConfig,
    tickers: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("뉴스 수집 시작");

    let target_tickers =
        super::resolve_target_symbols(pool, tickers, &config.stock_symbols).await?;

    if target_tickers.is_empty() {
        tracing::warn!("뉴스 수집 대상 티커가 없습니다");
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    // 키가 설정된 제공자만 사용
    let mut providers: Vec<Box<dyn NewsProvider>> = Vec::new();
    if let Some(ref key) = config.alphavantage.api_key {
        providers.push(Box::new(AlphaVantageClient::new(key)));
    }
    if let Some(ref key) = config.news.newsapi_api_key {
        providers.push(Box::new(NewsApiClient::new(key)));
    }

    if providers.is_empty() {
        return Err(crate::error::CollectorError::Config(
            "뉴스 API 키가 하나도 설정되지 않았습니다 (ALPHAVANTAGE_API_KEY 또는 NEWSAPI_API_KEY)"
                .to_string(),
        ));
    }

    let repo = NewsRepository::new(Database::from_pool(pool.clone()));

    for provider in &providers {
        stats.total += 1;

        tracing::info!(provider = provider.name(), "제공자 수집 시작");

        match provider
            .fetch_articles(&target_tickers, config.news.days_back)
            .await
        {
            Ok(articles) if !articles.is_empty() => {
                let upserted = repo.upsert_articles(&articles).await?;
                stats.success += 1;
                stats.total_rows += upserted;
                tracing::info!(
                    provider = provider.name(),
                    articles = articles.len(),
                    "기사 저장 완료"
                );
            }
            Ok(_) => {
                stats.empty += 1;
                tracing::warn!(provider = provider.name(), "수집된 기사 없음");
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(provider = provider.name(), error = %e, "수집 실패");
            }
        }

        tokio::time::sleep(config.news.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
