//! LLM 뉴스 감성 분석 모듈.
//!
//! 티커별로 저장된 최근 기사를 LLM으로 스코어링하고 업스트림
//! 감성 점수와 결합해 일 단위 요약을 저장합니다. LLM 호출이
//! 실패하면 업스트림 점수만으로 집계합니다.

use crate::{CollectionStats, CollectorConfig, Result};
use chrono::Utc;
use findata_analytics::sentiment::{
    aggregate_sentiment, scale_upstream_score, ArticleSnippet, GeminiClient,
};
use findata_data::{Database, NewsRepository, SentimentSummaryRecord};
use sqlx::PgPool;
use std::time::Instant;

/// 티커별 뉴스 감성 분석
pub async fn analyze_sentiment(
    pool: &PgPool,
    config: &CollectorConfig,
    tickers: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("뉴스 감성 분석 시작");

    let api_key = config.sentiment.gemini_api_key.as_deref().ok_or_else(|| {
        crate::error::CollectorError::Config(
            "GEMINI_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
        )
    })?;

    let target_tickers =
        super::resolve_target_symbols(pool, tickers, &config.stock_symbols).await?;

    if target_tickers.is_empty() {
        tracing::warn!("분석 대상 티커가 없습니다");
        stats.skipped = 1;
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = GeminiClient::new(api_key, &config.sentiment.model);
    let repo = NewsRepository::new(Database::from_pool(pool.clone()));
    let today = Utc::now().date_naive();

    for ticker in &target_tickers {
        stats.total += 1;

        let articles = repo
            .load_articles_for_ticker(ticker, config.sentiment.max_articles)
            .await?;

        if articles.is_empty() {
            stats.empty += 1;
            tracing::debug!(ticker = ticker.as_str(), "분석할 기사 없음");
            continue;
        }

        // 업스트림 감성 점수 (-1 ~ 1)를 LLM 스케일로 변환
        let upstream_scores: Vec<f64> = articles
            .iter()
            .filter_map(|a| a.sentiment_score)
            .map(scale_upstream_score)
            .collect();

        let snippets: Vec<ArticleSnippet> = articles
            .iter()
            .map(|a| ArticleSnippet {
                title: a.title.clone(),
                snippet: a.summary.clone().unwrap_or_default(),
            })
            .collect();

        // LLM 스코어링 실패는 업스트림 점수만으로 집계 (분석 자체는 계속)
        let llm_scores = match client.score_articles(ticker, &snippets).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!(
                    ticker = ticker.as_str(),
                    error = %e,
                    "LLM 스코어링 실패, 업스트림 점수만 사용"
                );
                Vec::new()
            }
        };

        let summary = aggregate_sentiment(&upstream_scores, &llm_scores);

        let record = SentimentSummaryRecord {
            ticker: ticker.clone(),
            analyzed_on: today,
            total_mentions: summary.total_mentions as i32,
            average_sentiment_score: summary.average_sentiment_score,
            sentiment_std_dev: summary.sentiment_std_dev,
            average_impact_rating: summary.average_impact_rating,
            average_novelty_score: summary.average_novelty_score,
            analyzed_count: summary.analyzed_count as i32,
        };
        repo.upsert_sentiment_summary(&record).await?;

        stats.success += 1;
        stats.total_rows += 1;

        tracing::info!(
            ticker = ticker.as_str(),
            mentions = summary.total_mentions,
            analyzed = summary.analyzed_count,
            avg_score = ?summary.average_sentiment_score,
            "감성 요약 저장 완료"
        );

        tokio::time::sleep(config.news.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
