//! NewsAPI (newsapi.org) 클라이언트.
//!
//! `/v2/everything` endpoint에서 키워드 기반으로 기사를 수집합니다.
//! NewsAPI는 티커 감성을 제공하지 않으므로 수집된 기사의
//! `ticker_sentiments`는 비어 있습니다.

use chrono::{DateTime, Duration, Utc};
use findata_core::NewsArticle;
use serde::Deserialize;

use crate::error::{DataError, Result};

/// NewsAPI 클라이언트.
#[derive(Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// NewsAPI 기사 원본.
#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<String>,
}

/// NewsAPI 응답 래퍼.
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

impl NewsApiClient {
    /// 새로운 NewsAPI 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: "https://newsapi.org".to_string(),
        }
    }

    /// 환경변수 `NEWSAPI_API_KEY`에서 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("NEWSAPI_API_KEY").ok().map(Self::new)
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 키워드로 기사 검색.
    ///
    /// # Arguments
    /// * `query` - 검색 쿼리 (예: `"AAPL" OR "MSFT"`)
    /// * `days_back` - 오늘로부터 며칠 전까지 (무료 티어 최대 29일)
    pub async fn fetch_everything(&self, query: &str, days_back: i64) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/v2/everything", self.base_url);

        let now = Utc::now();
        // NewsAPI 무료 티어는 약 한 달 이전 기사 조회를 거부
        let from = now - Duration::days(days_back.min(29));
        let from_str = from.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let to_str = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();

        tracing::debug!(query = query, "NewsAPI 요청");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("from", from_str.as_str()),
                ("to", to_str.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", "100"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let data: EverythingResponse = response.json().await?;

        if data.status != "ok" {
            return Err(DataError::FetchError(format!(
                "NewsAPI [{}]: {}",
                status,
                data.message.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        let articles = parse_articles(data.articles);

        tracing::info!(query = query, count = articles.len(), "뉴스 조회 완료");
        Ok(articles)
    }
}

/// 원본 기사를 도메인 타입으로 변환. 제목/URL 없는 항목은 건너뜁니다.
fn parse_articles(raw_articles: Vec<RawArticle>) -> Vec<NewsArticle> {
    raw_articles
        .into_iter()
        .filter_map(|raw| {
            let title = raw.title?;
            let url = raw.url?;
            Some(NewsArticle {
                api_source: "NewsAPI".to_string(),
                title,
                summary: raw.description,
                url,
                published_at: raw
                    .published_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                ticker_sentiments: Vec::new(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_articles_skips_incomplete() {
        let json = r#"[
            {
                "title": "Apple beats earnings estimates",
                "description": "Quarterly results...",
                "url": "https://example.com/apple-earnings",
                "publishedAt": "2024-02-01T21:30:00Z"
            },
            {"title": "No URL here", "description": "dropped"},
            {"url": "https://example.com/no-title"}
        ]"#;
        let raw: Vec<RawArticle> = serde_json::from_str(json).unwrap();

        let articles = parse_articles(raw);

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.api_source, "NewsAPI");
        assert_eq!(article.title, "Apple beats earnings estimates");
        assert!(article.published_at.is_some());
        assert!(article.ticker_sentiments.is_empty());
    }

    #[test]
    fn test_error_response_shape() {
        let json = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}"#;
        let parsed: EverythingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, "error");
        assert!(parsed.articles.is_empty());
        assert_eq!(parsed.message.as_deref(), Some("Your API key is invalid"));
    }
}
