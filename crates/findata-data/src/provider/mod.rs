//! 외부 데이터 제공자 클라이언트.

pub mod alphavantage;
pub mod binance;
pub mod fmp;
pub mod fred;
pub mod newsapi;
pub mod worldbank;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use findata_core::NewsArticle;

use crate::error::Result;

pub use alphavantage::AlphaVantageClient;
pub use binance::BinanceClient;
pub use fmp::FmpClient;
pub use fred::FredClient;
pub use newsapi::NewsApiClient;
pub use worldbank::WorldBankClient;

/// 뉴스 수집기가 여러 API를 동일하게 다루기 위한 trait.
///
/// 각 구현은 쿼리 해석 방식이 다릅니다. AlphaVantage는 쉼표 구분
/// 티커 목록을, NewsAPI는 검색 쿼리 문자열을 기대합니다.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// 제공자 이름 (로그/저장용).
    fn name(&self) -> &'static str;

    /// 기사 수집.
    ///
    /// # Arguments
    /// * `tickers` - 대상 티커 목록
    /// * `days_back` - 오늘로부터 며칠 전까지
    async fn fetch_articles(&self, tickers: &[String], days_back: i64) -> Result<Vec<NewsArticle>>;
}

#[async_trait]
impl NewsProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "AlphaVantage"
    }

    async fn fetch_articles(&self, tickers: &[String], days_back: i64) -> Result<Vec<NewsArticle>> {
        let tickers_param = tickers.join(",");
        let time_from = Utc::now() - Duration::days(days_back);
        self.fetch_news_sentiment(&tickers_param, time_from).await
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn name(&self) -> &'static str {
        "NewsAPI"
    }

    async fn fetch_articles(&self, tickers: &[String], days_back: i64) -> Result<Vec<NewsArticle>> {
        // "AAPL" OR "MSFT" 형태의 검색 쿼리 구성
        let query = tickers
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.fetch_everything(&query, days_back).await
    }
}
