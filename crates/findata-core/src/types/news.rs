//! 뉴스 기사 및 티커 감성 타입.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 뉴스 기사 한 건.
///
/// 여러 뉴스 API에서 수집된 기사를 공통 형태로 담습니다.
/// URL을 고유 키로 사용하여 소스 간 중복을 제거합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    /// 수집 API 이름 (예: "AlphaVantage", "NewsAPI")
    pub api_source: String,
    /// 제목
    pub title: String,
    /// 요약
    pub summary: Option<String>,
    /// 기사 URL (고유 키)
    pub url: String,
    /// 발행 시각
    pub published_at: Option<DateTime<Utc>>,
    /// 업스트림이 제공한 티커별 감성 (없을 수 있음)
    pub ticker_sentiments: Vec<TickerSentiment>,
}

/// 기사에 부착된 티커별 감성 점수.
///
/// AlphaVantage NEWS_SENTIMENT가 제공하는 -1 ~ 1 스케일입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSentiment {
    /// 티커
    pub ticker: String,
    /// 기사와의 관련도 (0 ~ 1)
    pub relevance_score: Option<Decimal>,
    /// 감성 점수 (-1 ~ 1)
    pub sentiment_score: Option<Decimal>,
    /// 감성 라벨 (Bullish, Neutral, Bearish 등)
    pub sentiment_label: Option<String>,
}
