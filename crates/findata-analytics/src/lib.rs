//! 계량 모델 및 뉴스 감성 분석.
//!
//! 이 crate는 다음을 제공합니다:
//! - Black-Scholes-Merton 옵션 가격 및 그릭스 계산
//! - LLM(Gemini) 기반 뉴스 감성 스코어링 및 티커별 집계

pub mod black_scholes;
pub mod sentiment;

pub use black_scholes::{price_greeks, OptionGreeks, OptionType};
pub use sentiment::{
    aggregate_sentiment, ArticleScore, ArticleSnippet, GeminiClient, SentimentSummary,
};
