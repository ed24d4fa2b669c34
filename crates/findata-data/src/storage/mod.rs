//! 데이터 저장소.

pub mod postgres;

pub use postgres::{
    CompanyRecord, CompanyRepository, Database, DatabaseConfig, FinancialsRepository,
    MacroRepository, NewsRepository, OhlcvRecord, OhlcvRepository, SentimentSummaryRecord,
    TickerArticleRecord,
};
