//! 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 외부 API 클라이언트 (AlphaVantage, FMP, FRED, World Bank, Binance, NewsAPI)
//! - TimescaleDB 저장소 (upsert 기반 repository)
//! - 거래소/산업 폴더 구조의 CSV 내보내기

pub mod error;
pub mod export;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 저장소 타입 재내보내기
pub use storage::postgres::{
    CompanyRecord, CompanyRepository, Database, DatabaseConfig, FinancialsRepository,
    MacroRepository, NewsRepository, OhlcvRecord, OhlcvRepository, SentimentSummaryRecord,
    TickerArticleRecord,
};

// Provider 재내보내기
pub use provider::{
    AlphaVantageClient, BinanceClient, FmpClient, FredClient, NewsApiClient, NewsProvider,
    WorldBankClient,
};

// CSV 내보내기 재내보내기
pub use export::CsvExporter;
