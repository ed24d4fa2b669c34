//! 환경변수 기반 설정 모듈.
//!
//! API 키와 DB URL은 `.env` 파일 또는 환경변수로 전달합니다.
//! 각 소스별 요청 딜레이 기본값은 해당 API의 무료 티어 한도에
//! 맞춰져 있습니다 (AlphaVantage는 분당 5회 → 15초).

use crate::Result;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 수집 대상 주식 심볼 목록
    pub stock_symbols: Vec<String>,
    /// AlphaVantage 설정
    pub alphavantage: AlphaVantageConfig,
    /// FMP 설정
    pub fmp: FmpConfig,
    /// 암호화폐 수집 설정
    pub crypto: CryptoConfig,
    /// FRED 설정
    pub fred: FredConfig,
    /// World Bank 설정
    pub worldbank: WorldBankConfig,
    /// 뉴스 수집 설정
    pub news: NewsConfig,
    /// LLM 감성 분석 설정
    pub sentiment: SentimentConfig,
    /// CSV 내보내기 설정
    pub csv: CsvConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// AlphaVantage 설정
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    /// API 키
    pub api_key: Option<String>,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// OHLCV outputsize ("compact" 또는 "full")
    pub outputsize: String,
}

/// FMP 설정
#[derive(Debug, Clone)]
pub struct FmpConfig {
    /// API 키
    pub api_key: Option<String>,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 조회할 분기 수
    pub quarter_limit: usize,
}

/// 암호화폐 수집 설정
#[derive(Debug, Clone)]
pub struct CryptoConfig {
    /// 수집 대상 거래쌍 (예: "BTC/USDT")
    pub pairs: Vec<String>,
    /// 수집 기간 (일)
    pub since_days: i64,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// FRED 설정
#[derive(Debug, Clone)]
pub struct FredConfig {
    /// API 키
    pub api_key: Option<String>,
    /// 수집 대상 시리즈 ID 목록
    pub series: Vec<String>,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// World Bank 설정
#[derive(Debug, Clone)]
pub struct WorldBankConfig {
    /// 수집 대상 ISO3 국가 코드 목록
    pub countries: Vec<String>,
    /// 수집 대상 지표 코드 목록
    pub indicators: Vec<String>,
    /// 수집 시작 연도 (없으면 5년 전)
    pub start_year: Option<i32>,
    /// 수집 종료 연도 (없으면 올해)
    pub end_year: Option<i32>,
    /// 지표 간 딜레이 (밀리초)
    pub indicator_delay_ms: u64,
    /// 국가 간 딜레이 (밀리초)
    pub country_delay_ms: u64,
    /// 일시적 오류 재시도 횟수
    pub retries: u32,
    /// 재시도 간 대기 (밀리초)
    pub retry_delay_ms: u64,
}

/// 뉴스 수집 설정
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// NewsAPI 키
    pub newsapi_api_key: Option<String>,
    /// 오늘로부터 며칠 전 기사까지
    pub days_back: i64,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// LLM 감성 분석 설정
#[derive(Debug, Clone)]
pub struct SentimentConfig {
    /// Gemini API 키
    pub gemini_api_key: Option<String>,
    /// Gemini 모델 이름
    pub model: String,
    /// 티커당 분석할 최대 기사 수
    pub max_articles: i64,
}

/// CSV 내보내기 설정
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// 내보내기 활성화 여부
    pub enabled: bool,
    /// 저장 기준 디렉토리
    pub base_dir: String,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            crate::error::CollectorError::Config(
                "DATABASE_URL 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        Ok(Self {
            database_url,
            stock_symbols: env_var_list("STOCK_SYMBOLS"),
            alphavantage: AlphaVantageConfig {
                api_key: std::env::var("ALPHAVANTAGE_API_KEY").ok(),
                request_delay_ms: env_var_parse("ALPHAVANTAGE_REQUEST_DELAY_MS", 15_000),
                outputsize: std::env::var("OHLCV_OUTPUTSIZE")
                    .unwrap_or_else(|_| "full".to_string()),
            },
            fmp: FmpConfig {
                api_key: std::env::var("FMP_API_KEY").ok(),
                request_delay_ms: env_var_parse("FMP_REQUEST_DELAY_MS", 1_000),
                quarter_limit: env_var_parse("FMP_QUARTER_LIMIT", 100),
            },
            crypto: CryptoConfig {
                pairs: env_var_list("CRYPTO_PAIRS"),
                since_days: env_var_parse("CRYPTO_SINCE_DAYS", 365),
                request_delay_ms: env_var_parse("CRYPTO_REQUEST_DELAY_MS", 1_000),
            },
            fred: FredConfig {
                api_key: std::env::var("FRED_API_KEY").ok(),
                series: env_var_list("FRED_SERIES"),
                request_delay_ms: env_var_parse("FRED_REQUEST_DELAY_MS", 500),
            },
            worldbank: WorldBankConfig {
                countries: env_var_list("WB_COUNTRIES"),
                indicators: env_var_list("WB_INDICATORS"),
                start_year: std::env::var("WB_START_YEAR")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                end_year: std::env::var("WB_END_YEAR")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                indicator_delay_ms: env_var_parse("WB_INDICATOR_DELAY_MS", 100),
                country_delay_ms: env_var_parse("WB_COUNTRY_DELAY_MS", 5_000),
                retries: env_var_parse("WB_RETRIES", 3),
                retry_delay_ms: env_var_parse("WB_RETRY_DELAY_MS", 1_000),
            },
            news: NewsConfig {
                newsapi_api_key: std::env::var("NEWSAPI_API_KEY").ok(),
                days_back: env_var_parse("NEWS_DAYS_BACK", 30),
                request_delay_ms: env_var_parse("NEWS_REQUEST_DELAY_MS", 1_000),
            },
            sentiment: SentimentConfig {
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                model: std::env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-pro-latest".to_string()),
                max_articles: env_var_parse("SENTIMENT_MAX_ARTICLES", 10),
            },
            csv: CsvConfig {
                enabled: env_var_bool("CSV_EXPORT_ENABLED", true),
                base_dir: std::env::var("CSV_BASE_DIR").unwrap_or_else(|_| "raw_data".to_string()),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1_440),
            },
        })
    }
}

impl AlphaVantageConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl FmpConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl CryptoConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl FredConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl WorldBankConfig {
    /// 지표 간 딜레이를 Duration으로 반환
    pub fn indicator_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_delay_ms)
    }

    /// 국가 간 딜레이를 Duration으로 반환
    pub fn country_delay(&self) -> Duration {
        Duration::from_millis(self.country_delay_ms)
    }

    /// 재시도 간 대기를 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl NewsConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// 쉼표로 구분된 환경변수 목록 파싱
fn env_var_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| parse_list(&v))
        .unwrap_or_default()
}

/// 쉼표 구분 문자열을 목록으로 파싱 (공백 제거, 빈 항목 제외)
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("AAPL,MSFT"), vec!["AAPL", "MSFT"]);
        assert_eq!(parse_list(" AAPL , MSFT ,"), vec!["AAPL", "MSFT"]);
        assert_eq!(parse_list(""), Vec::<String>::new());
        assert_eq!(parse_list("BTC/USDT"), vec!["BTC/USDT"]);
    }
}
