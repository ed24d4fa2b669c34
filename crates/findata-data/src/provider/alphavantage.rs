//! AlphaVantage API 클라이언트.
//!
//! AlphaVantage REST API를 통해 주식 데이터를 수집합니다.
//!
//! # 지원 데이터
//!
//! - 일별 OHLCV (TIME_SERIES_DAILY)
//! - 기업 개요 (OVERVIEW)
//! - 재무제표: 손익계산서, 재무상태표, 현금흐름표 (연간/분기)
//! - 뉴스 및 티커 감성 (NEWS_SENTIMENT)
//!
//! # 요청 한도
//!
//! 무료 티어는 분당 5회로 제한됩니다. 한도 초과 시 API는 HTTP 200과
//! 함께 `"Note"` 필드가 담긴 본문을 반환하며, 이 경우
//! [`DataError::RateLimited`]로 매핑되어 호출자가 지연 후 재시도할 수
//! 있습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use findata_data::provider::alphavantage::AlphaVantageClient;
//!
//! let client = AlphaVantageClient::new("YOUR_API_KEY");
//! let bars = client.fetch_daily_ohlcv("AAPL", "full").await?;
//! let overview = client.fetch_company_overview("AAPL").await?;
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use findata_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, DailyBar, IncomeStatement, NewsArticle,
    StatementPeriod, TickerSentiment,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DataError, Result};

/// AlphaVantage API 클라이언트.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// 새로운 AlphaVantage 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - AlphaVantage API 키
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: "https://www.alphavantage.co".to_string(),
        }
    }

    /// 환경변수 `ALPHAVANTAGE_API_KEY`에서 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("ALPHAVANTAGE_API_KEY").ok().map(Self::new)
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API 요청 실행 후 공통 오류 본문 검사.
    ///
    /// AlphaVantage는 오류에도 HTTP 200을 반환하므로 본문의
    /// `Error Message` / `Note` / `Information` 필드를 확인합니다.
    async fn get_json(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/query", self.base_url);

        let mut query: Vec<(&str, &str)> = vec![("function", function)];
        query.extend_from_slice(params);
        query.push(("apikey", self.api_key.as_str()));

        tracing::debug!(function = function, "AlphaVantage API 요청");

        let response = self.client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "AlphaVantage {} [{}]: {}",
                function,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let data: Value = response.json().await?;

        if let Some(msg) = data.get("Error Message").and_then(Value::as_str) {
            return Err(DataError::FetchError(format!(
                "AlphaVantage {} 오류: {}",
                function, msg
            )));
        }
        // "Note"와 "Information"은 요청 한도 초과 안내
        if let Some(note) = data
            .get("Note")
            .or_else(|| data.get("Information"))
            .and_then(Value::as_str)
        {
            return Err(DataError::RateLimited(format!(
                "AlphaVantage {}: {}",
                function, note
            )));
        }

        Ok(data)
    }

    /// 일별 OHLCV 조회.
    ///
    /// # Arguments
    /// * `symbol` - 종목 코드
    /// * `outputsize` - "compact" (최근 100일) 또는 "full" (전체)
    pub async fn fetch_daily_ohlcv(&self, symbol: &str, outputsize: &str) -> Result<Vec<DailyBar>> {
        let data = self
            .get_json(
                "TIME_SERIES_DAILY",
                &[("symbol", symbol), ("outputsize", outputsize)],
            )
            .await?;

        let series = match data.get("Time Series (Daily)").and_then(Value::as_object) {
            Some(series) => series,
            None => {
                tracing::warn!(symbol = symbol, "AlphaVantage OHLCV 응답에 시계열 없음");
                return Ok(Vec::new());
            }
        };

        let mut bars: Vec<DailyBar> = series
            .iter()
            .filter_map(|(date_str, values)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                Some(DailyBar {
                    symbol: symbol.to_string(),
                    date,
                    open: value_decimal(values, "1. open"),
                    high: value_decimal(values, "2. high"),
                    low: value_decimal(values, "3. low"),
                    close: value_decimal(values, "4. close"),
                    volume: value_decimal(values, "5. volume"),
                })
            })
            .collect();

        // 응답은 최신순이므로 날짜 오름차순으로 정렬
        bars.sort_by_key(|b| b.date);

        tracing::info!(symbol = symbol, count = bars.len(), "일별 OHLCV 조회 완료");
        Ok(bars)
    }

    /// 기업 개요 조회.
    ///
    /// 알 수 없는 종목이면 API가 빈 객체를 반환하며, 이 경우 `None`입니다.
    pub async fn fetch_company_overview(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        #[derive(Deserialize)]
        struct RawOverview {
            #[serde(rename = "Name", default)]
            name: Option<String>,
            #[serde(rename = "AssetType", default)]
            asset_type: Option<String>,
            #[serde(rename = "Description", default)]
            description: Option<String>,
            #[serde(rename = "Exchange", default)]
            exchange: Option<String>,
            #[serde(rename = "Currency", default)]
            currency: Option<String>,
            #[serde(rename = "Country", default)]
            country: Option<String>,
            #[serde(rename = "Sector", default)]
            sector: Option<String>,
            #[serde(rename = "Industry", default)]
            industry: Option<String>,
            #[serde(rename = "MarketCapitalization", default)]
            market_capitalization: Option<String>,
            #[serde(rename = "PERatio", default)]
            pe_ratio: Option<String>,
            #[serde(rename = "DividendYield", default)]
            dividend_yield: Option<String>,
        }

        let data = self.get_json("OVERVIEW", &[("symbol", symbol)]).await?;

        // 알 수 없는 종목은 빈 객체로 응답
        if data.as_object().map_or(true, |o| o.is_empty()) {
            tracing::warn!(symbol = symbol, "기업 개요 데이터 없음");
            return Ok(None);
        }

        let raw: RawOverview = serde_json::from_value(data)?;

        let profile = CompanyProfile {
            symbol: symbol.to_string(),
            company_name: raw.name,
            asset_type: raw.asset_type,
            description: raw.description,
            exchange: raw.exchange,
            currency: raw.currency,
            country: raw.country,
            sector: raw.sector,
            industry: raw.industry,
            market_capitalization: raw
                .market_capitalization
                .as_deref()
                .and_then(|v| v.parse().ok()),
            pe_ratio: parse_decimal_opt(&raw.pe_ratio),
            dividend_yield: parse_decimal_opt(&raw.dividend_yield),
        };

        tracing::info!(symbol = symbol, "기업 개요 조회 완료");
        Ok(Some(profile))
    }

    /// 손익계산서 조회 (연간 + 분기).
    pub async fn fetch_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawIncome {
            fiscal_date_ending: String,
            #[serde(default)]
            reported_currency: Option<String>,
            #[serde(default)]
            gross_profit: Option<String>,
            #[serde(default)]
            total_revenue: Option<String>,
            #[serde(default)]
            cost_of_revenue: Option<String>,
            #[serde(default)]
            operating_income: Option<String>,
            #[serde(default)]
            operating_expenses: Option<String>,
            #[serde(default)]
            selling_general_and_administrative: Option<String>,
            #[serde(default)]
            research_and_development: Option<String>,
            #[serde(default)]
            depreciation_and_amortization: Option<String>,
            #[serde(default)]
            income_before_tax: Option<String>,
            #[serde(default)]
            net_income: Option<String>,
            #[serde(default)]
            ebitda: Option<String>,
        }

        let reports = self
            .fetch_statement_reports::<RawIncome>("INCOME_STATEMENT", symbol)
            .await?;

        let statements: Vec<IncomeStatement> = reports
            .into_iter()
            .filter_map(|(raw, period)| {
                let fiscal_date_ending =
                    NaiveDate::parse_from_str(&raw.fiscal_date_ending, "%Y-%m-%d").ok()?;
                Some(IncomeStatement {
                    symbol: symbol.to_string(),
                    fiscal_date_ending,
                    period,
                    reported_currency: raw.reported_currency,
                    gross_profit: parse_decimal_opt(&raw.gross_profit),
                    total_revenue: parse_decimal_opt(&raw.total_revenue),
                    cost_of_revenue: parse_decimal_opt(&raw.cost_of_revenue),
                    operating_income: parse_decimal_opt(&raw.operating_income),
                    operating_expenses: parse_decimal_opt(&raw.operating_expenses),
                    selling_general_and_administrative: parse_decimal_opt(
                        &raw.selling_general_and_administrative,
                    ),
                    research_and_development: parse_decimal_opt(&raw.research_and_development),
                    depreciation_and_amortization: parse_decimal_opt(
                        &raw.depreciation_and_amortization,
                    ),
                    income_before_tax: parse_decimal_opt(&raw.income_before_tax),
                    net_income: parse_decimal_opt(&raw.net_income),
                    ebitda: parse_decimal_opt(&raw.ebitda),
                })
            })
            .collect();

        tracing::info!(
            symbol = symbol,
            count = statements.len(),
            "손익계산서 조회 완료"
        );
        Ok(statements)
    }

    /// 재무상태표 조회 (연간 + 분기).
    pub async fn fetch_balance_sheets(&self, symbol: &str) -> Result<Vec<BalanceSheet>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawBalance {
            fiscal_date_ending: String,
            #[serde(default)]
            reported_currency: Option<String>,
            #[serde(default)]
            total_assets: Option<String>,
            #[serde(default, rename = "totalCurrentAssets")]
            current_assets: Option<String>,
            #[serde(default)]
            cash_and_cash_equivalents_at_carrying_value: Option<String>,
            #[serde(default)]
            inventory: Option<String>,
            #[serde(default)]
            property_plant_equipment: Option<String>,
            #[serde(default)]
            intangible_assets: Option<String>,
            #[serde(default)]
            total_liabilities: Option<String>,
            #[serde(default, rename = "totalCurrentLiabilities")]
            current_liabilities: Option<String>,
            #[serde(default)]
            short_term_debt: Option<String>,
            #[serde(default)]
            long_term_debt: Option<String>,
            #[serde(default)]
            total_shareholder_equity: Option<String>,
            #[serde(default)]
            retained_earnings: Option<String>,
            #[serde(default)]
            common_stock: Option<String>,
        }

        let reports = self
            .fetch_statement_reports::<RawBalance>("BALANCE_SHEET", symbol)
            .await?;

        let statements: Vec<BalanceSheet> = reports
            .into_iter()
            .filter_map(|(raw, period)| {
                let fiscal_date_ending =
                    NaiveDate::parse_from_str(&raw.fiscal_date_ending, "%Y-%m-%d").ok()?;
                Some(BalanceSheet {
                    symbol: symbol.to_string(),
                    fiscal_date_ending,
                    period,
                    reported_currency: raw.reported_currency,
                    total_assets: parse_decimal_opt(&raw.total_assets),
                    current_assets: parse_decimal_opt(&raw.current_assets),
                    cash_and_cash_equivalents: parse_decimal_opt(
                        &raw.cash_and_cash_equivalents_at_carrying_value,
                    ),
                    inventory: parse_decimal_opt(&raw.inventory),
                    property_plant_and_equipment: parse_decimal_opt(&raw.property_plant_equipment),
                    intangible_assets: parse_decimal_opt(&raw.intangible_assets),
                    total_liabilities: parse_decimal_opt(&raw.total_liabilities),
                    current_liabilities: parse_decimal_opt(&raw.current_liabilities),
                    short_term_debt: parse_decimal_opt(&raw.short_term_debt),
                    long_term_debt: parse_decimal_opt(&raw.long_term_debt),
                    total_shareholder_equity: parse_decimal_opt(&raw.total_shareholder_equity),
                    retained_earnings: parse_decimal_opt(&raw.retained_earnings),
                    common_stock: parse_decimal_opt(&raw.common_stock),
                })
            })
            .collect();

        tracing::info!(
            symbol = symbol,
            count = statements.len(),
            "재무상태표 조회 완료"
        );
        Ok(statements)
    }

    /// 현금흐름표 조회 (연간 + 분기).
    pub async fn fetch_cash_flows(&self, symbol: &str) -> Result<Vec<CashFlowStatement>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawCashFlow {
            fiscal_date_ending: String,
            #[serde(default)]
            reported_currency: Option<String>,
            #[serde(default)]
            operating_cashflow: Option<String>,
            #[serde(default)]
            capital_expenditures: Option<String>,
            #[serde(default)]
            change_in_operating_liabilities: Option<String>,
            #[serde(default)]
            change_in_operating_assets: Option<String>,
            #[serde(default)]
            depreciation_depletion_and_amortization: Option<String>,
            #[serde(default, rename = "cashflowFromInvestment")]
            investments_cashflow: Option<String>,
            #[serde(default)]
            dividend_payout: Option<String>,
            #[serde(default)]
            proceeds_from_issuance_of_long_term_debt_and_capital_securities_net: Option<String>,
        }

        let reports = self
            .fetch_statement_reports::<RawCashFlow>("CASH_FLOW", symbol)
            .await?;

        let statements: Vec<CashFlowStatement> = reports
            .into_iter()
            .filter_map(|(raw, period)| {
                let fiscal_date_ending =
                    NaiveDate::parse_from_str(&raw.fiscal_date_ending, "%Y-%m-%d").ok()?;
                Some(CashFlowStatement {
                    symbol: symbol.to_string(),
                    fiscal_date_ending,
                    period,
                    reported_currency: raw.reported_currency,
                    operating_cashflow: parse_decimal_opt(&raw.operating_cashflow),
                    capital_expenditures: parse_decimal_opt(&raw.capital_expenditures),
                    change_in_operating_liabilities: parse_decimal_opt(
                        &raw.change_in_operating_liabilities,
                    ),
                    change_in_operating_assets: parse_decimal_opt(&raw.change_in_operating_assets),
                    depreciation_depletion_and_amortization: parse_decimal_opt(
                        &raw.depreciation_depletion_and_amortization,
                    ),
                    investments_cashflow: parse_decimal_opt(&raw.investments_cashflow),
                    dividends_paid: parse_decimal_opt(&raw.dividend_payout),
                    net_borrowings: parse_decimal_opt(
                        &raw.proceeds_from_issuance_of_long_term_debt_and_capital_securities_net,
                    ),
                })
            })
            .collect();

        tracing::info!(
            symbol = symbol,
            count = statements.len(),
            "현금흐름표 조회 완료"
        );
        Ok(statements)
    }

    /// 뉴스 및 티커 감성 조회.
    ///
    /// # Arguments
    /// * `tickers` - 대상 티커 (쉼표 구분)
    /// * `time_from` - 조회 시작 시각
    pub async fn fetch_news_sentiment(
        &self,
        tickers: &str,
        time_from: DateTime<Utc>,
    ) -> Result<Vec<NewsArticle>> {
        #[derive(Deserialize)]
        struct RawTickerSentiment {
            ticker: String,
            #[serde(default)]
            relevance_score: Option<String>,
            #[serde(default)]
            ticker_sentiment_score: Option<String>,
            #[serde(default)]
            ticker_sentiment_label: Option<String>,
        }

        #[derive(Deserialize)]
        struct RawFeedItem {
            #[serde(default)]
            title: Option<String>,
            #[serde(default)]
            url: Option<String>,
            #[serde(default)]
            summary: Option<String>,
            #[serde(default)]
            time_published: Option<String>,
            #[serde(default)]
            ticker_sentiment: Vec<RawTickerSentiment>,
        }

        let time_from_str = time_from.format("%Y%m%dT%H%M").to_string();
        let data = self
            .get_json(
                "NEWS_SENTIMENT",
                &[
                    ("tickers", tickers),
                    ("time_from", time_from_str.as_str()),
                    ("sort", "LATEST"),
                    ("limit", "200"),
                ],
            )
            .await?;

        let feed: Vec<RawFeedItem> = match data.get("feed") {
            Some(feed) => serde_json::from_value(feed.clone())?,
            None => {
                tracing::warn!(tickers = tickers, "뉴스 피드 없음");
                return Ok(Vec::new());
            }
        };

        let articles: Vec<NewsArticle> = feed
            .into_iter()
            .filter_map(|item| {
                // 제목과 URL이 없는 항목은 사용 불가
                let title = item.title?;
                let url = item.url?;
                Some(NewsArticle {
                    api_source: "AlphaVantage".to_string(),
                    title,
                    summary: item.summary,
                    url,
                    published_at: item
                        .time_published
                        .as_deref()
                        .and_then(parse_av_timestamp),
                    ticker_sentiments: item
                        .ticker_sentiment
                        .into_iter()
                        .map(|ts| TickerSentiment {
                            ticker: ts.ticker,
                            relevance_score: parse_decimal_opt(&ts.relevance_score),
                            sentiment_score: parse_decimal_opt(&ts.ticker_sentiment_score),
                            sentiment_label: ts.ticker_sentiment_label,
                        })
                        .collect(),
                })
            })
            .collect();

        tracing::info!(
            tickers = tickers,
            count = articles.len(),
            "뉴스 감성 조회 완료"
        );
        Ok(articles)
    }

    /// 재무제표 공통 조회: 연간/분기 보고서 목록을 주기 태그와 함께 반환.
    async fn fetch_statement_reports<T: for<'de> Deserialize<'de>>(
        &self,
        function: &str,
        symbol: &str,
    ) -> Result<Vec<(T, StatementPeriod)>> {
        let data = self.get_json(function, &[("symbol", symbol)]).await?;

        let mut reports = Vec::new();

        for (key, period) in [
            ("annualReports", StatementPeriod::Annual),
            ("quarterlyReports", StatementPeriod::Quarterly),
        ] {
            if let Some(list) = data.get(key).and_then(Value::as_array) {
                for item in list {
                    match serde_json::from_value::<T>(item.clone()) {
                        Ok(raw) => reports.push((raw, period)),
                        Err(e) => {
                            tracing::warn!(
                                symbol = symbol,
                                function = function,
                                error = %e,
                                "보고서 항목 파싱 실패, 건너뜀"
                            );
                        }
                    }
                }
            }
        }

        if reports.is_empty() {
            tracing::warn!(symbol = symbol, function = function, "보고서 데이터 없음");
        }

        Ok(reports)
    }
}

/// JSON 객체에서 문자열 값을 Decimal로 파싱.
fn value_decimal(value: &Value, key: &str) -> Option<Decimal> {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(parse_decimal_str)
}

/// 문자열을 Decimal로 파싱. "None"/"null"/"-" 등은 None 처리.
fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_lowercase().as_str() {
        "none" | "null" | "nan" | "-" => None,
        _ => trimmed.replace(',', "").parse().ok(),
    }
}

/// Option<String>을 Decimal로 파싱.
fn parse_decimal_opt(s: &Option<String>) -> Option<Decimal> {
    s.as_deref().and_then(parse_decimal_str)
}

/// AlphaVantage 타임스탬프 (YYYYMMDDTHHMMSS) 파싱.
fn parse_av_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_str() {
        assert_eq!(parse_decimal_str("123.45"), Some(dec!(123.45)));
        assert_eq!(parse_decimal_str("1,234,567"), Some(dec!(1234567)));
        assert_eq!(parse_decimal_str("None"), None);
        assert_eq!(parse_decimal_str("null"), None);
        assert_eq!(parse_decimal_str("-"), None);
        assert_eq!(parse_decimal_str(""), None);
        assert_eq!(parse_decimal_str("-42.5"), Some(dec!(-42.5)));
    }

    #[test]
    fn test_parse_av_timestamp() {
        let ts = parse_av_timestamp("20240214T093000").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-02-14 09:30");
        assert!(parse_av_timestamp("2024-02-14").is_none());
    }

    #[test]
    fn test_value_decimal() {
        let v: Value = serde_json::json!({"1. open": "185.6400", "5. volume": "52392000"});
        assert_eq!(value_decimal(&v, "1. open"), Some(dec!(185.6400)));
        assert_eq!(value_decimal(&v, "5. volume"), Some(dec!(52392000)));
        assert_eq!(value_decimal(&v, "4. close"), None);
    }
}
