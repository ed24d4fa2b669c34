//! Financial Modeling Prep (FMP) API 클라이언트.
//!
//! FMP v3 API에서 분기 재무제표를 수집하고 손익계산서/재무상태표/
//! 현금흐름표를 보고일 기준으로 결합하여 하나의 요약 행으로 만듭니다.

use chrono::NaiveDate;
use findata_core::FinancialSummary;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{DataError, Result};

/// FMP API 클라이언트.
#[derive(Clone)]
pub struct FmpClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// FMP 손익계산서 행 (필요한 필드만).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIncome {
    date: String,
    #[serde(default)]
    revenue: Option<Decimal>,
    #[serde(default)]
    gross_profit: Option<Decimal>,
    #[serde(default)]
    operating_income: Option<Decimal>,
    #[serde(default)]
    net_income: Option<Decimal>,
}

/// FMP 재무상태표 행.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalance {
    date: String,
    #[serde(default)]
    total_assets: Option<Decimal>,
    #[serde(default)]
    total_liabilities: Option<Decimal>,
    #[serde(default)]
    total_stockholders_equity: Option<Decimal>,
}

/// FMP 현금흐름표 행.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCashFlow {
    date: String,
    #[serde(default, rename = "netCashProvidedByOperatingActivities")]
    cash_from_operations: Option<Decimal>,
}

impl FmpClient {
    /// 새로운 FMP 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: "https://financialmodelingprep.com".to_string(),
        }
    }

    /// 환경변수 `FMP_API_KEY`에서 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("FMP_API_KEY").ok().map(Self::new)
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 분기 재무제표 3종을 조회하여 보고일 기준으로 결합.
    ///
    /// # Arguments
    /// * `symbol` - 종목 코드
    /// * `limit` - 조회할 분기 수
    pub async fn fetch_quarterly_financials(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<FinancialSummary>> {
        let incomes: Vec<RawIncome> = self.get_statement("income-statement", symbol, limit).await?;
        let balances: Vec<RawBalance> = self
            .get_statement("balance-sheet-statement", symbol, limit)
            .await?;
        let cash_flows: Vec<RawCashFlow> = self
            .get_statement("cash-flow-statement", symbol, limit)
            .await?;

        let summaries = combine_statements(symbol, incomes, balances, cash_flows);

        if summaries.is_empty() {
            tracing::warn!(symbol = symbol, "결합 후 재무제표 데이터 없음");
        } else {
            tracing::info!(
                symbol = symbol,
                count = summaries.len(),
                "FMP 재무제표 조회 완료"
            );
        }

        Ok(summaries)
    }

    /// 재무제표 단일 endpoint 조회.
    async fn get_statement<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        let url = format!("{}/api/v3/{}/{}", self.base_url, endpoint, symbol);
        let limit_str = limit.to_string();

        tracing::debug!(endpoint = endpoint, symbol = symbol, "FMP API 요청");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period", "quarter"),
                ("limit", limit_str.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "FMP {} [{}]: {}",
                endpoint,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let rows: Vec<T> = response.json().await?;
        Ok(rows)
    }
}

/// 세 재무제표를 보고일 기준으로 결합.
///
/// 손익계산서 행이 기준이 되고 재무상태표/현금흐름표가 같은 날짜 행을
/// 보강합니다. 손익계산서에 없는 날짜의 행도 버리지 않고 포함합니다.
fn combine_statements(
    symbol: &str,
    incomes: Vec<RawIncome>,
    balances: Vec<RawBalance>,
    cash_flows: Vec<RawCashFlow>,
) -> Vec<FinancialSummary> {
    let mut combined: BTreeMap<NaiveDate, FinancialSummary> = BTreeMap::new();

    let empty_row = |date: NaiveDate| FinancialSummary {
        symbol: symbol.to_string(),
        report_date: date,
        revenue: None,
        gross_profit: None,
        operating_income: None,
        net_income: None,
        total_assets: None,
        total_liabilities: None,
        total_equity: None,
        cash_from_operations: None,
    };

    for income in incomes {
        if let Some(date) = parse_report_date(&income.date) {
            let row = combined.entry(date).or_insert_with(|| empty_row(date));
            row.revenue = income.revenue;
            row.gross_profit = income.gross_profit;
            row.operating_income = income.operating_income;
            row.net_income = income.net_income;
        }
    }

    for balance in balances {
        if let Some(date) = parse_report_date(&balance.date) {
            let row = combined.entry(date).or_insert_with(|| empty_row(date));
            row.total_assets = balance.total_assets;
            row.total_liabilities = balance.total_liabilities;
            row.total_equity = balance.total_stockholders_equity;
        }
    }

    for cash_flow in cash_flows {
        if let Some(date) = parse_report_date(&cash_flow.date) {
            let row = combined.entry(date).or_insert_with(|| empty_row(date));
            row.cash_from_operations = cash_flow.cash_from_operations;
        }
    }

    combined.into_values().collect()
}

/// 보고일 파싱. "2023-09-30T16:30:00.000Z" 같은 형식도 T 앞부분만 사용.
fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_report_date() {
        assert_eq!(parse_report_date("2023-09-30"), Some(date(2023, 9, 30)));
        assert_eq!(
            parse_report_date("2023-09-30T16:30:00.000Z"),
            Some(date(2023, 9, 30))
        );
        assert_eq!(parse_report_date("not-a-date"), None);
    }

    #[test]
    fn test_combine_statements_merges_by_date() {
        let incomes = vec![RawIncome {
            date: "2023-09-30".to_string(),
            revenue: Some(dec!(1000)),
            gross_profit: Some(dec!(400)),
            operating_income: Some(dec!(300)),
            net_income: Some(dec!(250)),
        }];
        let balances = vec![RawBalance {
            date: "2023-09-30".to_string(),
            total_assets: Some(dec!(5000)),
            total_liabilities: Some(dec!(2000)),
            total_stockholders_equity: Some(dec!(3000)),
        }];
        let cash_flows = vec![RawCashFlow {
            date: "2023-09-30".to_string(),
            cash_from_operations: Some(dec!(280)),
        }];

        let rows = combine_statements("AAPL", incomes, balances, cash_flows);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.symbol, "AAPL");
        assert_eq!(row.report_date, date(2023, 9, 30));
        assert_eq!(row.revenue, Some(dec!(1000)));
        assert_eq!(row.total_equity, Some(dec!(3000)));
        assert_eq!(row.cash_from_operations, Some(dec!(280)));
    }

    #[test]
    fn test_combine_statements_keeps_unmatched_dates() {
        let incomes = vec![RawIncome {
            date: "2023-09-30".to_string(),
            revenue: Some(dec!(1000)),
            gross_profit: None,
            operating_income: None,
            net_income: None,
        }];
        let balances = vec![RawBalance {
            date: "2023-06-30".to_string(),
            total_assets: Some(dec!(4800)),
            total_liabilities: None,
            total_stockholders_equity: None,
        }];

        let rows = combine_statements("AAPL", incomes, balances, vec![]);

        // 날짜 오름차순 정렬
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].report_date, date(2023, 6, 30));
        assert_eq!(rows[0].total_assets, Some(dec!(4800)));
        assert!(rows[0].revenue.is_none());
        assert_eq!(rows[1].report_date, date(2023, 9, 30));
        assert_eq!(rows[1].revenue, Some(dec!(1000)));
    }
}
