//! 기업 개요 및 재무제표 타입.
//!
//! AlphaVantage의 OVERVIEW / INCOME_STATEMENT / BALANCE_SHEET / CASH_FLOW
//! 응답과 FMP의 분기 재무 요약에 대응합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 재무제표 보고 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementPeriod {
    /// 연간 보고서
    Annual,
    /// 분기 보고서
    Quarterly,
}

impl StatementPeriod {
    /// DB 저장용 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl std::fmt::Display for StatementPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatementPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            _ => Err(format!("Unknown statement period: {}", s)),
        }
    }
}

/// 기업 개요 (AlphaVantage OVERVIEW).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// 종목 코드
    pub symbol: String,
    /// 회사명
    pub company_name: Option<String>,
    /// 자산 유형 (Common Stock, ETF 등)
    pub asset_type: Option<String>,
    /// 회사 설명
    pub description: Option<String>,
    /// 거래소
    pub exchange: Option<String>,
    /// 통화
    pub currency: Option<String>,
    /// 국가
    pub country: Option<String>,
    /// 섹터
    pub sector: Option<String>,
    /// 산업
    pub industry: Option<String>,
    /// 시가총액
    pub market_capitalization: Option<i64>,
    /// PER
    pub pe_ratio: Option<Decimal>,
    /// 배당수익률
    pub dividend_yield: Option<Decimal>,
}

/// 손익계산서 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub symbol: String,
    /// 회계 기준일
    pub fiscal_date_ending: NaiveDate,
    /// 보고 주기
    pub period: StatementPeriod,
    /// 보고 통화
    pub reported_currency: Option<String>,
    /// 매출총이익
    pub gross_profit: Option<Decimal>,
    /// 총매출
    pub total_revenue: Option<Decimal>,
    /// 매출원가
    pub cost_of_revenue: Option<Decimal>,
    /// 영업이익
    pub operating_income: Option<Decimal>,
    /// 영업비용
    pub operating_expenses: Option<Decimal>,
    /// 판매관리비
    pub selling_general_and_administrative: Option<Decimal>,
    /// 연구개발비
    pub research_and_development: Option<Decimal>,
    /// 감가상각비
    pub depreciation_and_amortization: Option<Decimal>,
    /// 세전이익
    pub income_before_tax: Option<Decimal>,
    /// 순이익
    pub net_income: Option<Decimal>,
    /// EBITDA
    pub ebitda: Option<Decimal>,
}

/// 재무상태표 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub symbol: String,
    pub fiscal_date_ending: NaiveDate,
    pub period: StatementPeriod,
    pub reported_currency: Option<String>,
    /// 총자산
    pub total_assets: Option<Decimal>,
    /// 유동자산
    pub current_assets: Option<Decimal>,
    /// 현금및현금성자산
    pub cash_and_cash_equivalents: Option<Decimal>,
    /// 재고자산
    pub inventory: Option<Decimal>,
    /// 유형자산
    pub property_plant_and_equipment: Option<Decimal>,
    /// 무형자산
    pub intangible_assets: Option<Decimal>,
    /// 총부채
    pub total_liabilities: Option<Decimal>,
    /// 유동부채
    pub current_liabilities: Option<Decimal>,
    /// 단기차입금
    pub short_term_debt: Option<Decimal>,
    /// 장기차입금
    pub long_term_debt: Option<Decimal>,
    /// 자기자본
    pub total_shareholder_equity: Option<Decimal>,
    /// 이익잉여금
    pub retained_earnings: Option<Decimal>,
    /// 보통주자본금
    pub common_stock: Option<Decimal>,
}

/// 현금흐름표 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub symbol: String,
    pub fiscal_date_ending: NaiveDate,
    pub period: StatementPeriod,
    pub reported_currency: Option<String>,
    /// 영업활동 현금흐름
    pub operating_cashflow: Option<Decimal>,
    /// 자본적지출
    pub capital_expenditures: Option<Decimal>,
    /// 영업부채 변동
    pub change_in_operating_liabilities: Option<Decimal>,
    /// 영업자산 변동
    pub change_in_operating_assets: Option<Decimal>,
    /// 감가상각비
    pub depreciation_depletion_and_amortization: Option<Decimal>,
    /// 투자활동 현금흐름
    pub investments_cashflow: Option<Decimal>,
    /// 배당금 지급
    pub dividends_paid: Option<Decimal>,
    /// 순차입금
    pub net_borrowings: Option<Decimal>,
}

/// FMP 분기 재무 요약 (손익/재무상태/현금흐름 결합).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub symbol: String,
    /// 보고일
    pub report_date: NaiveDate,
    /// 매출
    pub revenue: Option<Decimal>,
    /// 매출총이익
    pub gross_profit: Option<Decimal>,
    /// 영업이익
    pub operating_income: Option<Decimal>,
    /// 순이익
    pub net_income: Option<Decimal>,
    /// 총자산
    pub total_assets: Option<Decimal>,
    /// 총부채
    pub total_liabilities: Option<Decimal>,
    /// 자기자본
    pub total_equity: Option<Decimal>,
    /// 영업활동 현금흐름
    pub cash_from_operations: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_period_roundtrip() {
        assert_eq!(StatementPeriod::Annual.as_str(), "annual");
        assert_eq!(
            "quarterly".parse::<StatementPeriod>().unwrap(),
            StatementPeriod::Quarterly
        );
        // FMP는 "quarter"를 사용
        assert_eq!(
            "quarter".parse::<StatementPeriod>().unwrap(),
            StatementPeriod::Quarterly
        );
        assert!("monthly".parse::<StatementPeriod>().is_err());
    }
}
