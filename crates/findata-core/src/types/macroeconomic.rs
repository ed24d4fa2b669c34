//! 거시경제 지표 타입 (FRED, World Bank).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// FRED 시계열 관측치 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicObservation {
    /// FRED 시리즈 ID (예: "GDP", "UNRATE", "CPIAUCSL")
    pub series_id: String,
    /// 관측일
    pub date: NaiveDate,
    /// 관측값
    pub value: f64,
}

/// World Bank 국가별 지표 관측치 한 건.
///
/// World Bank 데이터는 연 단위로만 제공됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorObservation {
    /// ISO3 국가 코드 (예: "USA", "KOR")
    pub country_code: String,
    /// 국가명
    pub country_name: String,
    /// 지표 코드 (예: "NY.GDP.MKTP.CD")
    pub indicator_code: String,
    /// 지표명
    pub indicator_name: String,
    /// 연도
    pub year: i32,
    /// 관측값
    pub value: f64,
}
