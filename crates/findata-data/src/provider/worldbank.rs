//! World Bank Open Data API 클라이언트.
//!
//! 국가 목록과 국가별 지표 시계열을 조회합니다. World Bank API의
//! 응답은 `[메타데이터, 데이터 배열]` 형태의 2원소 배열이며,
//! 메타데이터의 `pages` 필드를 따라 페이지를 순회합니다.
//!
//! 집계 그룹(예: "World", "Euro area")은 region/incomeLevel id가
//! `"NA"`로 내려오므로 국가 목록에서 제외합니다.

use findata_core::IndicatorObservation;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{DataError, Result};

/// World Bank API 클라이언트.
#[derive(Clone)]
pub struct WorldBankClient {
    client: reqwest::Client,
    base_url: String,
    /// 일시적 요청 실패 시 재시도 횟수
    retries: u32,
    /// 재시도 간 대기 시간
    retry_delay: Duration,
}

/// 페이지 메타데이터.
#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(default)]
    pages: u32,
}

/// 국가 목록 항목.
#[derive(Debug, Deserialize)]
struct RawCountry {
    id: String,
    name: String,
    region: RegionRef,
    #[serde(rename = "incomeLevel")]
    income_level: RegionRef,
}

#[derive(Debug, Deserialize)]
struct RegionRef {
    id: String,
}

/// 지표 데이터 행.
#[derive(Debug, Deserialize)]
struct RawIndicatorRow {
    indicator: IdValue,
    country: IdValue,
    #[serde(rename = "countryiso3code", default)]
    country_iso3: String,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IdValue {
    id: String,
    value: String,
}

impl Default for WorldBankClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBankClient {
    /// 새로운 World Bank 클라이언트 생성. API 키는 필요 없습니다.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: "https://api.worldbank.org/v2".to_string(),
            retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 재시도 정책 설정.
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    /// 전체 국가 목록 조회 (집계 그룹 제외).
    ///
    /// # Returns
    /// ISO3 국가 코드 → 국가명 맵
    pub async fn fetch_countries(&self) -> Result<HashMap<String, String>> {
        let url = format!("{}/country?format=json&per_page=500", self.base_url);
        let data = self.get_with_retry(&url).await?;

        let rows = extract_rows(&data)?;
        let raw_countries: Vec<RawCountry> = serde_json::from_value(rows)?;
        let countries = filter_real_countries(raw_countries);

        if countries.is_empty() {
            return Err(DataError::FetchError(
                "World Bank 국가 목록이 비어 있습니다".to_string(),
            ));
        }

        tracing::info!(count = countries.len(), "World Bank 국가 목록 조회 완료");
        Ok(countries)
    }

    /// 특정 국가-지표 시계열 조회 (전체 페이지 순회).
    ///
    /// # Arguments
    /// * `country_code` - ISO2/ISO3 국가 코드
    /// * `indicator_code` - 지표 코드 (예: "NY.GDP.MKTP.CD")
    /// * `start_year` / `end_year` - 조회 연도 범위
    pub async fn fetch_indicator(
        &self,
        country_code: &str,
        indicator_code: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<IndicatorObservation>> {
        let base_url = format!(
            "{}/country/{}/indicator/{}?format=json&date={}:{}&per_page=1000",
            self.base_url, country_code, indicator_code, start_year, end_year
        );

        let mut observations = Vec::new();
        let mut page = 1u32;
        let mut total_pages = 1u32;

        while page <= total_pages {
            let url = format!("{}&page={}", base_url, page);
            let data = self.get_with_retry(&url).await?;

            let meta: PageMeta = match data.get(0) {
                Some(meta) => serde_json::from_value(meta.clone())?,
                None => break,
            };
            total_pages = meta.pages;

            let rows = match extract_rows(&data) {
                Ok(rows) => rows,
                // 해당 기간에 데이터가 없으면 두 번째 원소가 null
                Err(_) => break,
            };
            let raw_rows: Vec<RawIndicatorRow> = serde_json::from_value(rows)?;

            observations.extend(parse_indicator_rows(raw_rows));
            page += 1;

            // 페이지 간 짧은 딜레이
            if page <= total_pages {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }

        tracing::debug!(
            country = country_code,
            indicator = indicator_code,
            count = observations.len(),
            "지표 조회 완료"
        );
        Ok(observations)
    }

    /// GET 요청을 재시도 정책과 함께 실행.
    ///
    /// 요청/전송 오류는 재시도하고, JSON 디코딩 오류는 재시도해도
    /// 해결되지 않으므로 즉시 반환합니다.
    async fn get_with_retry(&self, url: &str) -> Result<Value> {
        let mut last_error = None;

        for attempt in 1..=self.retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        let status = response.status();
                        tracing::warn!(
                            url = url,
                            status = %status,
                            attempt = attempt,
                            "World Bank API 요청 실패"
                        );
                        last_error = Some(DataError::FetchError(format!(
                            "World Bank API [{}]: {}",
                            status, url
                        )));
                    } else {
                        return response
                            .json::<Value>()
                            .await
                            .map_err(|e| DataError::ParseError(e.to_string()));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        url = url,
                        attempt = attempt,
                        error = %e,
                        "World Bank API 요청 오류"
                    );
                    last_error = Some(e.into());
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DataError::FetchError(format!("재시도 모두 소진: {}", url))
        }))
    }
}

/// 2원소 배열 응답에서 데이터 배열을 추출.
fn extract_rows(data: &Value) -> Result<Value> {
    match data.get(1) {
        Some(rows) if !rows.is_null() => Ok(rows.clone()),
        _ => Err(DataError::InvalidData(
            "World Bank 응답에 데이터 배열이 없습니다".to_string(),
        )),
    }
}

/// 집계 그룹을 제외한 실제 국가만 남깁니다.
fn filter_real_countries(raw_countries: Vec<RawCountry>) -> HashMap<String, String> {
    raw_countries
        .into_iter()
        .filter(|c| c.id != "all" && c.region.id != "NA" && c.income_level.id != "NA")
        .map(|c| (c.id, c.name))
        .collect()
}

/// 지표 행을 도메인 타입으로 변환. null 값과 연도 파싱 실패는 건너뜁니다.
fn parse_indicator_rows(raw_rows: Vec<RawIndicatorRow>) -> Vec<IndicatorObservation> {
    raw_rows
        .into_iter()
        .filter_map(|row| {
            let value = row.value?;
            let year: i32 = row.date.parse().ok()?;
            let country_code = if row.country_iso3.is_empty() {
                row.country.id
            } else {
                row.country_iso3
            };
            Some(IndicatorObservation {
                country_code,
                country_name: row.country.value,
                indicator_code: row.indicator.id,
                indicator_name: row.indicator.value,
                year,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_real_countries_excludes_aggregates() {
        let json = r#"[
            {"id": "USA", "name": "United States", "region": {"id": "NAC"}, "incomeLevel": {"id": "HIC"}},
            {"id": "WLD", "name": "World", "region": {"id": "NA"}, "incomeLevel": {"id": "NA"}},
            {"id": "KOR", "name": "Korea, Rep.", "region": {"id": "EAS"}, "incomeLevel": {"id": "HIC"}}
        ]"#;
        let raw: Vec<RawCountry> = serde_json::from_str(json).unwrap();

        let countries = filter_real_countries(raw);

        assert_eq!(countries.len(), 2);
        assert_eq!(countries.get("USA").unwrap(), "United States");
        assert!(!countries.contains_key("WLD"));
    }

    #[test]
    fn test_parse_indicator_rows_skips_null_values() {
        let json = r#"[
            {
                "indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                "country": {"id": "US", "value": "United States"},
                "countryiso3code": "USA",
                "date": "2022",
                "value": 25462700000000.0
            },
            {
                "indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                "country": {"id": "US", "value": "United States"},
                "countryiso3code": "USA",
                "date": "2023",
                "value": null
            }
        ]"#;
        let raw: Vec<RawIndicatorRow> = serde_json::from_str(json).unwrap();

        let observations = parse_indicator_rows(raw);

        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].country_code, "USA");
        assert_eq!(observations[0].year, 2022);
        assert_eq!(observations[0].indicator_code, "NY.GDP.MKTP.CD");
    }

    #[test]
    fn test_extract_rows_rejects_null_payload() {
        let data: Value = serde_json::json!([{"page": 1, "pages": 1}, null]);
        assert!(extract_rows(&data).is_err());

        let data: Value = serde_json::json!([{"page": 1, "pages": 1}, [{"date": "2020"}]]);
        assert!(extract_rows(&data).is_ok());
    }
}
