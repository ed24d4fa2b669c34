//! FRED (Federal Reserve Economic Data) API 클라이언트.
//!
//! 세인트루이스 연준의 `series/observations` JSON endpoint에서
//! 경제지표 시계열을 조회합니다. 누락 관측치는 값이 `"."`으로
//! 내려오며 건너뜁니다.

use chrono::NaiveDate;
use findata_core::EconomicObservation;
use serde::Deserialize;

use crate::error::{DataError, Result};

/// FRED API 클라이언트.
#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// FRED 관측치 원본.
#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// FRED 응답 래퍼.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

impl FredClient {
    /// 새로운 FRED 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: "https://api.stlouisfed.org".to_string(),
        }
    }

    /// 환경변수 `FRED_API_KEY`에서 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("FRED_API_KEY").ok().map(Self::new)
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 시리즈 관측치 조회.
    ///
    /// # Arguments
    /// * `series_id` - FRED 시리즈 ID (예: "GDP", "UNRATE")
    /// * `start_date` - 조회 시작일 (None이면 시리즈 전체)
    /// * `end_date` - 조회 종료일 (None이면 오늘까지)
    pub async fn fetch_series_observations(
        &self,
        series_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<EconomicObservation>> {
        let url = format!("{}/fred/series/observations", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        if let Some(start) = start_date {
            query.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = end_date {
            query.push(("observation_end", end.format("%Y-%m-%d").to_string()));
        }

        tracing::debug!(series_id = series_id, "FRED API 요청");

        let response = self.client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "FRED {} [{}]: {}",
                series_id,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let data: ObservationsResponse = response.json().await?;
        let observations = parse_observations(series_id, data.observations);

        if observations.is_empty() {
            tracing::warn!(series_id = series_id, "FRED 관측치 없음");
        } else {
            tracing::info!(
                series_id = series_id,
                count = observations.len(),
                "FRED 시리즈 조회 완료"
            );
        }

        Ok(observations)
    }
}

/// 원본 관측치를 도메인 타입으로 변환. "." 값(누락)은 건너뜁니다.
fn parse_observations(
    series_id: &str,
    raw_observations: Vec<RawObservation>,
) -> Vec<EconomicObservation> {
    raw_observations
        .into_iter()
        .filter_map(|raw| {
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").ok()?;
            let value: f64 = raw.value.parse().ok()?;
            Some(EconomicObservation {
                series_id: series_id.to_string(),
                date,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observations_skips_missing() {
        let json = r#"{
            "observations": [
                {"realtime_start": "2024-01-01", "date": "2023-10-01", "value": "27610.128"},
                {"realtime_start": "2024-01-01", "date": "2023-11-01", "value": "."},
                {"realtime_start": "2024-01-01", "date": "2024-01-01", "value": "27956.998"}
            ]
        }"#;

        let parsed: ObservationsResponse = serde_json::from_str(json).unwrap();
        let observations = parse_observations("GDP", parsed.observations);

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].series_id, "GDP");
        assert_eq!(observations[0].value, 27610.128);
        assert_eq!(
            observations[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_observations_empty() {
        let observations = parse_observations("UNRATE", Vec::new());
        assert!(observations.is_empty());
    }
}
