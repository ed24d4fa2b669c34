//! CSV 내보내기.
//!
//! DB 저장과 병행하여 수집 데이터를 거래소/산업 폴더 구조의 CSV
//! 파일로 내보냅니다:
//!
//! ```text
//! <base_dir>/
//!   alphavantage/
//!     <Exchange>/<Industry>/ohlcv/<symbol>_ohlcv.csv
//!     <Exchange>/<Industry>/income/<symbol>_income.csv
//!     info/<symbol>_company_info.csv
//!   fmp/<symbol>_financials.csv
//!   binance/<PAIR>_crypto_ohlcv.csv
//!   fred/<series_id>.csv
//! ```
//!
//! 거래소/산업 정보가 없으면 `Unknown_Exchange` / `Unknown_Industry`
//! 폴더를 사용합니다.

use findata_core::{CompanyProfile, DailyBar, EconomicObservation, FinancialSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

/// CSV 내보내기 담당.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    base_dir: PathBuf,
}

impl CsvExporter {
    /// 새로운 내보내기 객체 생성.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 주식 일별 OHLCV 내보내기.
    pub fn export_stock_bars(
        &self,
        exchange: Option<&str>,
        industry: Option<&str>,
        symbol: &str,
        bars: &[DailyBar],
    ) -> Result<PathBuf> {
        let dir = self
            .base_dir
            .join("alphavantage")
            .join(folder_component(exchange, "Unknown_Exchange"))
            .join(folder_component(industry, "Unknown_Industry"))
            .join("ohlcv");
        let path = dir.join(format!("{}_ohlcv.csv", sanitize(symbol)));

        write_csv(&path, bars)?;
        info!(symbol = symbol, path = %path.display(), rows = bars.len(), "OHLCV CSV 저장");
        Ok(path)
    }

    /// 재무제표 내보내기 (손익/재무상태/현금흐름 공용).
    ///
    /// # Arguments
    /// * `kind` - 폴더/파일명에 쓰일 종류 ("income", "balance", "cashflow")
    pub fn export_statements<T: Serialize>(
        &self,
        exchange: Option<&str>,
        industry: Option<&str>,
        symbol: &str,
        kind: &str,
        rows: &[T],
    ) -> Result<PathBuf> {
        let dir = self
            .base_dir
            .join("alphavantage")
            .join(folder_component(exchange, "Unknown_Exchange"))
            .join(folder_component(industry, "Unknown_Industry"))
            .join(kind);
        let path = dir.join(format!("{}_{}.csv", sanitize(symbol), kind));

        write_csv(&path, rows)?;
        info!(symbol = symbol, kind = kind, path = %path.display(), "재무제표 CSV 저장");
        Ok(path)
    }

    /// 기업 개요 내보내기.
    pub fn export_company_profile(&self, profile: &CompanyProfile) -> Result<PathBuf> {
        let dir = self.base_dir.join("alphavantage").join("info");
        let path = dir.join(format!("{}_company_info.csv", sanitize(&profile.symbol)));

        write_csv(&path, std::slice::from_ref(profile))?;
        info!(symbol = %profile.symbol, path = %path.display(), "기업 개요 CSV 저장");
        Ok(path)
    }

    /// FMP 분기 재무 요약 내보내기.
    pub fn export_financial_summaries(
        &self,
        symbol: &str,
        rows: &[FinancialSummary],
    ) -> Result<PathBuf> {
        let dir = self.base_dir.join("fmp");
        let path = dir.join(format!("{}_financials.csv", sanitize(symbol)));

        write_csv(&path, rows)?;
        info!(symbol = symbol, path = %path.display(), rows = rows.len(), "FMP 재무 CSV 저장");
        Ok(path)
    }

    /// 암호화폐 일봉 내보내기. 거래쌍의 '/'는 파일명에서 '_'로 바꿉니다.
    pub fn export_crypto_bars(&self, pair: &str, bars: &[DailyBar]) -> Result<PathBuf> {
        let dir = self.base_dir.join("binance");
        let path = dir.join(format!("{}_crypto_ohlcv.csv", sanitize(pair)));

        write_csv(&path, bars)?;
        info!(pair = pair, path = %path.display(), rows = bars.len(), "암호화폐 CSV 저장");
        Ok(path)
    }

    /// FRED 시리즈 내보내기.
    pub fn export_fred_series(
        &self,
        series_id: &str,
        observations: &[EconomicObservation],
    ) -> Result<PathBuf> {
        let dir = self.base_dir.join("fred");
        let path = dir.join(format!("{}.csv", sanitize(series_id)));

        write_csv(&path, observations)?;
        info!(
            series_id = series_id,
            path = %path.display(),
            rows = observations.len(),
            "FRED CSV 저장"
        );
        Ok(path)
    }
}

/// 디렉토리를 만들고 행들을 CSV로 직렬화해서 기록.
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| crate::error::DataError::ExportError(e.to_string()))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| crate::error::DataError::ExportError(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| crate::error::DataError::ExportError(e.to_string()))?;

    Ok(())
}

/// 폴더 구성요소 결정. 값이 없거나 비어 있으면 기본값 사용.
fn folder_component(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => sanitize(v),
        _ => default.to_string(),
    }
}

/// 경로에 쓸 수 없는 문자 치환.
fn sanitize(s: &str) -> String {
    s.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_bar(date: NaiveDate) -> DailyBar {
        DailyBar {
            symbol: "AAPL".to_string(),
            date,
            open: Some(dec!(185.0)),
            high: Some(dec!(187.5)),
            low: Some(dec!(184.2)),
            close: Some(dec!(186.9)),
            volume: Some(dec!(52000000)),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("BTC/USDT"), "BTC_USDT");
        assert_eq!(sanitize("A\\B"), "A_B");
        assert_eq!(sanitize("AAPL"), "AAPL");
    }

    #[test]
    fn test_folder_component_defaults() {
        assert_eq!(folder_component(Some("NASDAQ"), "Unknown_Exchange"), "NASDAQ");
        assert_eq!(folder_component(Some("  "), "Unknown_Exchange"), "Unknown_Exchange");
        assert_eq!(folder_component(None, "Unknown_Exchange"), "Unknown_Exchange");
        // 폴더명에 들어가는 특수문자도 치환
        assert_eq!(
            folder_component(Some("Software/Services"), "Unknown_Industry"),
            "Software_Services"
        );
    }

    #[test]
    fn test_export_stock_bars_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());

        let bars = vec![
            sample_bar(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            sample_bar(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
        ];

        let path = exporter
            .export_stock_bars(Some("NASDAQ"), Some("Consumer Electronics"), "AAPL", &bars)
            .unwrap();

        assert!(path.ends_with(
            Path::new("alphavantage/NASDAQ/Consumer Electronics/ohlcv/AAPL_ohlcv.csv")
        ));

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "symbol,date,open,high,low,close,volume"
        );
        assert!(lines.next().unwrap().starts_with("AAPL,2024-01-02,"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_export_crypto_bars_replaces_slash() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());

        let mut bar = sample_bar(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        bar.symbol = "BTC/USDT".to_string();

        let path = exporter.export_crypto_bars("BTC/USDT", &[bar]).unwrap();

        assert!(path.ends_with(Path::new("binance/BTC_USDT_crypto_ohlcv.csv")));
        assert!(path.exists());
    }

    #[test]
    fn test_export_fred_series() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());

        let observations = vec![EconomicObservation {
            series_id: "GDP".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            value: 27610.128,
        }];

        let path = exporter.export_fred_series("GDP", &observations).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert_eq!(content.lines().next().unwrap(), "series_id,date,value");
        assert!(content.contains("GDP,2023-10-01,27610.128"));
    }
}
