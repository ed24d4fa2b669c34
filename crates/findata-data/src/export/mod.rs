//! 수집 데이터 파일 내보내기.

pub mod csv;

pub use csv::CsvExporter;
