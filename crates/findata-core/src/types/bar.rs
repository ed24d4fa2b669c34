//! 일별 가격 바 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일별 OHLCV 가격 바.
///
/// 주식과 암호화폐 모두 공통으로 사용하는 레코드입니다.
/// API 응답에서 일부 값이 누락될 수 있으므로 각 필드는 Option입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// 심볼 (예: "AAPL", "BTC/USDT")
    pub symbol: String,
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Option<Decimal>,
    /// 고가
    pub high: Option<Decimal>,
    /// 저가
    pub low: Option<Decimal>,
    /// 종가
    pub close: Option<Decimal>,
    /// 거래량
    pub volume: Option<Decimal>,
}

impl DailyBar {
    /// 가격 정보가 전혀 없는 바인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.open.is_none() && self.high.is_none() && self.low.is_none() && self.close.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_is_empty() {
        let empty = DailyBar {
            symbol: "AAPL".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: None,
            high: None,
            low: None,
            close: None,
            volume: Some(dec!(100)),
        };
        assert!(empty.is_empty());

        let filled = DailyBar {
            close: Some(dec!(185.64)),
            ..empty
        };
        assert!(!filled.is_empty());
    }
}
