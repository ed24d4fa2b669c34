//! Black-Scholes-Merton 옵션 가격 모델.
//!
//! 연속 배당수익률을 반영한 유럽형 옵션의 이론가와 그릭스를
//! 닫힌 형태로 계산합니다. 만기가 지난 옵션(`t <= 0`)은 내재가치를
//! 반환합니다.

use findata_core::{FindataError, FindataResult};
use serde::{Deserialize, Serialize};

/// 옵션 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// 콜 옵션
    Call,
    /// 풋 옵션
    Put,
}

impl std::str::FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            _ => Err(format!("Unknown option type: {}", s)),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => f.write_str("call"),
            Self::Put => f.write_str("put"),
        }
    }
}

/// 옵션 이론가와 그릭스.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptionGreeks {
    /// 이론가
    pub price: f64,
    /// 델타 (기초자산 가격 민감도)
    pub delta: f64,
    /// 감마 (델타의 기초자산 가격 민감도)
    pub gamma: f64,
    /// 베가 (변동성 1.0 변화당 가격 민감도)
    pub vega: f64,
    /// 세타 (연 단위 시간 경과 민감도)
    pub theta: f64,
    /// 로 (무위험 이자율 민감도)
    pub rho: f64,
}

/// 옵션 이론가와 그릭스를 계산합니다.
///
/// # Arguments
/// * `s` - 현재 기초자산 가격
/// * `k` - 행사가
/// * `t` - 만기까지의 시간 (연 단위)
/// * `r` - 무위험 이자율 (연 단위)
/// * `sigma` - 변동성 (연 단위)
/// * `q` - 연속 배당수익률 (연 단위)
/// * `option_type` - 콜/풋
///
/// # Errors
/// 입력값이 유한하지 않거나 음수이면 [`FindataError::InvalidInput`]을
/// 반환합니다. `t > 0`인데 `sigma == 0`이거나 `s`/`k`가 0이면 역시
/// 거부합니다.
pub fn price_greeks(
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    q: f64,
    option_type: OptionType,
) -> FindataResult<OptionGreeks> {
    for (name, value) in [
        ("stock_price", s),
        ("strike_price", k),
        ("time_to_maturity", t),
        ("risk_free_rate", r),
        ("volatility", sigma),
        ("dividend_yield", q),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(FindataError::InvalidInput(format!(
                "{}은(는) 0 이상의 유한한 숫자여야 합니다: {}",
                name, value
            )));
        }
    }

    // 만기 도래: 내재가치만 남음
    if t <= 0.0 {
        return Ok(expired_greeks(s, k, option_type));
    }

    if sigma == 0.0 {
        return Err(FindataError::InvalidInput(
            "만기 전 옵션의 변동성은 0보다 커야 합니다".to_string(),
        ));
    }
    if s == 0.0 || k == 0.0 {
        return Err(FindataError::InvalidInput(
            "기초자산 가격과 행사가는 0보다 커야 합니다".to_string(),
        ));
    }

    let sigma_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    let d2 = d1 - sigma_sqrt_t;

    let discount_r = (-r * t).exp();
    let discount_q = (-q * t).exp();
    let nd1 = norm_cdf(d1);
    let nd2 = norm_cdf(d2);
    let pdf_d1 = norm_pdf(d1);

    // 콜/풋 공통 그릭스
    let gamma = discount_q * pdf_d1 / (s * sigma_sqrt_t);
    let vega = s * discount_q * pdf_d1 * t.sqrt();

    let greeks = match option_type {
        OptionType::Call => {
            let price = s * discount_q * nd1 - k * discount_r * nd2;
            let delta = discount_q * nd1;
            let theta = -s * discount_q * pdf_d1 * sigma / (2.0 * t.sqrt())
                - r * k * discount_r * nd2
                + q * s * discount_q * nd1;
            let rho = k * t * discount_r * nd2;
            OptionGreeks {
                price,
                delta,
                gamma,
                vega,
                theta,
                rho,
            }
        }
        OptionType::Put => {
            let n_minus_d1 = norm_cdf(-d1);
            let n_minus_d2 = norm_cdf(-d2);
            let price = k * discount_r * n_minus_d2 - s * discount_q * n_minus_d1;
            let delta = discount_q * (nd1 - 1.0);
            let theta = -s * discount_q * pdf_d1 * sigma / (2.0 * t.sqrt())
                + r * k * discount_r * n_minus_d2
                - q * s * discount_q * n_minus_d1;
            let rho = -k * t * discount_r * n_minus_d2;
            OptionGreeks {
                price,
                delta,
                gamma,
                vega,
                theta,
                rho,
            }
        }
    };

    Ok(greeks)
}

/// 만기 도래 옵션: 내재가치와 퇴화된 그릭스.
fn expired_greeks(s: f64, k: f64, option_type: OptionType) -> OptionGreeks {
    let (price, delta) = match option_type {
        OptionType::Call => {
            let price = (s - k).max(0.0);
            let delta = if s > k { 1.0 } else { 0.0 };
            (price, delta)
        }
        OptionType::Put => {
            let price = (k - s).max(0.0);
            let delta = if s < k { -1.0 } else { 0.0 };
            (price, delta)
        }
    };

    OptionGreeks {
        price,
        delta,
        gamma: 0.0,
        vega: 0.0,
        theta: 0.0,
        rho: 0.0,
    }
}

/// 표준정규분포 누적분포함수.
fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// 표준정규분포 확률밀도함수.
fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// 오차함수 근사 (Abramowitz-Stegun 7.1.26, 최대 오차 1.5e-7).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-3;

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-3);
    }

    #[test]
    fn test_atm_call_reference_price() {
        // 교과서 기준값: S=100, K=100, T=1, r=5%, sigma=20%, q=0 → 10.4506
        let greeks = price_greeks(100.0, 100.0, 1.0, 0.05, 0.2, 0.0, OptionType::Call).unwrap();

        assert!((greeks.price - 10.4506).abs() < TOLERANCE);
        assert!(greeks.delta > 0.0 && greeks.delta < 1.0);
        assert!(greeks.gamma > 0.0);
        assert!(greeks.vega > 0.0);
        assert!(greeks.theta < 0.0);
        assert!(greeks.rho > 0.0);
    }

    #[test]
    fn test_put_call_parity_with_dividends() {
        // call - put = S e^{-qT} - K e^{-rT}
        let (s, k, t, r, sigma, q) = (100.0, 100.0, 1.0, 0.05, 0.2, 0.02);
        let call = price_greeks(s, k, t, r, sigma, q, OptionType::Call).unwrap();
        let put = price_greeks(s, k, t, r, sigma, q, OptionType::Put).unwrap();

        let parity = s * (-q * t).exp() - k * (-r * t).exp();
        assert!((call.price - put.price - parity).abs() < TOLERANCE);

        // 동일 행사가의 콜/풋은 감마와 베가가 같음
        assert!((call.gamma - put.gamma).abs() < 1e-9);
        assert!((call.vega - put.vega).abs() < 1e-9);
    }

    #[test]
    fn test_dividend_yield_lowers_call_price() {
        let without_q = price_greeks(100.0, 100.0, 1.0, 0.05, 0.2, 0.0, OptionType::Call).unwrap();
        let with_q = price_greeks(100.0, 100.0, 1.0, 0.05, 0.2, 0.02, OptionType::Call).unwrap();

        assert!(with_q.price < without_q.price);
    }

    #[test]
    fn test_expired_option_intrinsic_value() {
        let itm_call = price_greeks(110.0, 100.0, 0.0, 0.05, 0.2, 0.0, OptionType::Call).unwrap();
        assert_eq!(itm_call.price, 10.0);
        assert_eq!(itm_call.delta, 1.0);
        assert_eq!(itm_call.gamma, 0.0);

        let otm_call = price_greeks(90.0, 100.0, 0.0, 0.05, 0.2, 0.0, OptionType::Call).unwrap();
        assert_eq!(otm_call.price, 0.0);
        assert_eq!(otm_call.delta, 0.0);

        let itm_put = price_greeks(90.0, 100.0, 0.0, 0.05, 0.2, 0.0, OptionType::Put).unwrap();
        assert_eq!(itm_put.price, 10.0);
        assert_eq!(itm_put.delta, -1.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(price_greeks(-1.0, 100.0, 1.0, 0.05, 0.2, 0.0, OptionType::Call).is_err());
        assert!(price_greeks(100.0, 100.0, 1.0, f64::NAN, 0.2, 0.0, OptionType::Call).is_err());
        // 만기 전인데 변동성 0
        assert!(price_greeks(100.0, 100.0, 1.0, 0.05, 0.0, 0.0, OptionType::Call).is_err());
        // 기초자산 가격 0
        assert!(price_greeks(0.0, 100.0, 1.0, 0.05, 0.2, 0.0, OptionType::Call).is_err());
    }

    #[test]
    fn test_option_type_from_str() {
        assert_eq!("call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("PUT".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());
    }
}
