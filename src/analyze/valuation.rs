//! Valuation: square-root scaling of the weighted score, converted from USD.

use serde::Serialize;

use super::aggregate::{
    ScoreVector, W_COMPETITIVE_EDGE, W_FEASIBILITY, W_MARKET_NEED, W_ORIGINALITY,
};
use super::keywords::round_to;

pub const BASE_CURRENCY: &str = "USD";
pub const BASE_VALUE: f64 = 1_000_000.0;
const SCALE: f64 = 100.0;

/// Static USD -> X rates. Unknown codes are treated as USD.
pub const FX_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 158.0),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Valuation {
    pub amount: f64,
    pub currency: String,
    pub base_currency: &'static str,
    pub fx_rate: f64,
}

/// Rate for `currency` (case-insensitive, no trimming); 1.0 when the code is unknown.
pub fn fx_rate(currency: &str) -> f64 {
    FX_RATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map(|(_, rate)| *rate)
        .unwrap_or(1.0)
}

/// Weighted score, computed here on its own and left unrounded.
pub fn weighted_score(scores: &ScoreVector) -> f64 {
    scores.originality * W_ORIGINALITY
        + scores.feasibility * W_FEASIBILITY
        + scores.market_need * W_MARKET_NEED
        + scores.competitive_edge * W_COMPETITIVE_EDGE
}

pub fn valuate(scores: &ScoreVector, currency: &str) -> Valuation {
    amount_for(weighted_score(scores), currency)
}

/// `BASE_VALUE * sqrt(weighted) * 100`, converted and rounded to cents.
pub fn amount_for(weighted: f64, currency: &str) -> Valuation {
    let rate = fx_rate(currency);
    let usd = BASE_VALUE * weighted.max(0.0).sqrt() * SCALE;
    Valuation {
        amount: round_to(usd * rate, 2),
        currency: currency.to_uppercase(),
        base_currency: BASE_CURRENCY,
        fx_rate: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(x: f64) -> ScoreVector {
        ScoreVector {
            originality: x,
            feasibility: x,
            market_need: x,
            competitive_edge: x,
            ..ScoreVector::default()
        }
    }

    #[test]
    fn zero_score_is_worth_nothing() {
        let v = valuate(&uniform(0.0), "USD");
        assert_eq!(v.amount, 0.0);
    }

    #[test]
    fn perfect_score_in_usd() {
        let v = valuate(&uniform(1.0), "USD");
        assert_eq!(v.amount, 100_000_000.00);
        assert_eq!(v.currency, "USD");
        assert_eq!(v.base_currency, "USD");
        assert_eq!(v.fx_rate, 1.0);
    }

    #[test]
    fn neutral_score_scales_by_square_root() {
        // sqrt(0.25) = 0.5
        let v = amount_for(0.25, "usd");
        assert_eq!(v.amount, 50_000_000.0);
        assert_eq!(v.currency, "USD");
    }

    #[test]
    fn known_currencies_convert() {
        assert_eq!(valuate(&uniform(1.0), "eur").amount, 92_000_000.0);
        assert_eq!(valuate(&uniform(1.0), "GBP").amount, 79_000_000.0);
        assert_eq!(valuate(&uniform(1.0), "JPY").amount, 15_800_000_000.0);
    }

    #[test]
    fn unknown_currency_falls_back_to_usd_rate() {
        let usd = valuate(&uniform(0.5), "USD");
        let xyz = valuate(&uniform(0.5), "xyz");
        assert_eq!(xyz.fx_rate, 1.0);
        assert_eq!(xyz.amount, usd.amount);
        assert_eq!(xyz.currency, "XYZ");
    }

    #[test]
    fn padded_code_is_not_recognised() {
        let v = valuate(&uniform(1.0), " eur ");
        assert_eq!(v.fx_rate, 1.0);
        assert_eq!(v.currency, " EUR ");
    }

    #[test]
    fn monotonic_in_weighted_score() {
        let mut prev = -1.0;
        for i in 0..=100 {
            let v = amount_for(i as f64 / 100.0, "USD");
            assert!(v.amount > prev);
            prev = v.amount;
        }
    }

    #[test]
    fn weighted_is_unrounded() {
        let s = uniform(0.3333);
        assert!((weighted_score(&s) - 0.3333).abs() < 1e-12);
    }
}
