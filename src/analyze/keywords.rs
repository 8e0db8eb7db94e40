//! Keyword heuristics over the submitted idea text.
//!
//! Words are extracted with `\w+`, lower-cased and collapsed into a set, so
//! repeating a keyword does not raise the score.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

/// Terms hinting at a real market. "pain point" spans two tokens and never
/// matches a single word; it is kept so the list reads as documented.
pub const MARKET_KEYWORDS: &[&str] = &[
    "market",
    "demand",
    "growing",
    "trend",
    "opportunity",
    "need",
    "pain point",
];

pub const TECH_KEYWORDS: &[&str] = &["ai", "ml", "blockchain", "iot", "ar", "vr", "api"];

// Not used by any score yet.
#[allow(dead_code)]
pub const FUNCTIONAL_KEYWORDS: &[&str] = &[
    "solve",
    "automate",
    "reduce",
    "improve",
    "optimize",
    "streamline",
    "efficient",
    "productivity",
];

#[allow(dead_code)]
pub const SCALABILITY_KEYWORDS: &[&str] = &[
    "scale",
    "cloud",
    "multi-tenant",
    "kubernetes",
    "api",
    "microservice",
    "serverless",
    "distributed",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\w+").expect("word regex"));

/// Lexical features derived from the combined idea/plan/roadmap text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordFeatures {
    pub market_score: f64,
    pub tech_score: f64,
    pub market_keywords: BTreeSet<String>,
    pub tech_keywords: BTreeSet<String>,
}

/// Score `text` against the market and tech keyword sets.
pub fn analyze(text: &str) -> KeywordFeatures {
    let lowered = text.to_lowercase();
    let words: BTreeSet<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

    let market_keywords = intersect(&words, MARKET_KEYWORDS);
    let tech_keywords = intersect(&words, TECH_KEYWORDS);

    let market_score = (market_keywords.len() as f64 / 3.0).min(1.0);
    let tech_score = (tech_keywords.len() as f64 / 2.0).min(1.0);

    KeywordFeatures {
        market_score: round_to(market_score, 2),
        tech_score: round_to(tech_score, 2),
        market_keywords,
        tech_keywords,
    }
}

fn intersect(words: &BTreeSet<&str>, keywords: &[&str]) -> BTreeSet<String> {
    keywords
        .iter()
        .filter(|k| words.contains(**k))
        .map(|k| k.to_string())
        .collect()
}

/// Round the exact binary value to `places` decimals (ties to even), via the
/// correctly rounded formatter. Scaling first would round `0.7995` (stored just
/// below) up to `0.8`.
pub(crate) fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}
