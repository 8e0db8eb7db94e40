//! Score aggregation: external values win, heuristics and neutral defaults fill gaps.
//!
//! overall = 0.25*originality + 0.20*feasibility + 0.30*market_need + 0.25*competitive_edge
//! rounded to three decimals, then mapped to a letter grade.

use serde::Serialize;

use super::ai_adapter::ExternalScore;
use super::keywords::{round_to, KeywordFeatures};

/// Neutral value used when nothing authoritative is known.
pub const NEUTRAL_SCORE: f64 = 0.5;

pub const W_ORIGINALITY: f64 = 0.25;
pub const W_FEASIBILITY: f64 = 0.20;
pub const W_MARKET_NEED: f64 = 0.30;
pub const W_COMPETITIVE_EDGE: f64 = 0.25;

/// Normalized sub-scores, every field in [0,1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreVector {
    pub originality: f64,
    pub feasibility: f64,
    pub market_need: f64,
    pub competitive_edge: f64,
    pub market_score: f64,
    pub tech_score: f64,
}

impl Default for ScoreVector {
    fn default() -> Self {
        Self {
            originality: NEUTRAL_SCORE,
            feasibility: NEUTRAL_SCORE,
            market_need: NEUTRAL_SCORE,
            competitive_edge: NEUTRAL_SCORE,
            market_score: NEUTRAL_SCORE,
            tech_score: NEUTRAL_SCORE,
        }
    }
}

impl ScoreVector {
    /// Reported next to the composite; does not feed it.
    pub fn technical_viability(&self) -> f64 {
        (self.feasibility + self.tech_score) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Inclusive lower bounds: 0.9 A, 0.8 B, 0.7 C, 0.6 D.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Grade::A
        } else if score >= 0.8 {
            Grade::B
        } else if score >= 0.7 {
            Grade::C
        } else if score >= 0.6 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CompositeResult {
    pub overall: f64,
    pub grade: Grade,
}

/// Merge keyword features with the (optional) external verdict.
pub fn aggregate(
    features: &KeywordFeatures,
    external: Option<&ExternalScore>,
) -> (ScoreVector, CompositeResult) {
    let pick = |f: fn(&ExternalScore) -> Option<f64>| external.and_then(f).and_then(unit);

    let scores = ScoreVector {
        originality: pick(|e| e.originality).unwrap_or(NEUTRAL_SCORE),
        feasibility: pick(|e| e.feasibility).unwrap_or(NEUTRAL_SCORE),
        market_need: pick(|e| e.market_need)
            .or_else(|| unit(features.market_score))
            .unwrap_or(NEUTRAL_SCORE),
        competitive_edge: pick(|e| e.competitive_edge).unwrap_or(NEUTRAL_SCORE),
        market_score: unit(features.market_score).unwrap_or(NEUTRAL_SCORE),
        tech_score: unit(features.tech_score).unwrap_or(NEUTRAL_SCORE),
    };

    (scores, composite(&scores))
}

/// Weighted composite (3 decimals) and its grade.
pub fn composite(scores: &ScoreVector) -> CompositeResult {
    let raw = scores.originality * W_ORIGINALITY
        + scores.feasibility * W_FEASIBILITY
        + scores.market_need * W_MARKET_NEED
        + scores.competitive_edge * W_COMPETITIVE_EDGE;
    let overall = round_to(raw, 3).clamp(0.0, 1.0);
    CompositeResult {
        overall,
        grade: Grade::from_score(overall),
    }
}

/// Finite values clamped into [0,1]; NaN/inf are treated as missing.
fn unit(x: f64) -> Option<f64> {
    x.is_finite().then(|| x.clamp(0.0, 1.0))
}
