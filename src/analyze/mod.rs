// src/analyze/mod.rs
//! Idea scoring pipeline: keywords -> external scorer -> aggregate -> valuation.

pub mod aggregate;
pub mod ai_adapter;
pub mod cache;
pub mod keywords;
pub mod valuation;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

pub use crate::analyze::aggregate::{aggregate, CompositeResult, Grade, ScoreVector};
pub use crate::analyze::ai_adapter::{DynScorer, ExternalScore, IdeaScorer};
pub use crate::analyze::keywords::{analyze as analyze_keywords, KeywordFeatures};
pub use crate::analyze::valuation::{valuate, Valuation};

pub const DEFAULT_CURRENCY: &str = "USD";

const DEFAULT_RISKS: [&str; 3] = [
    "Limited market validation",
    "High competition in this space",
    "Technical complexity may be underestimated",
];

const DEFAULT_STRENGTHS: [&str; 3] = [
    "Solves a clear problem",
    "Uses modern technology stack",
    "Addresses a growing market need",
];

const DEFAULT_SUMMARY: &str = "This idea shows potential but requires further validation. \
Consider conducting market research and building an MVP to test assumptions.";

const DEFAULT_EXPLANATION: &str = "Evaluation completed successfully";

const RECOMMENDATIONS: [&str; 5] = [
    "Conduct user interviews to validate the problem",
    "Build a minimum viable product (MVP) to test core assumptions",
    "Research competitors and identify unique differentiators",
    "Develop a go-to-market strategy",
    "Consider potential partnerships or integrations",
];

fn default_currency() -> Option<String> {
    Some(DEFAULT_CURRENCY.to_string())
}

/// Request body of `POST /evaluate/idea`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub idea: String,
    pub plan: String,
    pub roadmap: String,
    #[serde(default = "default_currency")]
    pub currency: Option<String>,
}

impl EvaluationInput {
    pub fn new(idea: &str, plan: &str, roadmap: &str) -> Self {
        Self {
            idea: idea.to_string(),
            plan: plan.to_string(),
            roadmap: roadmap.to_string(),
            currency: default_currency(),
        }
    }

    /// Requested currency; `null` or blank means USD.
    pub fn currency(&self) -> &str {
        self.currency
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    fn combined_text(&self) -> String {
        format!("{} {} {}", self.idea, self.plan, self.roadmap)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub overall: f64,
    pub originality: f64,
    pub feasibility: f64,
    pub market_need: f64,
    pub competitive_edge: f64,
    pub market_potential: f64,
    pub technical_viability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketKeywords {
    pub market_terms: BTreeSet<String>,
    pub tech_terms: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub keywords: MarketKeywords,
    pub score: f64,
}

/// Response body of `POST /evaluate/idea`.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaEvaluationResponse {
    pub scores: ScoreBreakdown,
    pub grade: Grade,
    pub valuation: Valuation,
    pub market_analysis: MarketAnalysis,
    pub risks: Vec<String>,
    pub strengths: Vec<String>,
    pub evaluation_summary: String,
    pub recommendations: Vec<String>,
    pub explanation: String,
}

/// Run the whole pipeline for one request. Never fails: scorer problems degrade to
/// heuristic and neutral values.
pub async fn evaluate_idea(
    input: &EvaluationInput,
    scorer: &dyn IdeaScorer,
) -> IdeaEvaluationResponse {
    let started = Instant::now();

    // (1) Keyword heuristics
    let features = analyze_keywords(&input.combined_text());

    // (2) External scorer (disabled scorer answers None immediately)
    let external = scorer.score(&input.idea, &input.plan, &input.roadmap).await;

    // (3) Aggregate + grade
    let (scores, composite) = aggregate(&features, external.as_ref());
    let used_external = external.is_some();

    // (4) Valuation
    let valuation = valuate(&scores, input.currency());

    let response = assemble(&features, external, &scores, composite, valuation);

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::counter!("idea_evaluations_total").increment(1);
    metrics::histogram!("idea_evaluation_duration_ms").record(elapsed_ms);
    info!(
        provider = scorer.provider_name(),
        external = used_external,
        overall = composite.overall,
        grade = %composite.grade,
        elapsed_ms,
        "idea evaluated"
    );

    response
}

fn assemble(
    features: &KeywordFeatures,
    external: Option<ExternalScore>,
    scores: &ScoreVector,
    composite: CompositeResult,
    valuation: Valuation,
) -> IdeaEvaluationResponse {
    let external = external.unwrap_or_default();
    let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    IdeaEvaluationResponse {
        scores: ScoreBreakdown {
            overall: composite.overall,
            originality: scores.originality,
            feasibility: scores.feasibility,
            market_need: scores.market_need,
            competitive_edge: scores.competitive_edge,
            market_potential: scores.market_score,
            technical_viability: scores.technical_viability(),
        },
        grade: composite.grade,
        valuation,
        market_analysis: MarketAnalysis {
            keywords: MarketKeywords {
                market_terms: features.market_keywords.clone(),
                tech_terms: features.tech_keywords.clone(),
            },
            score: features.market_score,
        },
        risks: external.risks.unwrap_or_else(|| owned(&DEFAULT_RISKS)),
        strengths: external.strengths.unwrap_or_else(|| owned(&DEFAULT_STRENGTHS)),
        evaluation_summary: external
            .summary
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        recommendations: owned(&RECOMMENDATIONS),
        explanation: external
            .summary
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::{CachingScorer, DisabledScorer, MockProvider};

    #[tokio::test]
    async fn disabled_scorer_yields_heuristic_response() {
        let input = EvaluationInput::new("A tool", "Build it", "Ship it");
        let r = evaluate_idea(&input, &DisabledScorer).await;

        assert_eq!(r.scores.originality, 0.5);
        assert_eq!(r.scores.feasibility, 0.5);
        assert_eq!(r.scores.competitive_edge, 0.5);
        assert_eq!(r.scores.market_need, 0.0);
        assert_eq!(r.scores.market_potential, 0.0);
        assert_eq!(r.scores.technical_viability, 0.25);
        // 0.125 + 0.1 + 0 + 0.125
        assert_eq!(r.scores.overall, 0.35);
        assert_eq!(r.grade, Grade::F);
        assert_eq!(r.risks.len(), 3);
        assert_eq!(r.strengths.len(), 3);
        assert_eq!(r.recommendations.len(), 5);
        assert_eq!(r.evaluation_summary, DEFAULT_SUMMARY);
        assert_eq!(r.explanation, DEFAULT_EXPLANATION);
        assert_eq!(r.valuation.currency, "USD");
    }

    #[tokio::test]
    async fn external_values_flow_into_response() {
        let scorer = CachingScorer::new(MockProvider::neutral(), 8);
        let mut input = EvaluationInput::new("An AI market tool", "api first", "grow demand");
        input.currency = Some("eur".into());
        let r = evaluate_idea(&input, &scorer).await;

        assert_eq!(r.scores.originality, 0.7);
        assert_eq!(r.scores.market_need, 0.6);
        assert_eq!(r.risks, vec!["Mock risk".to_string()]);
        assert_eq!(r.strengths, vec!["Mock strength".to_string()]);
        assert_eq!(r.evaluation_summary, "Mock evaluation summary.");
        assert_eq!(r.explanation, "Mock evaluation summary.");
        assert_eq!(r.valuation.currency, "EUR");
        assert_eq!(r.valuation.fx_rate, 0.92);
        assert!(r.market_analysis.keywords.market_terms.contains("market"));
        assert!(r.market_analysis.keywords.tech_terms.contains("api"));
    }

    #[test]
    fn null_or_blank_currency_means_usd() {
        let mut input = EvaluationInput::new("", "", "");
        input.currency = None;
        assert_eq!(input.currency(), "USD");
        input.currency = Some("  ".into());
        assert_eq!(input.currency(), "USD");
    }

    #[test]
    fn currency_defaults_when_absent_from_json() {
        let input: EvaluationInput =
            serde_json::from_str(r#"{"idea":"i","plan":"p","roadmap":"r"}"#).expect("parse");
        assert_eq!(input.currency(), "USD");
    }
}
