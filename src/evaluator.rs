//! # Evaluators
//! One trait, one implementation per kind of submission. Each variant names its own
//! input and report types; nothing forces a shared base report.
//!
//! - [`IdeaEvaluator`]: the scoring pipeline in [`crate::analyze`].
//! - [`CodeQualityEvaluator`], [`ProjectEvaluator`]: placeholders returning empty
//!   reports until real static analysis lands.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analyze::{evaluate_idea, DynScorer, EvaluationInput, IdeaEvaluationResponse};
use crate::error::EvaluationError;
use crate::models::{CodeQualityReport, ProjectEvaluation};

#[async_trait]
pub trait Evaluator: Send + Sync {
    type Input: Send + Sync;
    type Report: Serialize + Send;

    fn kind(&self) -> &'static str;

    async fn evaluate(&self, input: &Self::Input) -> Result<Self::Report, EvaluationError>;
}

/// Idea scoring backed by the configured external scorer.
#[derive(Clone)]
pub struct IdeaEvaluator {
    scorer: DynScorer,
}

impl IdeaEvaluator {
    pub fn new(scorer: DynScorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl Evaluator for IdeaEvaluator {
    type Input = EvaluationInput;
    type Report = IdeaEvaluationResponse;

    fn kind(&self) -> &'static str {
        "idea"
    }

    async fn evaluate(
        &self,
        input: &EvaluationInput,
    ) -> Result<IdeaEvaluationResponse, EvaluationError> {
        Ok(evaluate_idea(input, self.scorer.as_ref()).await)
    }
}

/// Source text plus its language tag.
#[derive(Debug, Clone)]
pub struct CodeSubmission {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, Default)]
pub struct CodeQualityEvaluator;

#[async_trait]
impl Evaluator for CodeQualityEvaluator {
    type Input = CodeSubmission;
    type Report = CodeQualityReport;

    fn kind(&self) -> &'static str {
        "code"
    }

    async fn evaluate(
        &self,
        input: &CodeSubmission,
    ) -> Result<CodeQualityReport, EvaluationError> {
        // TODO: run a linter per language and map findings to CodeIssue.
        Ok(CodeQualityReport::empty(&input.language))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectEvaluator;

impl ProjectEvaluator {
    /// Evaluate several projects; keyed by the path as given. Fails on the first
    /// missing path.
    pub async fn compare(
        &self,
        paths: &[PathBuf],
    ) -> Result<BTreeMap<String, ProjectEvaluation>, EvaluationError> {
        let mut out = BTreeMap::new();
        for p in paths {
            out.insert(p.display().to_string(), self.evaluate(p).await?);
        }
        Ok(out)
    }
}

#[async_trait]
impl Evaluator for ProjectEvaluator {
    type Input = PathBuf;
    type Report = ProjectEvaluation;

    fn kind(&self) -> &'static str {
        "project"
    }

    async fn evaluate(&self, input: &PathBuf) -> Result<ProjectEvaluation, EvaluationError> {
        ensure_exists(input).await?;
        Ok(ProjectEvaluation::empty())
    }
}

async fn ensure_exists(path: &Path) -> Result<(), EvaluationError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(EvaluationError::ProjectNotFound(path.to_path_buf())),
        Err(e) => Err(EvaluationError::Io(e)),
    }
}
