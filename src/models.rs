//! Report types for the code-quality and project evaluators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyze::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Info,
    Warning,
    Error,
    Critical,
}

/// A single finding in a piece of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeIssue {
    pub message: String,
    pub severity: SeverityLevel,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub file_path: Option<String>,
    pub category: Option<String>,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeQualityReport {
    /// 0.0 to 1.0
    pub score: f64,
    pub issues: Vec<CodeIssue>,
    pub metrics: BTreeMap<String, serde_json::Value>,
    pub language: String,
    pub summary: String,
}

impl CodeQualityReport {
    /// Zero score, no findings.
    pub fn empty(language: &str) -> Self {
        Self {
            score: 0.0,
            issues: Vec::new(),
            metrics: BTreeMap::new(),
            language: language.to_string(),
            summary: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEvaluation {
    pub overall_score: f64,
    pub code_quality: CodeQualityReport,
    pub documentation_quality: f64,
    pub test_coverage: f64,
    pub performance_metrics: BTreeMap<String, serde_json::Value>,
    pub security_issues: Vec<CodeIssue>,
    pub dependencies: BTreeMap<String, String>,
    pub maintainability_index: Option<f64>,
    pub technical_debt: Option<f64>,
}

impl ProjectEvaluation {
    pub fn empty() -> Self {
        Self {
            overall_score: 0.0,
            code_quality: CodeQualityReport::empty(""),
            documentation_quality: 0.0,
            test_coverage: 0.0,
            performance_metrics: BTreeMap::new(),
            security_issues: Vec::new(),
            dependencies: BTreeMap::new(),
            maintainability_index: None,
            technical_debt: None,
        }
    }

    /// Same thresholds as the idea grade.
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.overall_score)
    }
}
