use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::analyze::ai_adapter::build_scorer_from_config;
use crate::analyze::{DynScorer, EvaluationInput, IdeaEvaluationResponse};
use crate::config::ScorerConfig;
use crate::error::{ApiError, EvaluationError};
use crate::evaluator::{
    CodeQualityEvaluator, CodeSubmission, Evaluator, IdeaEvaluator, ProjectEvaluator,
};
use crate::metrics::Metrics;
use crate::models::{CodeQualityReport, ProjectEvaluation};

/// Directory served under `/app` when present.
pub const FRONTEND_DIR: &str = "frontend";

/// Extensions evaluated as a single source file on upload.
pub const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "java", "c", "cpp", "go", "rs"];

const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Prefix of the per-request upload directory under the system temp dir.
pub const UPLOAD_DIR_PREFIX: &str = "appraiser-upload-";

#[derive(Clone)]
pub struct AppState {
    pub idea: IdeaEvaluator,
    pub code: CodeQualityEvaluator,
    pub project: ProjectEvaluator,
}

impl AppState {
    pub fn new(scorer: DynScorer) -> Self {
        Self {
            idea: IdeaEvaluator::new(scorer),
            code: CodeQualityEvaluator,
            project: ProjectEvaluator,
        }
    }

    pub fn from_config(config: &ScorerConfig) -> anyhow::Result<Self> {
        let scorer = build_scorer_from_config(config)?;
        info!(provider = scorer.provider_name(), "app state ready");
        Ok(Self::new(scorer))
    }

    /// Config from `SCORER_CONFIG_PATH` + env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(&ScorerConfig::from_env()?)
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = Metrics::init();

    let mut app: Router<AppState> = Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/evaluate/idea", post(evaluate_idea))
        .route("/evaluate/code", post(evaluate_code))
        .route("/evaluate/project", post(evaluate_project))
        .route(
            "/evaluate/upload",
            post(upload_and_evaluate).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .merge(metrics.router());

    if Path::new(FRONTEND_DIR).is_dir() {
        app = app.nest_service(
            "/app",
            ServeDir::new(FRONTEND_DIR).append_index_html_on_directories(true),
        );
    }

    app.layer(CorsLayer::very_permissive()).with_state(state)
}

/// Shorthand used by tests: router around an explicit scorer.
pub fn router_with_scorer(scorer: DynScorer) -> Router {
    router(AppState::new(scorer))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "AI Software Appraiser",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
        "redoc": "/redoc",
    }))
}

async fn evaluate_idea(
    State(state): State<AppState>,
    Json(body): Json<EvaluationInput>,
) -> Result<Json<IdeaEvaluationResponse>, ApiError> {
    debug!(kind = state.idea.kind(), "evaluation requested");
    Ok(Json(state.idea.evaluate(&body).await?))
}

fn default_language() -> String {
    "python".to_string()
}

#[derive(Deserialize)]
struct CodeQuery {
    code: String,
    #[serde(default = "default_language")]
    language: String,
}

async fn evaluate_code(
    State(state): State<AppState>,
    Query(q): Query<CodeQuery>,
) -> Result<Json<CodeQualityReport>, ApiError> {
    let submission = CodeSubmission {
        code: q.code,
        language: q.language,
    };
    debug!(
        kind = state.code.kind(),
        language = %submission.language,
        "evaluation requested"
    );
    Ok(Json(state.code.evaluate(&submission).await?))
}

#[derive(Deserialize)]
struct ProjectQuery {
    project_path: String,
}

async fn evaluate_project(
    State(state): State<AppState>,
    Query(q): Query<ProjectQuery>,
) -> Result<Json<ProjectEvaluation>, ApiError> {
    let path = PathBuf::from(q.project_path);
    debug!(kind = state.project.kind(), path = %path.display(), "evaluation requested");
    Ok(Json(state.project.evaluate(&path).await?))
}

/// Either report, depending on what was uploaded.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadReport {
    Code(CodeQualityReport),
    Project(ProjectEvaluation),
}

async fn upload_and_evaluate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string).unwrap_or_default();
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("missing multipart field 'file'".into()))?;
    // Keep only the final component so the upload cannot escape its directory.
    let name = Path::new(&filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("uploaded file has no name".into()))?
        .to_string();

    // Randomly named and removed on drop.
    let dir = tempfile::Builder::new()
        .prefix(UPLOAD_DIR_PREFIX)
        .tempdir()
        .map_err(EvaluationError::from)?;

    let result = evaluate_upload(&state, dir.path(), &name, &data).await;

    let path = dir.path().display().to_string();
    if let Err(e) = dir.close() {
        warn!(error = %e, dir = %path, "failed to clean upload dir");
    }
    result.map(Json)
}

async fn evaluate_upload(
    state: &AppState,
    dir: &Path,
    name: &str,
    data: &[u8],
) -> Result<UploadReport, ApiError> {
    tokio::fs::write(dir.join(name), data)
        .await
        .map_err(EvaluationError::from)?;

    match source_extension(name) {
        Some(ext) => {
            let code = String::from_utf8(data.to_vec())
                .map_err(|_| ApiError::BadRequest(format!("{name} is not valid UTF-8 text")))?;
            let submission = CodeSubmission {
                code,
                language: ext.to_string(),
            };
            info!(kind = state.code.kind(), file = name, "evaluating upload");
            Ok(UploadReport::Code(state.code.evaluate(&submission).await?))
        }
        None => {
            let root = dir.to_path_buf();
            info!(kind = state.project.kind(), file = name, "evaluating upload");
            Ok(UploadReport::Project(state.project.evaluate(&root).await?))
        }
    }
}

/// Extension of `name` if it is one of [`SOURCE_EXTENSIONS`].
pub fn source_extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    SOURCE_EXTENSIONS.contains(&ext).then_some(ext)
}

/// State with the scorer switched off (heuristics only).
pub fn disabled_state() -> AppState {
    AppState::new(Arc::new(crate::analyze::ai_adapter::DisabledScorer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_extensions_are_detected() {
        assert_eq!(source_extension("main.rs"), Some("rs"));
        assert_eq!(source_extension("lib.tar.gz"), None);
        assert_eq!(source_extension("x.cpp"), Some("cpp"));
        assert_eq!(source_extension("README"), None);
    }
}
