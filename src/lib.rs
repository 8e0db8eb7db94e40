// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod models;

// Idea scoring pipeline (keywords, external scorer, aggregation, valuation)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use analyze::{evaluate_idea, EvaluationInput, IdeaEvaluationResponse};
pub use crate::api::{router, AppState};

use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the full in-process app from the environment (config file + env overrides).
pub async fn app() -> anyhow::Result<Router> {
    // Recorder first, so gauges set while building state are kept.
    crate::metrics::Metrics::init();
    let state = AppState::from_env()?;
    Ok(router(state))
}

/// Install the tracing subscriber. `LOG_FORMAT=json` switches to JSON lines.
/// Uses `try_init`, so an already installed subscriber (e.g. from the deployment
/// runtime) is kept.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("software_appraiser=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
