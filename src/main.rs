//! Software Appraiser — Binary Entrypoint
//! Boots the Axum HTTP server on the shuttle runtime.

use shuttle_axum::ShuttleAxum;
use shuttle_runtime::SecretStore;
use tracing::info;

use software_appraiser::config::scorer::ENV_HF_TOKEN;
use software_appraiser::config::ScorerConfig;
use software_appraiser::metrics::Metrics;
use software_appraiser::{init_tracing, router, AppState};

#[shuttle_runtime::main]
async fn axum(#[shuttle_runtime::Secrets] secrets: SecretStore) -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();
    Metrics::init();

    let mut config = ScorerConfig::from_env()?;
    if !config.has_token() {
        // Deployed secrets are not exported as env vars.
        config.token = secrets.get(ENV_HF_TOKEN).filter(|t| !t.trim().is_empty());
    }
    info!(
        model = %config.model,
        scorer_enabled = config.has_token(),
        "starting software appraiser"
    );

    let state = AppState::from_config(&config)?;
    Ok(router(state).into())
}
