//! Full app built from the environment with `AI_TEST_MODE=mock`.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;

fn set_env(mock: bool) {
    std::env::remove_var("HF_TOKEN");
    std::env::set_var("SCORER_CONFIG_PATH", "config/does-not-exist.toml");
    if mock {
        std::env::set_var("AI_TEST_MODE", "mock");
    } else {
        std::env::remove_var("AI_TEST_MODE");
    }
}

async fn evaluate(app: axum::Router) -> Value {
    let req = Request::post("/evaluate/idea")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"idea":"Marketplace","plan":"MVP","roadmap":"Launch","currency":"EUR"}"#,
        ))
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
#[serial]
async fn mock_mode_uses_mock_scores() {
    set_env(true);
    let app = software_appraiser::app().await.expect("app builds");
    let v = evaluate(app).await;

    assert_eq!(v["scores"]["originality"], 0.7);
    assert_eq!(v["scores"]["feasibility"], 0.8);
    assert_eq!(v["scores"]["market_need"], 0.6);
    assert_eq!(v["scores"]["competitive_edge"], 0.5);
    assert_eq!(v["explanation"], "Mock evaluation summary.");
    assert_eq!(v["valuation"]["currency"], "EUR");
    set_env(false);
}

#[tokio::test]
#[serial]
async fn without_token_app_runs_on_heuristics() {
    set_env(false);
    let app = software_appraiser::app().await.expect("app builds");
    let v = evaluate(app).await;

    assert_eq!(v["scores"]["originality"], 0.5);
    assert_eq!(v["explanation"], "Evaluation completed successfully");
}

#[tokio::test]
#[serial]
async fn malformed_config_file_fails_startup() {
    let path = std::env::temp_dir().join(format!("scorer-bad-{}.toml", std::process::id()));
    std::fs::write(&path, "timeout_secs = \"soon\"").expect("write config");
    set_env(false);
    std::env::set_var("SCORER_CONFIG_PATH", &path);

    let err = software_appraiser::app().await.err().expect("startup must fail");
    assert!(format!("{err:#}").contains("parsing scorer config"));

    let _ = std::fs::remove_file(&path);
    set_env(false);
}
