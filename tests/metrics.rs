// tests/metrics.rs
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use software_appraiser::ai_adapter::{CachingScorer, MockProvider};
use software_appraiser::api;
use software_appraiser::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    // Install the recorder before the scorer registers its capacity gauge.
    Metrics::init();
    let scorer = CachingScorer::new(MockProvider::neutral(), 100);
    let app = api::router_with_scorer(Arc::new(scorer));

    // Two identical evaluations: one cache miss, one hit.
    for _ in 0..2 {
        let req = Request::post("/evaluate/idea")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"idea":"i","plan":"p","roadmap":"r"}"#))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "idea_evaluations_total",
        "idea_evaluation_duration_ms",
        "scorer_cache_hits_total",
        "scorer_cache_misses_total",
        "scorer_cache_capacity",
    ] {
        assert!(
            text.contains(needle),
            "metrics output missing '{needle}':\n{text}"
        );
    }
}
