//! External scorer: provider abstraction + in-memory LRU prompt cache.
//!
//! Every failure path (no token, transport error, timeout, non-2xx, unexpected body,
//! unparseable JSON) ends in `None`. Callers fall back to heuristics and never see
//! an error from this module.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::analyze::cache::LruCache;
use crate::config::ScorerConfig;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Structured verdict returned by the external model. Any key may be missing;
/// missing keys fall back individually in the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExternalScore {
    pub originality: Option<f64>,
    pub feasibility: Option<f64>,
    pub market_need: Option<f64>,
    pub competitive_edge: Option<f64>,
    pub risks: Option<Vec<String>>,
    pub strengths: Option<Vec<String>>,
    pub summary: Option<String>,
}

/// Trait object used by the orchestrator and the HTTP handlers.
pub trait IdeaScorer: Send + Sync {
    /// Score the idea; `None` means "no authoritative values, use fallbacks".
    fn score<'a>(
        &'a self,
        idea: &'a str,
        plan: &'a str,
        roadmap: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ExternalScore>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynScorer = Arc<dyn IdeaScorer>;

/// Factory: build a scorer according to config and environment.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock provider behind the cache.
/// * No token configured returns the disabled scorer (no network activity).
/// * Otherwise the inference endpoint provider wrapped with the LRU cache.
pub fn build_scorer_from_config(config: &ScorerConfig) -> anyhow::Result<DynScorer> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        info!("scorer: mock provider (AI_TEST_MODE=mock)");
        let scorer = CachingScorer::new(MockProvider::neutral(), config.cache_capacity);
        return Ok(Arc::new(scorer));
    }

    if !config.has_token() {
        info!("scorer: no HF_TOKEN configured, running on heuristics only");
        return Ok(Arc::new(DisabledScorer));
    }

    let provider = InferenceProvider::new(config)?;
    info!(
        endpoint = %provider.endpoint,
        timeout_secs = config.timeout_secs,
        cache_capacity = config.cache_capacity,
        "scorer: inference endpoint enabled"
    );
    Ok(Arc::new(CachingScorer::new(provider, config.cache_capacity)))
}

// ------------------------------------------------------------
// Prompt + parsing
// ------------------------------------------------------------

/// Instruction prompt sent to the model. The cache key is derived from this exact text.
pub fn build_prompt(idea: &str, plan: &str, roadmap: &str) -> String {
    format!(
        r#"You are an expert venture capital analyst. Evaluate the software idea below.
Respond with a single JSON object using exactly these keys:
{{
    "originality": <number 0.0-1.0, how novel the idea is>,
    "feasibility": <number 0.0-1.0, how realistic it is to build>,
    "market_need": <number 0.0-1.0, how strong the demand is>,
    "competitive_edge": <number 0.0-1.0, how defensible the advantage is>,
    "risks": ["<risk>", ...],
    "strengths": ["<strength>", ...],
    "summary": "<two or three sentence verdict>"
}}

Idea: {idea}
Implementation Plan: {plan}
Roadmap: {roadmap}
"#
    )
}

/// Extract the object between the first `{` and the last `}` and decode it.
/// All-or-nothing: a malformed object yields `None`.
pub fn parse_scorer_response(text: &str) -> Option<ExternalScore> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let mut parsed: ExternalScore = serde_json::from_str(&text[start..=end]).ok()?;
    parsed.risks = parsed.risks.map(clean_list);
    parsed.strengths = parsed.strengths.map(clean_list);
    parsed.summary = parsed
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Some(parsed)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Hex SHA-256 of the prompt; stable across processes.
pub fn prompt_hash(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does the remote call and returns the raw generated text.
/// Separated so the same caching wrapper serves production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// Text-generation inference endpoint (Hugging Face style API).
pub struct InferenceProvider {
    http: reqwest::Client,
    token: String,
    endpoint: String,
    temperature: f32,
    max_length: u32,
}

impl InferenceProvider {
    pub fn new(config: &ScorerConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("software-appraiser/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            token: config.token.clone().unwrap_or_default(),
            endpoint: config.endpoint_url(),
            temperature: config.temperature,
            max_length: config.max_length,
        })
    }
}

impl Provider for InferenceProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.token.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Params {
                temperature: f32,
                max_length: u32,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                inputs: &'a str,
                parameters: Params,
            }
            #[derive(Deserialize)]
            struct Generated {
                #[serde(default)]
                generated_text: String,
            }
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Resp {
                Batch(Vec<Generated>),
                Single(Generated),
            }

            let req = Req {
                inputs: prompt,
                parameters: Params {
                    temperature: self.temperature,
                    max_length: self.max_length,
                },
            };

            let resp = match self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.token)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, timeout = e.is_timeout(), "scorer request failed");
                    return None;
                }
            };

            if !resp.status().is_success() {
                warn!(status = %resp.status(), "scorer returned non-success status");
                return None;
            }

            let body: Resp = match resp.json().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(error = %e, "scorer response body not understood");
                    return None;
                }
            };
            let text = match body {
                Resp::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
                Resp::Single(g) => Some(g.generated_text),
            }
            .unwrap_or_default();

            if text.trim().is_empty() {
                warn!("scorer returned no generated text");
                None
            } else {
                Some(text)
            }
        })
    }
    fn name(&self) -> &'static str {
        "inference"
    }
}

/// Returns `None` always; used when no credential is configured.
pub struct DisabledScorer;

impl IdeaScorer for DisabledScorer {
    fn score<'a>(
        &'a self,
        _idea: &'a str,
        _plan: &'a str,
        _roadmap: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ExternalScore>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-output provider for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl MockProvider {
    /// Plausible model output with some chatter around the JSON object.
    pub fn neutral() -> Self {
        Self {
            fixed: r#"Here is my evaluation:
{"originality": 0.7, "feasibility": 0.8, "market_need": 0.6, "competitive_edge": 0.5,
 "risks": ["Mock risk"], "strengths": ["Mock strength"],
 "summary": "Mock evaluation summary."}"#
                .to_string(),
        }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching wrapper
// ------------------------------------------------------------

/// Caches raw provider output by prompt hash. The mutex is never held across an await;
/// two concurrent misses for the same prompt may both reach the provider.
pub struct CachingScorer<P: Provider> {
    inner: P,
    cache: Mutex<LruCache<String, String>>,
}

impl<P: Provider> CachingScorer<P> {
    pub fn new(inner: P, capacity: usize) -> Self {
        metrics::gauge!("scorer_cache_capacity").set(capacity as f64);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of cached prompts (diagnostics/tests).
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn score_impl(&self, idea: &str, plan: &str, roadmap: &str) -> Option<ExternalScore> {
        let prompt = build_prompt(idea, plan, roadmap);
        let key = prompt_hash(&prompt);
        let id = &key[..12];

        // 1) Cache lookup.
        let hit = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let raw = match hit {
            Some(raw) => {
                metrics::counter!("scorer_cache_hits_total").increment(1);
                debug!(%id, "scorer cache hit");
                raw
            }
            None => {
                metrics::counter!("scorer_cache_misses_total").increment(1);
                // 2) Real call.
                let Some(fresh) = self.inner.fetch(&prompt).await else {
                    metrics::counter!("scorer_failures_total").increment(1);
                    warn!(%id, provider = self.inner.name(), "scorer unavailable, using fallbacks");
                    return None;
                };
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key.clone(), fresh.clone());
                fresh
            }
        };

        let parsed = parse_scorer_response(&raw);
        if parsed.is_none() {
            metrics::counter!("scorer_failures_total").increment(1);
            warn!(%id, "scorer output is not a JSON object, using fallbacks");
        }
        parsed
    }
}

impl<P: Provider> IdeaScorer for CachingScorer<P> {
    fn score<'a>(
        &'a self,
        idea: &'a str,
        plan: &'a str,
        roadmap: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ExternalScore>> + Send + 'a>> {
        Box::pin(self.score_impl(idea, plan, roadmap))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
