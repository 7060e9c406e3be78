//! [`InferenceEngine`] backed by a separate engine process.
//!
//! The engine process owns weights, tokenizer, scheduler and device memory.
//! vela only speaks its plain completions protocol:
//! - `GET  {base}/v1/models` to confirm the model is being served;
//! - `POST {base}/v1/completions` for each generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{EngineError, InferenceEngine, LoadOptions};
use crate::sampling::SamplingConfig;

#[derive(Debug, Clone)]
pub struct RemoteEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    /// Context length the engine was started with, when it reports one.
    #[serde(default)]
    max_model_len: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    stop: Vec<&'a str>,
    skip_special_tokens: bool,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl RemoteEngine {
    /// Validate `options`, then confirm the engine at `base_url` is serving
    /// `model_path` with at least `options.max_model_len` of context.
    ///
    /// The remaining options are fixed when the engine process starts; they
    /// are only validated and logged here.
    ///
    /// Meant to be awaited once before the HTTP listener starts.
    pub async fn load(
        base_url: &str,
        model_path: &str,
        options: &LoadOptions,
    ) -> Result<Self, EngineError> {
        options.validate()?;

        let base_url = base_url.trim_end_matches('/').to_owned();
        info!(
            model_path,
            base_url = %base_url,
            max_model_len = options.max_model_len,
            gpu_memory_utilization = options.gpu_memory_utilization,
            tensor_parallel_size = options.tensor_parallel_size,
            trust_remote_code = options.trust_remote_code,
            "loading model"
        );

        let load_err = |source: anyhow::Error| EngineError::Load {
            model_path: model_path.to_owned(),
            source,
        };

        let client = reqwest::Client::new();
        let listing: ModelList = client
            .get(format!("{base_url}/v1/models"))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| load_err(e.into()))?
            .json()
            .await
            .map_err(|e| load_err(e.into()))?;

        let Some(entry) = listing.data.iter().find(|m| m.id == model_path) else {
            let served: Vec<&str> = listing.data.iter().map(|m| m.id.as_str()).collect();
            return Err(load_err(anyhow::anyhow!(
                "engine does not serve this model (serving: {served:?})"
            )));
        };

        match entry.max_model_len {
            Some(served) if served < options.max_model_len => {
                return Err(load_err(anyhow::anyhow!(
                    "engine context length {served} is below the requested max_model_len {}",
                    options.max_model_len
                )));
            }
            Some(served) => debug!(served_max_model_len = served, "engine context length ok"),
            None => debug!("engine does not report a context length"),
        }

        info!(model_path, "model loaded");
        Ok(Self {
            client,
            base_url,
            model: model_path.to_owned(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceEngine for RemoteEngine {
    async fn generate(
        &self,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<Vec<String>, EngineError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stop: config.stop_sequences.iter().map(String::as_str).collect(),
            skip_special_tokens: config.suppress_special_tokens,
            n: 1,
        };

        let generation_err = |e: reqwest::Error| EngineError::Generation { source: e.into() };

        let resp: CompletionResponse = self
            .client
            .post(format!("{}/v1/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(generation_err)?
            .json()
            .await
            .map_err(generation_err)?;

        debug!(candidates = resp.choices.len(), "engine returned");
        Ok(resp.choices.into_iter().map(|c| c.text).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
