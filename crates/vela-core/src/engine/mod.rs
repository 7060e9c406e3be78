//! The inference-engine seam.
//!
//! vela never looks inside the engine. Anything that can turn a prompt and a
//! [`SamplingConfig`] into text implements [`InferenceEngine`]; the
//! [`ModelHandle`] wraps an optional engine so "not loaded" is an ordinary,
//! constructible state rather than a process-wide global.

pub mod remote;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::sampling::SamplingConfig;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid load options: {0}")]
    InvalidLoadOptions(String),

    #[error("Failed to load model from: {model_path}")]
    Load {
        model_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Model not loaded")]
    NotLoaded,

    #[error("Generation failed")]
    Generation {
        #[source]
        source: anyhow::Error,
    },

    #[error("Engine returned no candidates")]
    EmptyOutput,
}

/// Options applied once when the model is loaded.
///
/// Only `max_model_len` is enforced against a running engine; the other
/// fields take effect where the engine process itself is started.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Minimum sequence length the engine must support.
    pub max_model_len: u32,
    /// Fraction of accelerator memory the engine may claim, in `(0, 1]`.
    pub gpu_memory_utilization: f32,
    /// Number of devices to shard the model across.
    pub tensor_parallel_size: u32,
    /// Allow model repositories that ship custom code.
    pub trust_remote_code: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_model_len: 8192,
            gpu_memory_utilization: 0.9,
            tensor_parallel_size: 1,
            trust_remote_code: true,
        }
    }
}

impl LoadOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_model_len == 0 {
            return Err(EngineError::InvalidLoadOptions(
                "max_model_len must be > 0".into(),
            ));
        }
        if !(self.gpu_memory_utilization > 0.0 && self.gpu_memory_utilization <= 1.0) {
            return Err(EngineError::InvalidLoadOptions(format!(
                "gpu_memory_utilization ({}) must be in (0, 1]",
                self.gpu_memory_utilization
            )));
        }
        if self.tensor_parallel_size == 0 {
            return Err(EngineError::InvalidLoadOptions(
                "tensor_parallel_size must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// A loaded model able to run one generation per call.
///
/// Implementations must tolerate concurrent callers; whether they serialize
/// or batch internally is their business.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate continuations of `prompt`. Candidates are returned in engine
    /// order; callers use the first.
    async fn generate(
        &self,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<Vec<String>, EngineError>;
}

/// Handle to the process's model, loaded or not.
///
/// Cloning is cheap and every clone shares the same engine.
#[derive(Clone, Default)]
pub struct ModelHandle {
    engine: Option<Arc<dyn InferenceEngine>>,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelHandle(loaded: {})", self.is_loaded())
    }
}

impl ModelHandle {
    pub fn unloaded() -> Self {
        Self { engine: None }
    }

    pub fn loaded(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    /// Run one generation and return the first candidate, untrimmed.
    pub async fn generate(
        &self,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<String, EngineError> {
        let engine = self.engine.as_ref().ok_or(EngineError::NotLoaded)?;
        engine
            .generate(prompt, config)
            .await?
            .into_iter()
            .next()
            .ok_or(EngineError::EmptyOutput)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampling::SamplingPolicy;

    struct Canned(Vec<String>);

    #[async_trait]
    impl InferenceEngine for Canned {
        async fn generate(
            &self,
            _prompt: &str,
            _config: &SamplingConfig,
        ) -> Result<Vec<String>, EngineError> {
            Ok(self.0.clone())
        }
    }

    fn config() -> SamplingConfig {
        SamplingPolicy::default().derive(Default::default())
    }

    #[test]
    fn unloaded_handle_reports_not_loaded() {
        let handle = ModelHandle::unloaded();
        assert!(!handle.is_loaded());
        assert_eq!(format!("{handle:?}"), "ModelHandle(loaded: false)");
    }

    #[tokio::test]
    async fn unloaded_handle_refuses_generation() {
        let err = ModelHandle::default()
            .generate("助手：", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotLoaded));
    }

    #[tokio::test]
    async fn first_candidate_is_returned_untrimmed() {
        let handle = ModelHandle::loaded(Arc::new(Canned(vec![
            " first \n".into(),
            "second".into(),
        ])));
        assert!(handle.is_loaded());
        assert_eq!(handle.generate("p", &config()).await.unwrap(), " first \n");
    }

    #[tokio::test]
    async fn no_candidates_is_an_error() {
        let handle = ModelHandle::loaded(Arc::new(Canned(vec![])));
        let err = handle.generate("p", &config()).await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyOutput));
    }

    #[test]
    fn load_options_validation() {
        assert!(LoadOptions::default().validate().is_ok());

        let zero_len = LoadOptions {
            max_model_len: 0,
            ..Default::default()
        };
        assert!(zero_len.validate().is_err());

        for bad in [0.0, -0.5, 1.01, f32::NAN] {
            let opts = LoadOptions {
                gpu_memory_utilization: bad,
                ..Default::default()
            };
            assert!(opts.validate().is_err(), "{bad} should be rejected");
        }

        let no_devices = LoadOptions {
            tensor_parallel_size: 0,
            ..Default::default()
        };
        assert!(no_devices.validate().is_err());
    }
}
