//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use vela_core::{ModelHandle, PromptRenderer, RoleLabels, SamplingPolicy};

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The process's model; may be unloaded.
    pub model: ModelHandle,
    /// Conversation-to-prompt renderer built from the configured labels.
    pub renderer: PromptRenderer,
    /// Sampling policy sharing the renderer's user label as stop marker.
    pub sampling: SamplingPolicy,
}

impl AppState {
    pub fn new(config: Config, model: ModelHandle) -> Self {
        let labels = RoleLabels::new(config.user_label.clone(), config.assistant_label.clone());
        Self {
            sampling: SamplingPolicy::new(&labels),
            renderer: PromptRenderer::new(labels),
            config: Arc::new(config),
            model,
        }
    }
}
