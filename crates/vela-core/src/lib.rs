//! vela-core – the request-adaptation layer between an OpenAI-style chat
//! request and a single opaque inference engine.
//!
//! Everything here is transport-agnostic:
//! - [`prompt`] flattens a conversation into one prompt string.
//! - [`sampling`] turns request knobs into a [`SamplingConfig`].
//! - [`engine`] defines the engine capability and the [`ModelHandle`] that
//!   carries the loaded-or-not state.
//! - [`usage`] holds the character-count usage approximation.
//!
//! The HTTP surface lives in `vela-server`.

pub mod engine;
pub mod prompt;
pub mod sampling;
pub mod usage;

pub use engine::remote::RemoteEngine;
pub use engine::{EngineError, InferenceEngine, LoadOptions, ModelHandle};
pub use prompt::{ChatMessage, PromptRenderer, Role, RoleLabels};
pub use sampling::{GenerationKnobs, SamplingConfig, SamplingPolicy};
pub use usage::UsageEstimate;
