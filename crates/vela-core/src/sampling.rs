//! Sampling policy: request knobs plus fixed stop / special-token policy.

use std::collections::BTreeSet;

use crate::prompt::RoleLabels;

/// Temperature used when the request omits one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// `max_tokens` used when the request omits one.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Generation knobs a caller may set per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationKnobs {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationKnobs {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Sampling configuration handed to a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop_sequences: BTreeSet<String>,
    pub suppress_special_tokens: bool,
}

/// Derives a [`SamplingConfig`] from request knobs.
///
/// Temperature and `max_tokens` pass through untouched; no clamping or range
/// checks happen here. The stop set is always exactly the user label, which
/// keeps the model from writing the next user turn itself.
#[derive(Debug, Clone)]
pub struct SamplingPolicy {
    stop_marker: String,
}

impl SamplingPolicy {
    pub fn new(labels: &RoleLabels) -> Self {
        Self {
            stop_marker: labels.user.clone(),
        }
    }

    pub fn derive(&self, knobs: GenerationKnobs) -> SamplingConfig {
        SamplingConfig {
            temperature: knobs.temperature,
            max_tokens: knobs.max_tokens,
            stop_sequences: BTreeSet::from([self.stop_marker.clone()]),
            suppress_special_tokens: true,
        }
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::new(&RoleLabels::default())
    }
}
