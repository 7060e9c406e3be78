//! Usage accounting and completion ids.
//!
//! Token counts are approximations: one "token" per Unicode scalar value.
//! No tokenizer is consulted.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Character-count usage for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageEstimate {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl UsageEstimate {
    pub fn from_text(prompt: &str, completion: &str) -> Self {
        let prompt_tokens = prompt.chars().count();
        let completion_tokens = completion.chars().count();
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Derive a completion id from the rendered prompt.
///
/// Identical prompts map to the same id; ids are not globally unique.
pub fn completion_id(prompt: &str) -> String {
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    format!("chatcmpl-{}", hasher.finish() % 1_000_000)
}
