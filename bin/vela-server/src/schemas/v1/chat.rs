//! OpenAI-compatible chat-completion request / response types.
//!
//! Every request field is optional on the wire; absent or `null` fields fall
//! back to defaults instead of failing deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use vela_core::{
    GenerationKnobs,
    sampling::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE},
    usage::{UsageEstimate, completion_id},
};

/// Model label echoed back when the request does not name one.
pub const DEFAULT_MODEL_LABEL: &str = "unknown-model";

// ── Chat Completions ─────────────────────────────────────────────────────────

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// The role of the message author (`"user"`, `"assistant"`; others are ignored).
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// The content of the message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl From<ChatMessage> for vela_core::ChatMessage {
    fn from(m: ChatMessage) -> Self {
        vela_core::ChatMessage::new(m.role, m.content)
    }
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatCompletionRequest {
    /// Opaque model label, echoed in the response.
    #[serde(default = "default_model", deserialize_with = "model_or_default")]
    pub model: String,
    /// Conversation history in chronological order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (default `0.7`); passed to the engine as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate (default `512`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    DEFAULT_MODEL_LABEL.to_owned()
}

fn model_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(default_model))
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl ChatCompletionRequest {
    pub fn knobs(&self) -> GenerationKnobs {
        GenerationKnobs {
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Length,
}

/// A single choice in the completion response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatChoice {
    /// The generated message.
    pub message: ChatMessage,
    /// Always `"stop"`; hitting `max_tokens` is not detected.
    pub finish_reason: FinishReason,
    /// Zero-based index of this choice.
    pub index: u32,
}

/// Character-count approximation of token usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl From<UsageEstimate> for Usage {
    fn from(u: UsageEstimate) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

/// Response body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatCompletionResponse {
    /// Derived from the prompt; not globally unique.
    pub id: String,
    /// Always `"chat.completion"`.
    pub object: String,
    /// Unix timestamp of when the response was created.
    pub created: i64,
    /// Model label from the request.
    pub model: String,
    /// Exactly one choice.
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Build the envelope for one completion of `prompt`.
    pub fn assemble(model: String, prompt: &str, content: String, created: i64) -> Self {
        let usage = UsageEstimate::from_text(prompt, &content).into();
        Self {
            id: completion_id(prompt),
            object: "chat.completion".into(),
            created,
            model,
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: "assistant".into(),
                    content,
                },
                finish_reason: FinishReason::Stop,
                index: 0,
            }],
            usage,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_uses_defaults() {
        let req: ChatCompletionRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.model, "unknown-model");
        assert!(req.messages.is_empty());
        let knobs = req.knobs();
        assert_eq!(knobs.temperature, 0.7);
        assert_eq!(knobs.max_tokens, 512);
    }

    #[test]
    fn null_knobs_use_defaults() {
        let req: ChatCompletionRequest =
            serde_json::from_value(json!({ "temperature": null, "max_tokens": null })).unwrap();
        assert_eq!(req.knobs(), GenerationKnobs::default());
    }

    #[test]
    fn message_fields_default_to_empty() {
        let req: ChatCompletionRequest =
            serde_json::from_value(json!({ "messages": [{ "content": "x" }, { "role": "user" }] }))
                .unwrap();
        assert_eq!(req.messages[0].role, "");
        assert_eq!(req.messages[1].content, "");
    }

    #[test]
    fn null_model_and_messages_mean_absent() {
        let req: ChatCompletionRequest =
            serde_json::from_value(json!({ "model": null, "messages": null })).unwrap();
        assert_eq!(req.model, "unknown-model");
        assert!(req.messages.is_empty());
    }

    #[test]
    fn null_message_fields_mean_empty() {
        let req: ChatCompletionRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": null }, { "role": null, "content": "x" }]
        }))
        .unwrap();
        assert_eq!(req.messages[0].content, "");
        assert_eq!(req.messages[1].role, "");
        assert_eq!(req.messages[1].content, "x");
    }

    #[test]
    fn non_null_values_still_type_checked() {
        assert!(serde_json::from_value::<ChatCompletionRequest>(json!({ "model": 7 })).is_err());
        assert!(
            serde_json::from_value::<ChatCompletionRequest>(json!({ "messages": "hi" })).is_err()
        );
    }

    #[test]
    fn envelope_shape() {
        let resp = ChatCompletionResponse::assemble(
            "qwen".into(),
            "用户：Hello\n助手：",
            "Hi there".into(),
            1_716_230_400,
        );
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["object"], "chat.completion");
        assert_eq!(v["created"], 1_716_230_400);
        assert_eq!(v["model"], "qwen");
        assert_eq!(v["choices"][0]["message"]["role"], "assistant");
        assert_eq!(v["choices"][0]["message"]["content"], "Hi there");
        assert_eq!(v["choices"][0]["finish_reason"], "stop");
        assert_eq!(v["choices"][0]["index"], 0);
        assert_eq!(v["usage"]["prompt_tokens"], 12);
        assert_eq!(v["usage"]["completion_tokens"], 8);
        assert_eq!(v["usage"]["total_tokens"], 20);
        assert!(v["id"].as_str().unwrap().starts_with("chatcmpl-"));
    }

    #[test]
    fn non_ascii_is_serialized_literally() {
        let resp = ChatCompletionResponse::assemble("m".into(), "助手：", "你好".into(), 0);
        let text = serde_json::to_string(&resp).unwrap();
        assert!(text.contains("你好"));
        assert!(!text.contains("\\u"));
    }
}
