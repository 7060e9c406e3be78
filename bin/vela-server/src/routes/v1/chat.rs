//! OpenAI-compatible chat-completion route.
//!
//! One request, one generation: the conversation is flattened into a
//! labelled transcript, the engine continues it once, and the trimmed text is
//! wrapped in a `chat.completion` envelope. There is no streaming, batching,
//! session state or timeout here; a generation call runs as long as the
//! engine takes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::v1::chat::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, FinishReason, Usage,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat_completions),
    components(schemas(
        ChatCompletionRequest,
        ChatCompletionResponse,
        ChatMessage,
        ChatChoice,
        FinishReason,
        Usage
    ))
)]
pub struct ChatApi;

/// Register chat-completion routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/completions", post(chat_completions))
}

/// OpenAI chat completions (`POST /v1/chat/completions`).
#[utoipa::path(
    post,
    path = "/v1/chat/completions",
    tag = "chat",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Completion generated", body = ChatCompletionResponse),
        (status = 500, description = "Model not loaded or generation failed"),
    )
)]
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, ServerError> {
    if !state.model.is_loaded() {
        warn!("chat completion rejected: model not loaded");
        return Err(ServerError::ModelUnavailable);
    }

    let knobs = req.knobs();
    debug!(
        model = %req.model,
        messages = req.messages.len(),
        temperature = knobs.temperature,
        max_tokens = knobs.max_tokens,
        "chat completion request"
    );

    let messages: Vec<vela_core::ChatMessage> = req.messages.into_iter().map(Into::into).collect();
    let prompt = state.renderer.render(&messages);
    let sampling = state.sampling.derive(knobs);

    let generated = state.model.generate(&prompt, &sampling).await?;
    let generated = generated.trim().to_owned();

    info!(
        model = %req.model,
        prompt_chars = prompt.chars().count(),
        output_chars = generated.chars().count(),
        "chat completion done"
    );

    Ok(Json(ChatCompletionResponse::assemble(
        req.model,
        &prompt,
        generated,
        Utc::now().timestamp(),
    )))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
