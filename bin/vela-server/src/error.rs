//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON body of the form
//! `{"error": "<message>"}`.
//!
//! Engine failures are logged with full detail; the caller only sees a
//! generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use vela_core::EngineError;

/// Message returned while no model is loaded.
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "模型未成功加载，请检查服务启动日志";

/// All errors that can occur in the vela-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The model handle is not loaded.
    #[error("model not loaded")]
    ModelUnavailable,

    /// The engine failed to produce a completion.
    #[error("generation error: {0}")]
    Generation(#[from] EngineError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let client_message = match &self {
            ServerError::ModelUnavailable => MODEL_UNAVAILABLE_MESSAGE.to_owned(),
            ServerError::Generation(e) => {
                error!(error = ?e, "generation failed");
                "generation failed".to_owned()
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                "internal server error".to_owned()
            }
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": client_message })),
        )
            .into_response()
    }
}
