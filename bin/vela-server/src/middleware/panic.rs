use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::ServerError;

/// Turn a panic inside a handler into the `internal server error` envelope.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "handler panicked".to_owned()
    };
    ServerError::Internal(detail).into_response()
}
