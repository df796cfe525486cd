use futures_util::stream::LocalBoxStream;

use crate::errors::ChatError;
use crate::models::{ErrorBody, Message};

#[cfg(not(target_arch = "wasm32"))]
pub mod http;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpTransport;

/// Raw response body, chunk by chunk. Not `Send`: the browser reader is a JS
/// object and the native client runs on a single task anyway.
pub type BodyStream = LocalBoxStream<'static, Result<Vec<u8>, ChatError>>;

/// Opens one streamed completion for the conversation so far.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn open_stream(&self, messages: &[Message]) -> Result<BodyStream, ChatError>;
}

/// Human-readable detail for a non-success response: the body's `error`
/// field when it has one, otherwise the status line.
pub fn error_detail(status_line: &str, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| format!("HTTP error! status: {status_line}"))
}
