use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, error};

use super::{error_detail, BodyStream, ChatTransport};
use crate::config::ClientConfig;
use crate::errors::ChatError;
use crate::models::{ChatRequest, Message};

/// reqwest-backed transport for the native client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.chat_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChatTransport for HttpTransport {
    async fn open_stream(&self, messages: &[Message]) -> Result<BodyStream, ChatError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(ACCEPT, "text/event-stream")
            .json(&ChatRequest { messages });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {e}", self.url);
            ChatError::network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&status.to_string(), &body);
            error!("Chat endpoint returned {status}: {message}");
            return Err(ChatError::transport(status.as_u16(), message));
        }

        debug!(
            content_type = ?response.headers().get(CONTENT_TYPE),
            "Streaming reply from {}", self.url
        );
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ChatError::network));
        Ok(body.boxed_local())
    }
}
