use chat_stream::models::ChatRequest;
use chat_stream::transport::error_detail;
use chat_stream::{BodyStream, ChatError, ChatTransport, Message};
use futures_util::StreamExt;
use gloo_net::http::Request;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

/// Chat completion endpoint, fixed at build time.
const CHAT_URL: &str = match option_env!("CHAT_URL") {
    Some(url) => url,
    None => "http://localhost:54321/functions/v1/chat",
};

/// Publishable key sent as a bearer token, if the endpoint wants one.
const CHAT_API_KEY: Option<&str> = option_env!("CHAT_API_KEY");

/// Streams replies with `fetch`, reading the body through the DOM stream reader.
#[derive(Clone, Copy, Default)]
pub struct FetchTransport;

impl ChatTransport for FetchTransport {
    async fn open_stream(&self, messages: &[Message]) -> Result<BodyStream, ChatError> {
        let mut builder = Request::post(CHAT_URL).header("Accept", "text/event-stream");
        if let Some(key) = CHAT_API_KEY {
            builder = builder.header("Authorization", &format!("Bearer {key}"));
        }

        let resp = builder
            .json(&ChatRequest { messages })
            .map_err(|e| ChatError::Network(format!("Serialize error: {e}")))?
            .send()
            .await
            .map_err(|e| ChatError::Network(format!("{e}")))?;

        if !resp.ok() {
            let status = resp.status();
            let status_line = format!("{status} {}", resp.status_text());
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::transport(status, error_detail(status_line.trim(), &body)));
        }

        let body = resp.body().ok_or(ChatError::NoResponseBody)?;
        let reader = ReaderGuard(body.get_reader().unchecked_into());

        let chunks = futures_util::stream::unfold(Some(reader), |reader| async move {
            let Some(reader) = reader else {
                return None;
            };
            match read_chunk(&reader.0).await {
                Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        });
        Ok(chunks.boxed_local())
    }
}

/// Holds the body reader and cancels it when dropped, however the stream ends.
struct ReaderGuard(ReadableStreamDefaultReader);

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        let _ = self.0.cancel();
    }
}

async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>, ChatError> {
    let result = JsFuture::from(reader.read()).await.map_err(js_error)?;
    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(js_error)?
        .as_bool()
        .unwrap_or(false);
    if done {
        return Ok(None);
    }
    let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_error)?;
    Ok(Some(Uint8Array::new(&value).to_vec()))
}

fn js_error(err: JsValue) -> ChatError {
    ChatError::Network(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
