//! `HttpTransport` against a local axum server that streams SSE bodies.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::stream;
use serde_json::{json, Value};

use chat_stream::transport::HttpTransport;
use chat_stream::{ChatError, ChatService, ClientConfig, Message, TurnOutcome};
use common::{delta, done, rechunk};

#[derive(Clone)]
struct MockEndpoint {
    status: StatusCode,
    chunks: Arc<Vec<Vec<u8>>>,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl MockEndpoint {
    fn streaming(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            chunks: Arc::new(chunks),
            seen: Arc::default(),
        }
    }

    fn failing(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            chunks: Arc::new(vec![body.as_bytes().to_vec()]),
            seen: Arc::default(),
        }
    }
}

async fn chat_handler(
    State(mock): State<MockEndpoint>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.seen.lock().unwrap().push((auth, body));

    if !mock.status.is_success() {
        let body = mock.chunks.concat();
        return (mock.status, body).into_response();
    }

    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = mock.chunks.iter().cloned().map(Ok).collect();
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream::iter(chunks)))
        .unwrap()
}

/// Serves `mock` on an ephemeral port and returns a client config pointing at it.
async fn serve(mock: MockEndpoint) -> ClientConfig {
    let app = Router::new()
        .route("/functions/v1/chat", post(chat_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = ClientConfig::new(format!("http://{addr}/functions/v1/chat"));
    config.connect_timeout = Duration::from_secs(5);
    config
}

#[tokio::test]
async fn streams_a_reply_split_mid_character() {
    let parts = vec![
        b": OPENROUTER PROCESSING\n\n".to_vec(),
        delta("Ça "),
        delta("va ✓"),
        done(),
    ];
    let mock = MockEndpoint::streaming(rechunk(&parts, 5));
    let seen = Arc::clone(&mock.seen);
    let mut config = serve(mock).await;
    config.api_key = Some("test-key".into());

    let svc = ChatService::new(HttpTransport::new(&config).unwrap(), config.decoder.clone());
    let outcome = svc.send_message("Comment ça va ?", |_| {}).await;

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(
        *svc.snapshot().messages,
        vec![Message::user("Comment ça va ?"), Message::assistant("Ça va ✓")]
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("Bearer test-key"));
    assert_eq!(
        seen[0].1,
        json!({"messages": [{"role": "user", "content": "Comment ça va ?"}]})
    );
}

#[tokio::test]
async fn json_error_field_becomes_the_notice() {
    let mock = MockEndpoint::failing(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":"Rate limits exceeded, please try again later."}"#,
    );
    let config = serve(mock).await;
    let svc = ChatService::new(HttpTransport::new(&config).unwrap(), config.decoder.clone());

    let outcome = svc.send_message("hi", |_| {}).await;

    assert_eq!(
        outcome,
        TurnOutcome::Failed(ChatError::transport(
            429,
            "Rate limits exceeded, please try again later."
        ))
    );
    assert!(svc.snapshot().messages.is_empty());
    assert!(!svc.snapshot().in_flight);
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status_line() {
    let mock = MockEndpoint::failing(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
    let config = serve(mock).await;
    let svc = ChatService::new(HttpTransport::new(&config).unwrap(), config.decoder.clone());

    let outcome = svc.send_message("hi", |_| {}).await;

    assert_eq!(
        outcome.notice().as_deref(),
        Some("HTTP error! status: 500 Internal Server Error")
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(format!("http://{addr}/functions/v1/chat"));
    let svc = ChatService::new(HttpTransport::new(&config).unwrap(), config.decoder.clone());

    let outcome = svc.send_message("anyone there?", |_| {}).await;

    assert!(matches!(outcome, TurnOutcome::Failed(ChatError::Network(_))));
    assert!(svc.snapshot().messages.is_empty());
}
