use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the conversation. Never edited in place: a growing reply is
/// replaced by a fresh `Message` on every fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Request body POSTed to the completion endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
}

// ── Wire types for `data:` payloads ──────────────────────────────────────────

/// The `delta` object of a streamed chat-completion chunk. Every field is
/// optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChunkDelta {
    /// Text of `choices[0].delta.content`, if present and non-empty. Only the
    /// first choice is looked at, so the shape of later choices and of any
    /// other field never matters. Wrong shapes have no content.
    pub fn content_of(payload: &Value) -> Option<String> {
        let delta = payload.get("choices")?.get(0)?.get("delta")?;
        ChunkDelta::deserialize(delta)
            .ok()?
            .content
            .filter(|content| !content.is_empty())
    }
}

/// Body sent alongside a non-success status.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    /// Accepts both `{"error": "..."}` and `{"error": {"message": "..."}}`.
    pub fn message(&self) -> Option<String> {
        let text = match self.error.as_ref()? {
            Value::String(text) => text.as_str(),
            Value::Object(fields) => fields.get("message")?.as_str()?,
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
