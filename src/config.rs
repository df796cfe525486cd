use std::time::Duration;

use crate::errors::ChatError;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_DEFERRALS: usize = 3;

/// Tuning for the SSE decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How many times a `data:` line whose JSON fails to parse is left in the
    /// buffer waiting for more bytes before it is dropped.
    pub max_deferrals: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { max_deferrals: DEFAULT_MAX_DEFERRALS }
    }
}

/// Settings for the native client, normally read from the environment
/// (a `.env` file is loaded first by the binary).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub chat_url: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub decoder: DecoderConfig,
}

impl ClientConfig {
    pub fn new(chat_url: impl Into<String>) -> Self {
        Self {
            chat_url: chat_url.into(),
            api_key: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            decoder: DecoderConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let chat_url = get("CHAT_URL")
            .ok_or_else(|| ChatError::Config("CHAT_URL must be set (copy .env.example to .env)".into()))?;

        let mut config = Self::new(chat_url.trim());
        config.api_key = get("CHAT_API_KEY");

        if let Some(raw) = get("CHAT_CONNECT_TIMEOUT_SECS") {
            let secs = parse_number::<u64>("CHAT_CONNECT_TIMEOUT_SECS", &raw)?;
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("CHAT_MAX_DEFERRALS") {
            config.decoder.max_deferrals = parse_number("CHAT_MAX_DEFERRALS", &raw)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ChatError> {
    raw.trim()
        .parse()
        .map_err(|_| ChatError::Config(format!("{key} must be a non-negative integer, got '{raw}'")))
}
