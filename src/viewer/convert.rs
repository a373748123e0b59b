use serde_json::{Value, json};
use std::sync::LazyLock;

use super::error::ViewerError;
use super::log;

static CODE_FENCE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?s)```[\w-]*[ \t]*\r?\n?(.*?)```").expect("valid code fence regex")
});

pub const PLACEHOLDER_EVENT: &str = "Converted Game";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_version: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            max_tokens: 4096,
            api_version: "2023-06-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP POST supplied by the host. `Err` is a transport-level
/// failure (no response at all).
pub trait Transport {
    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str)
    -> Result<HttpResponse, String>;
}

/// Turns book notation into PGN text with per-move comments.
pub trait NotationConverter {
    fn convert(
        &self,
        notation: &str,
        credential: &str,
        system_prompt: &str,
    ) -> Result<String, ViewerError>;
}

/// Converter backed by a remote messages-style text generation endpoint.
pub struct RemoteConverter<T> {
    transport: T,
    config: ConverterConfig,
}

impl<T: Transport> RemoteConverter<T> {
    pub fn new(transport: T, config: ConverterConfig) -> Self {
        Self { transport, config }
    }

    pub fn request_body(&self, notation: &str, system_prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system_prompt,
            "messages": [
                { "role": "user", "content": notation }
            ]
        })
    }
}

impl<T: Transport> NotationConverter for RemoteConverter<T> {
    fn convert(
        &self,
        notation: &str,
        credential: &str,
        system_prompt: &str,
    ) -> Result<String, ViewerError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ViewerError::MissingCredential);
        }

        let body = self.request_body(notation, system_prompt).to_string();
        let headers = [
            ("content-type", "application/json"),
            ("x-api-key", credential),
            ("anthropic-version", self.config.api_version.as_str()),
        ];

        log::info(format!(
            "requesting conversion of {} bytes from {}",
            notation.len(),
            self.config.endpoint
        ));
        let response = self
            .transport
            .post(&self.config.endpoint, &headers, &body)
            .map_err(ViewerError::RemoteFailure)?;

        parse_response(&response)
    }
}

/// Extracts the generated text, or the remote error message on failure.
pub fn parse_response(response: &HttpResponse) -> Result<String, ViewerError> {
    let parsed = serde_json::from_str::<Value>(&response.body);

    if !response.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(|v| v.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let body = response.body.trim();
                if body.is_empty() {
                    format!("HTTP {}", response.status)
                } else {
                    format!("HTTP {}: {}", response.status, body)
                }
            });
        return Err(ViewerError::RemoteFailure(message));
    }

    let value = parsed.map_err(|e| ViewerError::RemoteFailure(format!("invalid response: {e}")))?;

    let text: String = value
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ViewerError::RemoteFailure("empty response".to_string()));
    }
    Ok(text)
}

/// Unwraps a markdown code fence if present and makes sure an `[Event` tag
/// exists so the result reads as standard PGN.
pub fn normalize_converted_pgn(text: &str) -> String {
    let inner = match CODE_FENCE_RE.captures(text) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => text,
    };
    let pgn = inner.trim();

    if pgn.contains("[Event ") {
        pgn.to_string()
    } else if pgn.starts_with('[') {
        format!("[Event \"{PLACEHOLDER_EVENT}\"]\n{pgn}")
    } else {
        format!("[Event \"{PLACEHOLDER_EVENT}\"]\n\n{pgn}")
    }
}
