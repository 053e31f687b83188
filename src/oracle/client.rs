//! Oracle backends: the single-call seam and the HTTP messages client.

use crate::config::OracleConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CLASSIFY_INSTRUCTION: &str = "You are a US state classifier. Given a police or law enforcement agency name,
extract the US state abbreviation (2 letters like AL, TX, CA, etc).

If the name clearly references a specific state/city, return that state abbreviation.
If it's a federal agency or national organization, return \"DC\".
If you cannot determine the state with reasonable confidence, return \"UNKNOWN\".

Respond with ONLY the state abbreviation, nothing else.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("oracle returned HTTP {0}")]
    Status(u16),
    #[error("invalid oracle response: {0}")]
    Malformed(String),
}

/// One free-text question, one short text answer.
pub trait OracleBackend {
    fn ask(&self, raw_name: &str) -> Result<String, OracleError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Pull the first text block out of a messages-API response body.
pub fn response_text(body: serde_json::Value) -> Result<String, OracleError> {
    let parsed: MessagesResponse =
        serde_json::from_value(body).map_err(|e| OracleError::Malformed(e.to_string()))?;
    parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| OracleError::Malformed("no text content".into()))
}

/// Messages-API client (Anthropic wire format).
pub struct MessagesBackend {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_version: String,
    api_key: String,
    max_tokens: u32,
}

impl MessagesBackend {
    /// `None` when no credential is configured.
    pub fn from_config(config: &OracleConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Some(Self {
            agent,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            api_key,
            max_tokens: config.max_tokens,
        })
    }
}

impl OracleBackend for MessagesBackend {
    fn ask(&self, raw_name: &str) -> Result<String, OracleError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: CLASSIFY_INSTRUCTION,
            messages: vec![Message {
                role: "user",
                content: format!("Organization name: {}", raw_name),
            }],
        };

        let response = self
            .agent
            .post(&self.endpoint)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", &self.api_version)
            .set("content-type", "application/json")
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => OracleError::Status(code),
                ureq::Error::Transport(t) => OracleError::Transport(t.to_string()),
            })?;

        let body: serde_json::Value = response
            .into_json()
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        response_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text() {
        let body = json!({"content": [{"type": "text", "text": " al\n"}]});
        assert_eq!(response_text(body).unwrap(), " al\n");
    }

    #[test]
    fn test_response_without_text() {
        assert!(matches!(response_text(json!({"content": []})), Err(OracleError::Malformed(_))));
        assert!(matches!(response_text(json!({"content": "x"})), Err(OracleError::Malformed(_))));
    }

    #[test]
    fn test_backend_requires_key() {
        assert!(MessagesBackend::from_config(&OracleConfig::default()).is_none());
        let config = OracleConfig { api_key: Some("k".into()), ..OracleConfig::default() };
        assert!(MessagesBackend::from_config(&config).is_some());
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 50,
            system: CLASSIFY_INSTRUCTION,
            messages: vec![Message { role: "user", content: "Organization name: X".into() }],
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["max_tokens"], 50);
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "Organization name: X");
    }
}
