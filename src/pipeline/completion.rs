//! HTTP client for the text completion service.
//!
//! A completion failure is its own error class: the caller must never see
//! a transport error string where structured data was expected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::CompletionClient;
use crate::config::CompletionConfig;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Cannot reach completion service at {0}")]
    Connection(String),

    #[error("Completion request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Completion service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse completion response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
///
/// Stateless: the blocking reqwest client is built per call, so `generate`
/// must run on a blocking thread (the pipeline always does).
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Request body for `/api/generate`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from `/api/generate`
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl CompletionClient for OllamaClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                CompletionError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                CompletionError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                CompletionError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CompletionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock completion client for testing — returns a configured response or
/// fails with a connection error.
pub struct MockCompletionClient {
    outcome: Result<String, String>,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
        }
    }

    pub fn failing(base_url: &str) -> Self {
        Self {
            outcome: Err(base_url.to_string()),
        }
    }
}

impl CompletionClient for MockCompletionClient {
    fn generate(&self, _system: &str, _prompt: &str) -> Result<String, CompletionError> {
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(url) => Err(CompletionError::Connection(url.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CompletionConfig {
        CompletionConfig {
            base_url: "http://localhost:11434/".into(),
            model: "llama3".into(),
            temperature: 1.0,
            timeout_secs: 30,
        }
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OllamaClient::new(&test_config());
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn mock_returns_configured_response() {
        let client = MockCompletionClient::new(r#"{"report_id": null}"#);
        let result = client.generate("system", "prompt").unwrap();
        assert_eq!(result, r#"{"report_id": null}"#);
    }

    #[test]
    fn mock_failure_is_a_connection_error() {
        let client = MockCompletionClient::failing("http://localhost:11434");
        let err = client.generate("system", "prompt").unwrap_err();
        assert!(matches!(err, CompletionError::Connection(_)));
    }

    #[test]
    fn request_body_serializes_temperature() {
        let body = GenerateRequest {
            model: "llama3",
            prompt: "p",
            system: "s",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["options"]["temperature"], 0.5);
        assert_eq!(json["stream"], false);
    }
}
