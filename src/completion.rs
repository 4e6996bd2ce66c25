//! Language-model completion client
//!
//! One client is constructed at startup and reused for every message cycle.
//! Sampling is fixed and deterministic; the reply is the first candidate's
//! text, trimmed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default completion model
pub const DEFAULT_MODEL: &str = "text-davinci-003";

/// Completions endpoint
const COMPLETION_URL: &str = "https://api.openai.com/v1/completions";

/// Hard ceiling on generated tokens
const MAX_TOKENS: u32 = 2048;

/// Nucleus sampling parameter
const TOP_P: f32 = 0.5;

/// Stop sequence
const STOP: &[&str] = &["4"];

/// Per-request timeout; a stalled call aborts only its own cycle
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Seam for the completion service, so cycles can be tested without HTTP
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate text for a prompt
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// HTTP client for the completion service
#[derive(Debug)]
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Create a new completion client
    ///
    /// # Errors
    ///
    /// Returns `Config` if the API key is empty or the HTTP client cannot
    /// be built.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("completion API key required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Model this client requests completions from
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: STOP,
        };

        let response = self
            .client
            .post(COMPLETION_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("{status} - {body}")));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("malformed response: {e}")))?;

        let text = parsed
            .choices
            .first()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| Error::Completion("response contained no choices".to_string()))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = CompletionClient::new(String::new(), DEFAULT_MODEL.to_string()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn request_serializes_fixed_sampling() {
        let request = CompletionRequest {
            model: DEFAULT_MODEL,
            prompt: "hello",
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: STOP,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["top_p"], 0.5);
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["stop"][0], "4");
    }

    #[test]
    fn response_parses_first_choice() {
        let raw = r#"{"choices": [{"text": "  It is 3 PM.  "}, {"text": "other"}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].text.trim(), "It is 3 PM.");
    }
}
