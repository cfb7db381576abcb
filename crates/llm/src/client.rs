//! Generation client abstraction and request/response types.

use serde::{Deserialize, Serialize};
use staffdesk_core::AppResult;

/// Text-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenRequest {
    /// The prompt text to send to the generation service
    pub prompt: String,

    /// Model identifier (e.g., "llama3.2")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// System prompt (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl GenRequest {
    /// Create a new request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            system: None,
        }
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text-completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Whether the response was complete
    #[serde(default = "default_true")]
    pub done: bool,
}

fn default_true() -> bool {
    true
}

/// Trait for generation service providers.
///
/// Implementations must honor a bounded request timeout: a hanging backend
/// must turn into an `Err`, never an unbounded wait. Callers make a single
/// attempt and degrade gracefully on failure.
#[async_trait::async_trait]
pub trait GenClient: Send + Sync {
    /// Get the provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &GenRequest) -> AppResult<GenResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenRequest::new("hello", "llama3.2")
            .with_temperature(0.3)
            .with_max_tokens(256)
            .with_system("be brief");

        assert_eq!(request.prompt, "hello");
        assert_eq!(request.model, "llama3.2");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.system.as_deref(), Some("be brief"));
    }

    #[test]
    fn test_response_done_default() {
        let response: GenResponse =
            serde_json::from_str(r#"{"content":"ok","model":"llama3.2"}"#).unwrap();
        assert!(response.done);
    }
}
