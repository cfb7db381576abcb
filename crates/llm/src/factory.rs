//! Generation provider factory.
//!
//! Creates generation clients from the configured provider name. The
//! "none" provider is resolved by the engine itself (no client, templated
//! narratives only) and is rejected here.

use crate::client::GenClient;
use crate::providers::OllamaClient;
use staffdesk_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout_ms` - Bounded request timeout for every completion call
///
/// # Errors
/// Returns `AppError::Config` for unknown or disabled providers.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout_ms: u64,
) -> AppResult<Arc<dyn GenClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_settings(base_url, timeout_ms)?;
            Ok(Arc::new(client))
        }
        "none" => Err(AppError::Config(
            "Generation is disabled; no client to create".to_string(),
        )),
        other => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}
