//! Generation service integration for staffdesk.
//!
//! This crate provides a provider-agnostic abstraction for the optional
//! text-generation backend used to rephrase templated answers. The engine
//! treats it as a narrow interface (prompt in, text out) invoked with a
//! bounded timeout and a single attempt. A failing or absent generation
//! service never affects answer correctness; the caller falls back to its
//! deterministic narrative.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use staffdesk_llm::{GenClient, GenRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new()?;
//! let request = GenRequest::new("Rephrase this answer.", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{GenClient, GenRequest, GenResponse};
pub use factory::create_client;
pub use providers::OllamaClient;
