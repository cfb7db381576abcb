//! Embedding provider implementations.

pub mod lexical;
pub mod ollama;

pub use lexical::LexicalProvider;
pub use ollama::OllamaProvider;
