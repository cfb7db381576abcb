//! Query-understanding and retrieval-routing engine.
//!
//! Pipeline: raw query -> intent classifier -> entity extractor ->
//! router/retriever -> (record store and/or semantic index) -> response
//! composer -> answer payload. Every stage is deterministic except the
//! optional generation refinement, which is bounded, single-attempt, and
//! falls back to the templated narrative on any failure.

pub mod composer;
pub mod engine;
pub mod entities;
pub mod intent;
pub mod prompt;
pub mod router;
pub mod types;

pub use engine::Engine;
pub use entities::extract;
pub use intent::classify;
pub use router::resolve;
pub use types::{
    AnswerPayload, Confidence, ExtractedEntities, Fact, Health, MatchQuality, Missing,
    QueryIntent, Retrieval,
};
