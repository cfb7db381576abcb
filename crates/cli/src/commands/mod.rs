//! Command handlers for the staffdesk CLI.

pub mod ask;
pub mod health;
pub mod reindex;

pub use ask::AskCommand;
pub use health::HealthCommand;
pub use reindex::ReindexCommand;
