//! Reindex command handler.

use clap::Args;
use staffdesk_core::{config::AppConfig, AppResult};
use staffdesk_engine::Engine;

/// Rebuild the semantic policy index from the current policy text
#[derive(Args, Debug)]
pub struct ReindexCommand {}

impl ReindexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reindex command");

        let engine = Engine::new(config.clone()).await?;
        engine.rebuild_index().await?;

        let health = engine.health().await;
        println!(
            "Rebuilt index: {} chunks ({} backend)",
            health.chunk_count, health.index_backend
        );
        Ok(())
    }
}
