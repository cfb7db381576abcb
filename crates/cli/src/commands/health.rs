//! Health command handler.

use clap::Args;
use staffdesk_core::{config::AppConfig, AppResult};
use staffdesk_engine::Engine;

/// Show engine status
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let engine = Engine::new(config.clone()).await?;
        let health = engine.health().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&health)?);
        } else {
            println!("records:  {}", health.record_count);
            println!("chunks:   {}", health.chunk_count);
            println!("backend:  {}", health.index_backend);
        }
        Ok(())
    }
}
