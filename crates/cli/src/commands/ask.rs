//! Ask command handler.

use clap::Args;
use staffdesk_core::{config::AppConfig, AppResult};
use staffdesk_engine::Engine;

/// Ask a question about staffing data
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Print the full answer payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let engine = Engine::new(config.clone()).await?;
        let payload = engine.answer(&self.query).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            println!("{}", payload.narrative);
            tracing::debug!(
                intent = payload.intent.as_str(),
                facts = payload.facts.len(),
                confidence = ?payload.confidence,
                "Answered"
            );
        }

        Ok(())
    }
}
