//! Serve command handler.

use clap::Args;
use kba_core::{config::AppConfig, AppResult};

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Socket address to bind (default: 127.0.0.1:8000)
    #[arg(short, long, env = "KBA_BIND")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting API on {}", config.server.bind);
        kba_api::serve(config.clone()).await
    }
}
