use anyhow::{Context, Result};
use shared::{server, Config, Pipeline};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pipeline = Pipeline::from_config(&config).context("Failed to initialize pipeline")?;

    if pipeline.relay_enabled() {
        tracing::info!("webhook relay enabled");
    }

    server::serve(&config.listen_addr, Arc::new(pipeline))
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
