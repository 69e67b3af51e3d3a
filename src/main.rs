use std::error::Error;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use users_elt::config::Config;
use users_elt::etl::ETL;
use users_elt::extract::RecordBatch;
use users_elt::pipeline::UsersPipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()
        .map_err(|e| format!("Failed to load configuration: {}. Check your .env file.", e))?;

    let pipeline = UsersPipeline::connect(&config)
        .await
        .map_err(|e| format!("Failed to initialise pipeline: {}", e))?;
    let etl: ETL<RecordBatch> = ETL::new(Arc::new(pipeline), "etl_pipeline");

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        warn!("shutdown signal received");
        cancel_clone.cancel();
    });

    // Outcome is logged by the runner; a failed run exits non-zero.
    etl.run(&cancel_token).await?;
    Ok(())
}
