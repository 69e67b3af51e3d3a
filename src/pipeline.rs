use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::etl::{ETLPipeline, PipelineError};
use crate::extract::{RecordBatch, UsersClient};
use crate::load::PostgresLoader;
use crate::transform::DbtRunner;

/// Users API -> Postgres -> dbt.
pub struct UsersPipeline {
    client: UsersClient,
    loader: PostgresLoader,
    dbt: DbtRunner,
    table_name: String,
}

impl UsersPipeline {
    pub fn new(
        client: UsersClient,
        loader: PostgresLoader,
        dbt: DbtRunner,
        table_name: impl Into<String>,
    ) -> Self {
        UsersPipeline {
            client,
            loader,
            dbt,
            table_name: table_name.into(),
        }
    }

    /// Builds every stage from `config`. The database pool is lazy and is
    /// first used by the load stage.
    pub async fn connect(config: &Config) -> Result<Self, PipelineError> {
        let client = UsersClient::new(config)?;
        let loader = PostgresLoader::connect(config).await?;
        let dbt = DbtRunner::new(config.dbt());
        Ok(Self::new(client, loader, dbt, config.table_name()))
    }
}

#[async_trait]
impl ETLPipeline<RecordBatch> for UsersPipeline {
    async fn extract(&self, _cancel: &CancellationToken) -> Result<RecordBatch, PipelineError> {
        self.client.fetch_users().await
    }

    async fn load(
        &self,
        _cancel: &CancellationToken,
        batch: RecordBatch,
    ) -> Result<usize, PipelineError> {
        self.loader.load(&batch, &self.table_name).await
    }

    async fn transform(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        self.dbt.run().await.map(|_| ())
    }

    async fn pre_process(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        info!(source = %self.client.url(), table = %self.table_name, "starting ELT pipeline");
        Ok(())
    }
}
