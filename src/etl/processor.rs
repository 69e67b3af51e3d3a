use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::types::{JobState, PipelineError};

/// Defines an ELT (Extract-Load-Transform) job.
///
/// # Type Parameters
///
/// * `B` - The batch produced by extraction and consumed by loading
///
/// # Lifecycle
///
/// 1. `pre_process()` - Setup before extraction
/// 2. `extract()` - Produce the whole batch from the source
/// 3. `load()` - Persist the batch, returning the number of rows written
/// 4. `transform()` - Run downstream transformations over the loaded data
/// 5. `post_process()` - Cleanup after a successful run
#[async_trait]
pub trait ETLPipeline<B> {
    /// Extracts a complete batch from the data source.
    ///
    /// No partial batch is ever handed to `load`: an error here ends the run.
    async fn extract(&self, cancel: &CancellationToken) -> Result<B, PipelineError>;

    /// Loads the batch into the destination. Takes ownership of the batch.
    async fn load(&self, cancel: &CancellationToken, batch: B) -> Result<usize, PipelineError>;

    /// Triggers the transformation step once the load has completed.
    async fn transform(&self, cancel: &CancellationToken) -> Result<(), PipelineError>;

    /// Pre-processing hook called before extraction starts.
    async fn pre_process(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Post-processing hook called after the transformation succeeds.
    async fn post_process(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub job: String,
    pub records_loaded: usize,
    /// Every state the run passed through, in order.
    pub states: Vec<JobState>,
    pub elapsed: Duration,
}

/// Executor for ELT pipelines.
///
/// Wraps an [`ETLPipeline`] implementation and drives it through its
/// stages one after another. There is no branching and no parallelism:
/// the first failing stage terminates the run.
pub struct ETL<B> {
    etl: Arc<dyn ETLPipeline<B> + Send + Sync>,
    name: String,
}

impl<B> ETL<B>
where
    B: Send + 'static,
{
    /// Creates a new ETL from a pipeline implementation.
    pub fn new(etl: Arc<dyn ETLPipeline<B> + Send + Sync>, name: impl Into<String>) -> Self {
        ETL {
            etl,
            name: name.into(),
        }
    }

    /// Creates a new ETL from a boxed pipeline implementation.
    ///
    /// Convenience constructor for when you have a `Box<dyn ETLPipeline>`.
    pub fn from_box(etl: Box<dyn ETLPipeline<B> + Send + Sync>, name: impl Into<String>) -> Self {
        ETL {
            etl: Arc::from(etl),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let mut run = JobRun::new(&self.name);

        match self.run_stages(cancel, &mut run).await {
            Ok(records_loaded) => {
                run.advance(JobState::Succeeded);
                let report = RunReport {
                    job: self.name.clone(),
                    records_loaded,
                    states: run.states,
                    elapsed: start.elapsed(),
                };
                info!(
                    job = %report.job,
                    records = report.records_loaded,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "job run succeeded"
                );
                Ok(report)
            }
            Err(e) => {
                let failed_in = run.current();
                run.advance(JobState::Failed);
                error!(job = %self.name, stage = %failed_in, error = %e, "job run failed");
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        cancel: &CancellationToken,
        run: &mut JobRun<'_>,
    ) -> Result<usize, PipelineError> {
        guard(cancel, self.etl.pre_process(cancel)).await?;

        run.advance(JobState::Extracting);
        let batch = guard(cancel, self.etl.extract(cancel)).await?;

        run.advance(JobState::Loading);
        let loaded = guard(cancel, self.etl.load(cancel, batch)).await?;

        run.advance(JobState::Transforming);
        guard(cancel, self.etl.transform(cancel)).await?;

        guard(cancel, self.etl.post_process(cancel)).await?;
        Ok(loaded)
    }
}

/// Races a stage against cancellation. A token that is already cancelled
/// stops the stage from starting at all.
async fn guard<T, F>(cancel: &CancellationToken, stage: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = stage => result,
    }
}

struct JobRun<'a> {
    job: &'a str,
    states: Vec<JobState>,
}

impl<'a> JobRun<'a> {
    fn new(job: &'a str) -> Self {
        JobRun {
            job,
            states: vec![JobState::Pending],
        }
    }

    fn current(&self) -> JobState {
        self.states.last().copied().unwrap_or(JobState::Pending)
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            !self.current().is_terminal(),
            "job already finished as {}",
            self.current()
        );
        info!(job = self.job, from = %self.current(), to = %next, "job state changed");
        self.states.push(next);
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
