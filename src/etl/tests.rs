use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Copy, PartialEq)]
enum FailAt {
    Nowhere,
    Extract,
    Load,
    Transform,
}

// Mock pipeline for testing
struct MockPipeline {
    extract_count: Arc<AtomicUsize>,
    load_count: Arc<AtomicUsize>,
    transform_count: Arc<AtomicUsize>,
    post_count: Arc<AtomicUsize>,
    fail_at: FailAt,
}

impl MockPipeline {
    fn new(fail_at: FailAt) -> Self {
        MockPipeline {
            extract_count: Arc::new(AtomicUsize::new(0)),
            load_count: Arc::new(AtomicUsize::new(0)),
            transform_count: Arc::new(AtomicUsize::new(0)),
            post_count: Arc::new(AtomicUsize::new(0)),
            fail_at,
        }
    }
}

#[async_trait]
impl ETLPipeline<Vec<i32>> for MockPipeline {
    async fn extract(&self, _cancel: &CancellationToken) -> Result<Vec<i32>, PipelineError> {
        self.extract_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Extract {
            return Err(PipelineError::Configuration("mock extract failed".into()));
        }
        Ok(vec![1, 2, 3, 4, 5])
    }

    async fn load(
        &self,
        _cancel: &CancellationToken,
        batch: Vec<i32>,
    ) -> Result<usize, PipelineError> {
        self.load_count.fetch_add(batch.len(), Ordering::SeqCst);
        if self.fail_at == FailAt::Load {
            return Err(PipelineError::Configuration("mock load failed".into()));
        }
        Ok(batch.len())
    }

    async fn transform(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        self.transform_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Transform {
            return Err(PipelineError::TransformFailed {
                code: Some(1),
                stderr: "model failed".into(),
            });
        }
        Ok(())
    }

    async fn post_process(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
        self.post_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_etl_full_flow() {
    let pipeline = MockPipeline::new(FailAt::Nowhere);
    let extract_count = Arc::clone(&pipeline.extract_count);
    let load_count = Arc::clone(&pipeline.load_count);
    let transform_count = Arc::clone(&pipeline.transform_count);
    let post_count = Arc::clone(&pipeline.post_count);

    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(pipeline), "test_job");
    let cancel = CancellationToken::new();

    let report = etl.run(&cancel).await.unwrap();

    assert_eq!(report.job, "test_job");
    assert_eq!(report.records_loaded, 5);
    assert_eq!(
        report.states,
        vec![
            JobState::Pending,
            JobState::Extracting,
            JobState::Loading,
            JobState::Transforming,
            JobState::Succeeded,
        ]
    );
    assert_eq!(
        report.states.iter().filter(|s| s.is_terminal()).count(),
        1
    );
    assert_eq!(extract_count.load(Ordering::SeqCst), 1);
    assert_eq!(load_count.load(Ordering::SeqCst), 5);
    assert_eq!(transform_count.load(Ordering::SeqCst), 1);
    assert_eq!(post_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_extract_failure_skips_load_and_transform() {
    let pipeline = MockPipeline::new(FailAt::Extract);
    let load_count = Arc::clone(&pipeline.load_count);
    let transform_count = Arc::clone(&pipeline.transform_count);

    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(pipeline), "test_job");
    let result = etl.run(&CancellationToken::new()).await;

    assert!(matches!(result, Err(PipelineError::Configuration(_))));
    assert_eq!(load_count.load(Ordering::SeqCst), 0);
    assert_eq!(transform_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_load_failure_skips_transform() {
    let pipeline = MockPipeline::new(FailAt::Load);
    let transform_count = Arc::clone(&pipeline.transform_count);
    let post_count = Arc::clone(&pipeline.post_count);

    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(pipeline), "test_job");
    let result = etl.run(&CancellationToken::new()).await;

    assert!(result.is_err());
    assert_eq!(transform_count.load(Ordering::SeqCst), 0);
    assert_eq!(post_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transform_failure_surfaces_stderr() {
    let pipeline = MockPipeline::new(FailAt::Transform);
    let post_count = Arc::clone(&pipeline.post_count);

    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(pipeline), "test_job");
    let err = etl.run(&CancellationToken::new()).await.unwrap_err();

    assert!(err.to_string().contains("model failed"));
    assert_eq!(post_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let pipeline = MockPipeline::new(FailAt::Nowhere);
    let extract_count = Arc::clone(&pipeline.extract_count);

    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(pipeline), "test_job");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = etl.run(&cancel).await;

    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(extract_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_interrupts_hanging_stage() {
    struct HangingPipeline;

    #[async_trait]
    impl ETLPipeline<()> for HangingPipeline {
        async fn extract(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn load(&self, _cancel: &CancellationToken, _batch: ()) -> Result<usize, PipelineError> {
            Ok(0)
        }

        async fn transform(&self, _cancel: &CancellationToken) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    let etl: ETL<()> = ETL::new(Arc::new(HangingPipeline), "hanging");
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_clone.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), etl.run(&cancel))
        .await
        .expect("run should stop once cancelled");
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

#[test]
fn test_etl_name() {
    let etl: ETL<Vec<i32>> = ETL::from_box(Box::new(MockPipeline::new(FailAt::Nowhere)), "named");
    assert_eq!(etl.name(), "named");
}
