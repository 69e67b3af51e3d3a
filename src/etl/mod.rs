pub mod processor;
pub mod types;

pub use processor::{ETLPipeline, RunReport, ETL};
pub use types::{JobState, PipelineError};
