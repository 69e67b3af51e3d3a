use std::fmt;

/// Errors that can occur while running the ELT job
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to build statement: {0}")]
    Statement(#[from] sea_orm::sea_query::error::Error),

    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dbt run failed: {stderr}")]
    TransformFailed { code: Option<i32>, stderr: String },

    #[error("Cancellation requested")]
    Cancelled,
}

/// Job state machine. A run only ever moves forward through
/// `Pending -> Extracting -> Loading -> Transforming` and ends in
/// `Succeeded` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Extracting,
    Loading,
    Transforming,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "pending",
            JobState::Extracting => "extracting",
            JobState::Loading => "loading",
            JobState::Transforming => "transforming",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}
