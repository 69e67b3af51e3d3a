use std::path::PathBuf;
use tokio::process::Command;
use tracing::info;

use crate::config::DbtConfig;
use crate::etl::PipelineError;

/// Runs the external transformation tool as a child process.
#[derive(Debug, Clone)]
pub struct DbtRunner {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl DbtRunner {
    pub fn new(config: &DbtConfig) -> Self {
        DbtRunner {
            program: config.program().to_string(),
            args: config.args().to_vec(),
            working_dir: config.working_dir().to_path_buf(),
        }
    }

    /// Runs the command to completion, capturing stdout and stderr.
    ///
    /// Returns the captured stdout on exit code 0. Any other exit fails with
    /// the captured stderr. The child is killed if this future is dropped.
    pub async fn run(&self) -> Result<String, PipelineError> {
        info!(
            program = %self.program,
            args = ?self.args,
            dir = %self.working_dir.display(),
            "running transformation"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PipelineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(PipelineError::TransformFailed {
                code: output.status.code(),
                stderr,
            });
        }

        info!("dbt run completed successfully");
        info!("{}", stdout);
        Ok(stdout)
    }
}
