// src/config.rs

use derive_builder::Builder;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::etl::PipelineError;

pub const DB_CONNECTION_STRING: &str = "DB_CONNECTION_STRING";
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_TABLE_NAME: &str = "raw_users";

/// External transformation command, run as a child process.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DbtConfig {
    #[builder(default = "\"dbt\".to_string()")]
    pub(crate) program: String,

    #[builder(default = "vec![\"run\".into(), \"--profiles-dir\".into(), \"../\".into()]")]
    pub(crate) args: Vec<String>,

    /// Directory the command runs in
    #[builder(default = "PathBuf::from(\"dbt\")")]
    pub(crate) working_dir: PathBuf,
}

impl Default for DbtConfig {
    fn default() -> Self {
        DbtConfig {
            program: "dbt".to_string(),
            args: vec!["run".into(), "--profiles-dir".into(), "../".into()],
            working_dir: PathBuf::from("dbt"),
        }
    }
}

impl DbtConfig {
    /// Returns the dbt executable.
    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments passed to dbt.
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the directory dbt runs in.
    #[inline]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Process-wide settings, built once at startup and passed by reference
/// into each stage.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// Postgres connection URI
    pub(crate) database_url: String,

    #[builder(default = "DEFAULT_USERS_URL.to_string()")]
    pub(crate) users_url: String,

    #[builder(default = "DEFAULT_TABLE_NAME.to_string()")]
    pub(crate) table_name: String,

    /// Rows per INSERT statement
    #[builder(default = "1000")]
    pub(crate) insert_chunk_size: usize,

    /// `None` waits on the API indefinitely
    #[builder(default)]
    pub(crate) http_timeout: Option<Duration>,

    #[builder(default)]
    pub(crate) dbt: DbtConfig,
}

impl Config {
    /// Reads configuration from `.env` and the process environment.
    ///
    /// Fails when `DB_CONNECTION_STRING` is unset, before anything connects.
    pub fn from_env() -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Recognised keys: `DB_CONNECTION_STRING` (required), `USERS_API_URL`,
    /// `ELT_TABLE_NAME`, `DBT_BIN`, `DBT_PROJECT_DIR`, `DBT_PROFILES_DIR`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DB_CONNECTION_STRING)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration(format!("{} not set", DB_CONNECTION_STRING))
            })?;

        let mut dbt = DbtConfigBuilder::default();
        if let Some(program) = lookup("DBT_BIN") {
            dbt.program(program);
        }
        if let Some(dir) = lookup("DBT_PROJECT_DIR") {
            dbt.working_dir(dir);
        }
        if let Some(profiles) = lookup("DBT_PROFILES_DIR") {
            dbt.args(vec!["run".to_string(), "--profiles-dir".to_string(), profiles]);
        }
        let dbt = dbt
            .build()
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        let mut builder = ConfigBuilder::default();
        builder.database_url(database_url).dbt(dbt);
        if let Some(url) = lookup("USERS_API_URL") {
            builder.users_url(url);
        }
        if let Some(table) = lookup("ELT_TABLE_NAME") {
            builder.table_name(table);
        }

        builder
            .build()
            .map_err(|e| PipelineError::Configuration(e.to_string()))
    }

    /// Returns the Postgres connection string.
    #[inline]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the users endpoint URL.
    #[inline]
    pub fn users_url(&self) -> &str {
        &self.users_url
    }

    /// Returns the table the batch replaces.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the number of rows per INSERT statement.
    #[inline]
    pub fn insert_chunk_size(&self) -> usize {
        self.insert_chunk_size
    }

    /// Returns the HTTP request timeout, if any.
    #[inline]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }

    /// Returns the dbt invocation settings.
    #[inline]
    pub fn dbt(&self) -> &DbtConfig {
        &self.dbt
    }
}
