use reqwest::Client;
use tracing::info;

use super::model::{ApiUser, RecordBatch, UserRecord};
use crate::config::Config;
use crate::etl::PipelineError;

/// HTTP client for the users endpoint.
pub struct UsersClient {
    http: Client,
    url: String,
}

impl UsersClient {
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::with_client(http, config.users_url()))
    }

    /// Uses an already configured `reqwest::Client`.
    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches every user in a single GET and flattens them into a batch.
    ///
    /// Network errors, non-2xx statuses and malformed bodies all fail the
    /// whole call; no partial batch is returned.
    pub async fn fetch_users(&self) -> Result<RecordBatch, PipelineError> {
        info!(url = %self.url, "fetching users");

        let body = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let batch = parse_users(&body)?;
        info!(records = batch.len(), "extracted users");
        Ok(batch)
    }
}

/// Parses a JSON array of users, moving `company.name` up into
/// `company_name` and keeping only the four table columns.
pub fn parse_users(body: &[u8]) -> Result<RecordBatch, PipelineError> {
    let users: Vec<ApiUser> = serde_json::from_slice(body)?;
    Ok(users.into_iter().map(UserRecord::from).collect())
}
