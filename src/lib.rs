//! # users-elt
//!
//! A small Extract-Load-Transform job built on Tokio: pull users from an
//! HTTP API, replace a Postgres table with them, then hand off to `dbt`.
//!
//! ## Flow
//!
//! - **Extract** - one GET, `company.name` flattened to `company_name`,
//!   projected to `id, name, email, company_name`
//! - **Load** - drop, recreate and insert inside one transaction
//! - **Transform** - `dbt run --profiles-dir ../` from `dbt/`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use users_elt::config::Config;
//! use users_elt::etl::ETL;
//! use users_elt::pipeline::UsersPipeline;
//!
//! let config = Config::from_env()?;
//! let pipeline = UsersPipeline::connect(&config).await?;
//! let etl = ETL::new(Arc::new(pipeline), "etl_pipeline");
//! let report = etl.run(&CancellationToken::new()).await?;
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven settings
//! - [`etl`] - Stage runner, job states and errors
//! - [`extract`] - Users API client and record batch
//! - [`load`] - Postgres table replacement
//! - [`transform`] - dbt subprocess trigger
//! - [`pipeline`] - The three stages wired together

pub mod config;
pub mod etl;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;

#[cfg(test)]
mod test_support;
