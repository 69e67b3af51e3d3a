pub mod client;
pub mod model;

pub use client::{parse_users, UsersClient};
pub use model::{ApiCompany, ApiUser, ColumnKind, RecordBatch, UserRecord, USER_SCHEMA};
