pub mod dbt;

pub use dbt::DbtRunner;
