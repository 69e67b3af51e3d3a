pub mod postgres;

pub use postgres::PostgresLoader;
