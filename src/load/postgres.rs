use sea_orm::sea_query::{
    Alias, ColumnDef, InsertStatement, Query, SimpleExpr, Table, TableCreateStatement,
    TableDropStatement,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::config::Config;
use crate::etl::PipelineError;
use crate::extract::{ColumnKind, RecordBatch, UserRecord};

/// Replaces a table's contents with a [`RecordBatch`].
///
/// Drop, create and every insert run inside a single transaction, so a
/// failed load leaves the previous table untouched.
pub struct PostgresLoader {
    db: DatabaseConnection,
    chunk_size: usize,
}

impl PostgresLoader {
    /// Prepares a lazy pool: nothing is dialled until the first load, so an
    /// unreachable database fails the load stage rather than startup.
    pub async fn connect(config: &Config) -> Result<Self, PipelineError> {
        let mut options = ConnectOptions::new(config.database_url());
        options.connect_lazy(true);
        let db = Database::connect(options).await?;
        Ok(Self::new(db, config.insert_chunk_size()))
    }

    pub fn new(db: DatabaseConnection, chunk_size: usize) -> Self {
        PostgresLoader {
            db,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Drops `table_name` (cascading to dependent views and keys),
    /// recreates it from the batch schema and inserts every record.
    /// Returns the number of rows written.
    pub async fn load(&self, batch: &RecordBatch, table_name: &str) -> Result<usize, PipelineError> {
        let backend = self.db.get_database_backend();
        let txn = self.db.begin().await?;

        info!(table = table_name, "dropping table with cascade");
        txn.execute(backend.build(&drop_table(table_name))).await?;
        txn.execute(backend.build(&create_table(table_name, batch))).await?;

        info!(table = table_name, records = batch.len(), "inserting records");
        for chunk in batch.records().chunks(self.chunk_size) {
            let insert = insert_rows(table_name, batch, chunk)?;
            txn.execute(backend.build(&insert)).await?;
        }

        txn.commit().await?;
        info!(table = table_name, records = batch.len(), "loaded records");
        Ok(batch.len())
    }
}

fn drop_table(table_name: &str) -> TableDropStatement {
    Table::drop()
        .table(Alias::new(table_name))
        .if_exists()
        .cascade()
        .to_owned()
}

fn create_table(table_name: &str, batch: &RecordBatch) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(table_name));

    for (name, kind) in batch.schema() {
        let mut column = ColumnDef::new(Alias::new(*name));
        match kind {
            ColumnKind::Integer => {
                column.big_integer();
            }
            ColumnKind::Text => {
                column.text();
            }
        }
        column.not_null();
        stmt.col(&mut column);
    }

    stmt
}

fn insert_rows(
    table_name: &str,
    batch: &RecordBatch,
    rows: &[UserRecord],
) -> Result<InsertStatement, PipelineError> {
    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(table_name))
        .columns(batch.columns().map(Alias::new));

    for row in rows {
        stmt.values(row_values(row))?;
    }

    Ok(stmt)
}

// Order must follow USER_SCHEMA.
fn row_values(row: &UserRecord) -> [SimpleExpr; 4] {
    [
        row.id.into(),
        row.name.clone().into(),
        row.email.clone().into(),
        row.company_name.clone().into(),
    ]
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
