use serde::Deserialize;

/// A user object as returned by the API. Fields not named here are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: ApiCompany,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCompany {
    pub name: String,
}

/// One row of the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company_name: String,
}

impl From<ApiUser> for UserRecord {
    fn from(user: ApiUser) -> Self {
        UserRecord {
            id: user.id,
            name: user.name,
            email: user.email,
            company_name: user.company.name,
        }
    }
}

/// Storage class of a batch column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
}

/// Ordered columns of every [`RecordBatch`].
pub const USER_SCHEMA: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("name", ColumnKind::Text),
    ("email", ColumnKind::Text),
    ("company_name", ColumnKind::Text),
];

/// In-memory table produced by extraction and consumed by loading.
/// Row order is the API response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBatch {
    records: Vec<UserRecord>,
}

impl RecordBatch {
    pub fn new(records: Vec<UserRecord>) -> Self {
        RecordBatch { records }
    }

    pub fn schema(&self) -> &'static [(&'static str, ColumnKind)] {
        USER_SCHEMA
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> {
        USER_SCHEMA.iter().map(|(name, _)| *name)
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<UserRecord> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = UserRecord>>(iter: I) -> Self {
        RecordBatch::new(iter.into_iter().collect())
    }
}
