/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identity columns carried by every persisted row.
///
/// Both values are assigned by the database on insert and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RowMeta {
    pub id: DbId,
    pub created_at: Timestamp,
}
