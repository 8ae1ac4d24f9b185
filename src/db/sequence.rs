use crate::error::QuillError;
use sqlx::{Connection, Database, Executor, FromRow, IntoArguments, Transaction};
use tracing::debug;

/// Counter table backing blog entry ids.
pub const BLOG_ENTRY_SEQUENCE: &str = "blog_entry_sequence";

/// Hands out ids from a single persisted counter row.
///
/// One statement bumps the counter and returns the value it held before, so
/// two concurrent callers never observe the same value. The counter is never
/// mirrored in memory.
#[derive(Clone, Debug)]
pub struct SequenceAllocator {
    table: String,
    statement: String,
}

impl SequenceAllocator {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let statement = format!("UPDATE {table} SET next_id = next_id + 1 RETURNING next_id - 1");
        Self { table, statement }
    }

    pub fn blog_entries() -> Self {
        Self::new(BLOG_ENTRY_SEQUENCE)
    }

    /// Reserve the next id inside the caller's transaction.
    ///
    /// Exactly one counter row must exist; zero or several is an
    /// `AllocationFailed`, and the caller's transaction should be abandoned.
    pub async fn next_id<DB>(&self, tx: &mut Transaction<'_, DB>) -> Result<i64, QuillError>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
        for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
        (i64,): for<'r> FromRow<'r, DB::Row>,
    {
        let ids: Vec<i64> = sqlx::query_scalar(&self.statement)
            .fetch_all(&mut **tx)
            .await?;

        match ids.as_slice() {
            [id] => {
                debug!(table = %self.table, id, "allocated id");
                Ok(*id)
            }
            [] => Err(QuillError::AllocationFailed(format!(
                "counter row missing in {}",
                self.table
            ))),
            many => Err(QuillError::AllocationFailed(format!(
                "{} counter rows in {}",
                many.len(),
                self.table
            ))),
        }
    }

    /// Reserve an id in a short transaction of its own and commit it.
    ///
    /// The id is consumed even if the caller's later work fails, so it can
    /// leave a gap but is never handed out twice.
    pub async fn reserve<DB>(&self, conn: &mut DB::Connection) -> Result<i64, QuillError>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
        for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
        (i64,): for<'r> FromRow<'r, DB::Row>,
    {
        let mut tx = conn.begin().await?;
        let id = self.next_id(&mut tx).await?;
        tx.commit().await?;
        Ok(id)
    }
}
