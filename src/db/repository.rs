//! Queries against the blog tables. Every function takes a borrowed connection
//! or transaction; opening and closing belongs to the caller.
//!
//! Reads and inserts are generic over the sqlx backend so they run unchanged
//! against SQLite in tests.

use crate::db::models::{BlogEntry, NewBlogEntry, Projection};
use crate::db::schema::{POSTGRES_INIT, SEQUENCE_INIT};
use crate::error::QuillError;
use crate::service::pagination::Page;
use chrono::{DateTime, Utc};
use sqlx::{Database, Encode, Executor, FromRow, IntoArguments, PgConnection, Type};

/// Create tables and seed the counter; idempotent.
pub async fn init_schema(conn: &mut PgConnection) -> Result<(), QuillError> {
    for stmt in POSTGRES_INIT.iter().chain(SEQUENCE_INIT) {
        sqlx::query(stmt).execute(&mut *conn).await?;
    }
    Ok(())
}

pub async fn count_blog_entries<DB>(conn: &mut DB::Connection) -> Result<i64, QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_entries")
        .fetch_one(&mut *conn)
        .await?;
    Ok(total)
}

/// One page of `T`, newest first.
pub async fn fetch_blog_page<DB, T>(
    conn: &mut DB::Connection,
    page: Page,
) -> Result<Vec<T>, QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    T: Projection + for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    i64: for<'q> Encode<'q, DB> + Type<DB>,
{
    let sql = format!(
        "SELECT {} FROM {} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        T::select_list(),
        T::TABLE
    );
    let rows = sqlx::query_as::<DB, T>(&sql)
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Fetch one `T` by an exact key match. A miss is `NotFound`.
pub async fn fetch_by_key<DB, T, K>(
    conn: &mut DB::Connection,
    key_column: &str,
    key: K,
    what: impl FnOnce() -> String,
) -> Result<T, QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    T: Projection + for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    K: for<'q> Encode<'q, DB> + Type<DB> + Send,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE {key_column} = $1",
        T::select_list(),
        T::TABLE
    );
    sqlx::query_as::<DB, T>(&sql)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| QuillError::NotFound(what()))
}

pub async fn fetch_blog_entry<DB>(conn: &mut DB::Connection, id: i64) -> Result<BlogEntry, QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    BlogEntry: for<'r> FromRow<'r, DB::Row>,
    i64: for<'q> Encode<'q, DB> + Type<DB>,
{
    fetch_by_key::<DB, BlogEntry, i64>(conn, "id", id, || format!("blog entry {id}")).await
}

pub async fn insert_blog_entry<DB>(
    conn: &mut DB::Connection,
    id: i64,
    entry: &NewBlogEntry,
    now: DateTime<Utc>,
) -> Result<(), QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    i64: for<'q> Encode<'q, DB> + Type<DB>,
    String: for<'q> Encode<'q, DB> + Type<DB>,
    bool: for<'q> Encode<'q, DB> + Type<DB>,
    DateTime<Utc>: for<'q> Encode<'q, DB> + Type<DB>,
{
    sqlx::query::<DB>(
        r#"
        INSERT INTO blog_entries (id, title, content, author, created_at, updated_at, published)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(entry.title.clone())
    .bind(entry.content.clone())
    .bind(entry.author.clone())
    .bind(now)
    .bind(now)
    .bind(entry.published)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Insert a user. A duplicate username surfaces as `UsernameTaken`.
pub async fn insert_user<DB>(
    conn: &mut DB::Connection,
    username: &str,
    password_hash: &str,
) -> Result<(), QuillError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    String: for<'q> Encode<'q, DB> + Type<DB>,
    bool: for<'q> Encode<'q, DB> + Type<DB>,
{
    sqlx::query::<DB>("INSERT INTO users (username, password, enabled) VALUES ($1, $2, $3)")
        .bind(username.to_string())
        .bind(password_hash.to_string())
        .bind(true)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                QuillError::UsernameTaken(username.to_string())
            }
            other => QuillError::Database(other),
        })?;
    Ok(())
}
