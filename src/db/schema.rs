//! SQL DDL for the blog tables and the id counter.
//!
//! DSQL runs each DDL statement in its own transaction and has no sequences,
//! so the statements are kept separate and ids come from a counter row.

/// Blog entries and users. Postgres dialect.
pub const POSTGRES_INIT: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS blog_entries (
        id BIGINT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        published BOOLEAN NOT NULL DEFAULT FALSE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        password TEXT NOT NULL,
        enabled BOOLEAN NOT NULL DEFAULT TRUE
    )"#,
];

/// Counter table plus its single seed row. Portable across Postgres and SQLite.
pub const SEQUENCE_INIT: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS blog_entry_sequence (next_id BIGINT NOT NULL)",
    "INSERT INTO blog_entry_sequence (next_id) \
     SELECT 1 WHERE NOT EXISTS (SELECT 1 FROM blog_entry_sequence)",
];
