//! Temp-file SQLite databases for exercising the backend-generic queries.

use crate::db::schema::SEQUENCE_INIT;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct TempDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A fresh database file with the seeded id counter.
pub async fn temp_db(tag: &str) -> TempDb {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("quill-{tag}-{}-{nanos}.sqlite", std::process::id()));

    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .expect("invalid sqlite url")
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30));
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(opts)
        .await
        .expect("failed to open sqlite database");
    for stmt in SEQUENCE_INIT {
        sqlx::query(stmt)
            .execute(&pool)
            .await
            .expect("failed to seed counter");
    }
    TempDb { pool, path }
}
