//! Database module: connections, models and queries for DSQL.
//!
//! Layout:
//! - `connection.rs`: per-operation connections authenticated by signed tokens
//! - `sequence.rs`: id allocation from a single-row counter table
//! - `models.rs`: Rust structs mirroring DB rows
//! - `repository.rs`: queries over a borrowed connection
//! - `schema.rs`: SQL DDL for initializing the cluster

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;
pub mod sequence;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::ConnectionFactory;
pub use models::{BlogEntry, BlogEntrySummary, NewBlogEntry, User, UserCredentials, UserWithoutPassword};
pub use sequence::SequenceAllocator;
