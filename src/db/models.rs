use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row shape with a fixed column list, used to build select lists without
/// runtime introspection. `COLUMNS` must name exactly the fields `FromRow`
/// decodes.
pub trait Projection {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn select_list() -> String {
        Self::COLUMNS.join(", ")
    }
}

/// A row in `blog_entries`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct BlogEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published: bool,
}

impl Projection for BlogEntry {
    const TABLE: &'static str = "blog_entries";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "content",
        "author",
        "created_at",
        "updated_at",
        "published",
    ];
}

/// Listing view of a blog entry, without the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct BlogEntrySummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Projection for BlogEntrySummary {
    const TABLE: &'static str = "blog_entries";
    const COLUMNS: &'static [&'static str] = &["id", "title", "author", "created_at"];
}

/// Payload for creating an entry; id and timestamps are assigned server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogEntry {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub published: bool,
}

/// A row in `users`. Deliberately not `Serialize`: the hash never leaves the
/// service.
#[derive(Clone, FromRow)]
pub struct User {
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub enabled: bool,
}

impl Projection for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["username", "password", "enabled"];
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Read projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct UserWithoutPassword {
    pub username: String,
    pub enabled: bool,
}

impl Projection for UserWithoutPassword {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["username", "enabled"];
}

/// Username and plaintext password as submitted to register/login.
#[derive(Clone, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}
