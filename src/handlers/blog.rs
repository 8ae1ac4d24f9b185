use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{BlogEntry, BlogEntrySummary, NewBlogEntry};
use crate::middleware::RequireSession;
use crate::{QuillError, router::QuillState};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_number() -> i64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Serialize)]
pub struct BlogEntriesResponse {
    pub blog_entries: Vec<BlogEntry>,
    pub page_count: i64,
}

#[derive(Serialize)]
pub struct BlogEntrySummariesResponse {
    pub blog_entry_summaries: Vec<BlogEntrySummary>,
    pub page_count: i64,
}

#[derive(Serialize)]
pub struct BlogEntryResponse {
    pub blog_entry: BlogEntry,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// GET /api/public/blog-entries
pub async fn list_blog_entries(
    State(state): State<QuillState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<BlogEntriesResponse>, QuillError> {
    let (blog_entries, page_count) = state
        .blog
        .get_blog_entries(q.page_number, q.page_size)
        .await?;
    Ok(Json(BlogEntriesResponse {
        blog_entries,
        page_count,
    }))
}

/// GET /api/public/blog-entry-summaries
pub async fn list_blog_entry_summaries(
    State(state): State<QuillState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<BlogEntrySummariesResponse>, QuillError> {
    let (blog_entry_summaries, page_count) = state
        .blog
        .get_blog_entry_summaries(q.page_number, q.page_size)
        .await?;
    Ok(Json(BlogEntrySummariesResponse {
        blog_entry_summaries,
        page_count,
    }))
}

/// GET /api/public/blog-entries/{id}
pub async fn get_blog_entry(
    State(state): State<QuillState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogEntryResponse>, QuillError> {
    let blog_entry = state.blog.get_blog_entry_by_id(id).await?;
    Ok(Json(BlogEntryResponse { blog_entry }))
}

/// POST /api/blog-entries, session required.
pub async fn create_blog_entry(
    State(state): State<QuillState>,
    RequireSession(username): RequireSession,
    Json(entry): Json<NewBlogEntry>,
) -> Result<impl IntoResponse, QuillError> {
    let id = state.blog.create_blog_entry(entry).await?;
    tracing::info!(id, %username, "blog entry submitted");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_names() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((q.page_number, q.page_size), (1, 10));

        let q: PageQuery = serde_json::from_str(r#"{"pageNumber":3,"pageSize":25}"#).unwrap();
        assert_eq!((q.page_number, q.page_size), (3, 25));
    }
}
