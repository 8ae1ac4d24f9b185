use crate::aws::CredentialResolver;
use crate::db::connection::ConnectionFactory;
use crate::db::models::{BlogEntry, BlogEntrySummary, NewBlogEntry, Projection};
use crate::db::repository;
use crate::db::sequence::SequenceAllocator;
use crate::error::QuillError;
use crate::service::pagination::Page;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Connection, FromRow, Postgres};
use std::sync::Arc;
use tracing::info;

/// Blog entry operations. Each call opens and closes its own connection.
pub struct BlogService<R> {
    factory: Arc<ConnectionFactory<R>>,
    sequence: SequenceAllocator,
}

impl<R> Clone for BlogService<R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<R: CredentialResolver> BlogService<R> {
    pub fn new(factory: Arc<ConnectionFactory<R>>) -> Self {
        Self {
            factory,
            sequence: SequenceAllocator::blog_entries(),
        }
    }

    pub fn factory(&self) -> &ConnectionFactory<R> {
        &self.factory
    }

    pub async fn get_blog_entries(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> Result<(Vec<BlogEntry>, i64), QuillError> {
        self.get_page(page_number, page_size).await
    }

    pub async fn get_blog_entry_summaries(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> Result<(Vec<BlogEntrySummary>, i64), QuillError> {
        self.get_page(page_number, page_size).await
    }

    pub async fn get_blog_entry_by_id(&self, id: i64) -> Result<BlogEntry, QuillError> {
        self.factory
            .scoped(move |conn| {
                Box::pin(async move { repository::fetch_blog_entry::<Postgres>(conn, id).await })
            })
            .await
    }

    /// Insert `entry` under a freshly allocated id and return that id.
    pub async fn create_blog_entry(&self, entry: NewBlogEntry) -> Result<i64, QuillError> {
        if entry.title.trim().is_empty() || entry.author.trim().is_empty() {
            return Err(QuillError::InvalidArgument(
                "title and author are required".into(),
            ));
        }

        let sequence = self.sequence.clone();
        let id = self
            .factory
            .scoped(move |conn| {
                Box::pin(async move {
                    let id = sequence.reserve::<Postgres>(&mut *conn).await?;
                    let mut tx = conn.begin().await?;
                    repository::insert_blog_entry::<Postgres>(&mut *tx, id, &entry, Utc::now())
                        .await?;
                    tx.commit().await?;
                    Ok(id)
                })
            })
            .await?;

        info!(id, "blog entry created");
        Ok(id)
    }

    async fn get_page<T>(&self, page_number: i64, page_size: i64) -> Result<(Vec<T>, i64), QuillError>
    where
        T: Projection + for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
    {
        let page = Page::new(page_number, page_size)?;
        // count and page read from one snapshot
        self.factory
            .transaction(move |tx| {
                Box::pin(async move {
                    let total_rows =
                        repository::count_blog_entries::<Postgres>(&mut **tx).await?;
                    let total_pages = page.total_pages(total_rows);
                    page.check_bounds(total_pages)?;
                    let rows =
                        repository::fetch_blog_page::<Postgres, T>(&mut **tx, page).await?;
                    Ok((rows, total_pages))
                })
            })
            .await
    }
}
