use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::{PasswordAuthority, SessionTokenIssuer};
use crate::aws::{AwsCredentialResolver, ConnectionTokenSigner};
use crate::config::Config;
use crate::db::connection::ConnectionFactory;
use crate::handlers::{self, blog, users};
use crate::service::{BlogService, UserService};

/// Shared application state. Cheap to clone; every field is reference-counted.
#[derive(Clone)]
pub struct QuillState {
    pub blog: BlogService<AwsCredentialResolver>,
    pub users: UserService<AwsCredentialResolver>,
}

impl QuillState {
    pub fn new(
        factory: Arc<ConnectionFactory<AwsCredentialResolver>>,
        passwords: PasswordAuthority,
        sessions: Option<SessionTokenIssuer>,
    ) -> Self {
        Self {
            blog: BlogService::new(factory.clone()),
            users: UserService::new(factory, passwords, sessions),
        }
    }

    /// Wire services from process configuration. Credentials are resolved per
    /// connection, so a missing identity only fails when a query runs.
    pub async fn from_config(cfg: &Config) -> Self {
        let signer = ConnectionTokenSigner::new(cfg.aws_region.clone(), cfg.token_validity());
        let factory = ConnectionFactory::new(
            cfg.endpoint().map(str::to_string),
            AwsCredentialResolver::load(cfg.aws_region.clone()).await,
            signer,
        );
        Self::new(
            Arc::new(factory),
            PasswordAuthority::default(),
            SessionTokenIssuer::from_secret(cfg.session_secret()),
        )
    }

    pub fn factory(&self) -> &ConnectionFactory<AwsCredentialResolver> {
        self.blog.factory()
    }
}

pub fn quill_router(state: QuillState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/public/blog-entries", get(blog::list_blog_entries))
        .route(
            "/api/public/blog-entry-summaries",
            get(blog::list_blog_entry_summaries),
        )
        .route("/api/public/blog-entries/{id}", get(blog::get_blog_entry))
        .route("/api/blog-entries", post(blog::create_blog_entry))
        .route("/api/users/{username}", get(users::get_user))
        .route("/api/register", post(users::register))
        .route("/api/login", post(users::login))
        .with_state(state)
}
