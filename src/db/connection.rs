use crate::aws::{ConnectionTokenSigner, CredentialResolver, DbConnectAction};
use crate::error::QuillError;
use chrono::Utc;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection, Postgres, Transaction};
use tracing::{debug, warn};

pub const DSQL_PORT: u16 = 5432;
pub const DSQL_DATABASE: &str = "postgres";
pub const DSQL_ADMIN_USER: &str = "admin";

/// Opens one TLS-verified DSQL connection per logical operation.
///
/// Every open resolves credentials and signs a fresh token; nothing is pooled
/// or reused across operations.
pub struct ConnectionFactory<R> {
    endpoint: Option<String>,
    resolver: R,
    signer: ConnectionTokenSigner,
}

impl<R: CredentialResolver> ConnectionFactory<R> {
    pub fn new(endpoint: Option<String>, resolver: R, signer: ConnectionTokenSigner) -> Self {
        Self {
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            resolver,
            signer,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Connection options with a freshly signed password. Does not connect.
    pub async fn connect_options(&self) -> Result<PgConnectOptions, QuillError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(QuillError::EndpointNotConfigured)?;

        let credentials = self.resolver.resolve().await?;
        let token = self.signer.sign(
            &credentials,
            endpoint,
            DbConnectAction::DbConnectAdmin,
            Utc::now(),
        )?;
        debug!(expires_at = %token.expires_at(), "signed DSQL connection token");

        Ok(PgConnectOptions::new()
            .host(endpoint)
            .port(DSQL_PORT)
            .database(DSQL_DATABASE)
            .username(DSQL_ADMIN_USER)
            .password(token.value())
            .ssl_mode(PgSslMode::VerifyFull))
    }

    /// Open a connection. The caller owns it and must close it; prefer
    /// [`ConnectionFactory::scoped`], which does that on every path.
    pub async fn open(&self) -> Result<PgConnection, QuillError> {
        let options = self.connect_options().await?;
        PgConnection::connect_with(&options)
            .await
            .map_err(QuillError::ConnectionRefused)
    }

    /// Run `op` on a fresh connection and close it afterwards, whatever `op`
    /// returned. If the returned future is dropped mid-flight the connection
    /// is dropped with it, which closes the socket.
    pub async fn scoped<T, F>(&self, op: F) -> Result<T, QuillError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, QuillError>> + Send,
    {
        let mut conn = self.open().await?;
        let result = op(&mut conn).await;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "closing DSQL connection failed");
        }
        result
    }

    /// Like [`ConnectionFactory::scoped`], inside a transaction that commits
    /// when `op` succeeds and rolls back otherwise.
    pub async fn transaction<T, F>(&self, op: F) -> Result<T, QuillError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Transaction<'_, Postgres>) -> BoxFuture<'c, Result<T, QuillError>>
            + Send
            + Sync
            + 'static,
    {
        self.scoped(move |conn| conn.transaction(op)).await
    }
}
