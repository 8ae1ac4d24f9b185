use crate::error::QuillError;
use aws_config::Region;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_credential_types::provider::ProvideCredentials;
use std::fmt;
use std::future::Future;
use tracing::debug;

/// AWS identity used to sign one connection token. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Source of ambient AWS credentials.
///
/// Implementations must not cache across calls: role sessions rotate, and each
/// connection attempt resolves afresh.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self) -> impl Future<Output = Result<Credentials, QuillError>> + Send;
}

/// Fixed credentials, for tests and local tooling.
#[derive(Clone, Debug)]
pub struct StaticCredentialResolver {
    credentials: Credentials,
}

impl StaticCredentialResolver {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self) -> Result<Credentials, QuillError> {
        Ok(self.credentials.clone())
    }
}

/// The SDK default chain: environment, shared profile, web identity, SSO,
/// container endpoint and instance metadata, in that order.
///
/// The chain is queried on every `resolve`; nothing is kept between calls.
#[derive(Debug)]
pub struct AwsCredentialResolver {
    chain: DefaultCredentialsChain,
}

impl AwsCredentialResolver {
    pub async fn load(region: impl Into<String>) -> Self {
        let chain = DefaultCredentialsChain::builder()
            .region(Region::new(region.into()))
            .build()
            .await;
        Self { chain }
    }
}

impl CredentialResolver for AwsCredentialResolver {
    async fn resolve(&self) -> Result<Credentials, QuillError> {
        let resolved = self
            .chain
            .provide_credentials()
            .await
            .map_err(|e| QuillError::CredentialsUnavailable(e.to_string()))?;
        debug!(access_key_id = %resolved.access_key_id(), "resolved AWS credentials");
        Ok(Credentials::new(
            resolved.access_key_id(),
            resolved.secret_access_key(),
            resolved.session_token().map(str::to_string),
        ))
    }
}
