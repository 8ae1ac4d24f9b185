use crate::auth::{PasswordAuthority, SessionTokenIssuer};
use crate::aws::CredentialResolver;
use crate::db::connection::ConnectionFactory;
use crate::db::models::{User, UserCredentials, UserWithoutPassword};
use crate::db::repository;
use crate::error::QuillError;
use chrono::Utc;
use sqlx::Postgres;
use std::sync::{Arc, OnceLock};
use tokio::task::spawn_blocking;
use tracing::{error, info, warn};

/// Plaintext behind the decoy hash checked for unknown and disabled users.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Registration, lookup and login.
pub struct UserService<R> {
    factory: Arc<ConnectionFactory<R>>,
    passwords: PasswordAuthority,
    sessions: Option<SessionTokenIssuer>,
    decoy_hash: Arc<OnceLock<String>>,
}

impl<R> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            passwords: self.passwords.clone(),
            sessions: self.sessions.clone(),
            decoy_hash: self.decoy_hash.clone(),
        }
    }
}

impl<R: CredentialResolver> UserService<R> {
    pub fn new(
        factory: Arc<ConnectionFactory<R>>,
        passwords: PasswordAuthority,
        sessions: Option<SessionTokenIssuer>,
    ) -> Self {
        Self {
            factory,
            passwords,
            sessions,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn sessions(&self) -> Result<&SessionTokenIssuer, QuillError> {
        self.sessions
            .as_ref()
            .ok_or(QuillError::SessionSecretNotConfigured)
    }

    pub async fn get_user_by_username(
        &self,
        username: String,
    ) -> Result<UserWithoutPassword, QuillError> {
        self.factory
            .scoped(move |conn| {
                Box::pin(async move {
                    repository::fetch_by_key::<Postgres, _, _>(
                        conn,
                        "username",
                        username.clone(),
                        || format!("user {username}"),
                    )
                    .await
                })
            })
            .await
    }

    pub async fn register(&self, credentials: UserCredentials) -> Result<(), QuillError> {
        let UserCredentials { username, password } = credentials;
        if username.trim().is_empty() {
            return Err(QuillError::InvalidArgument("username cannot be empty".into()));
        }

        // hash before connecting so a bad password never costs a token
        let passwords = self.passwords.clone();
        let hash = spawn_blocking(move || passwords.hash(&password)).await??;

        let name = username.clone();
        self.factory
            .scoped(move |conn| {
                Box::pin(async move { repository::insert_user::<Postgres>(conn, &name, &hash).await })
            })
            .await?;

        info!(%username, "user registered");
        Ok(())
    }

    /// A fresh session token for valid credentials. Unknown users, disabled
    /// users and wrong passwords are all `InvalidCredentials`.
    pub async fn login(&self, credentials: UserCredentials) -> Result<String, QuillError> {
        let sessions = self.sessions()?.clone();
        let UserCredentials { username, password } = credentials;

        let name = username.clone();
        let lookup = self
            .factory
            .scoped(move |conn| {
                Box::pin(async move {
                    repository::fetch_by_key::<Postgres, User, _>(
                        conn,
                        "username",
                        name.clone(),
                        || format!("user {name}"),
                    )
                    .await
                })
            })
            .await;

        let stored = match lookup {
            Ok(user) if user.enabled => Some(user.password_hash),
            Ok(_) | Err(QuillError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let matched = match self.check_password(password, stored).await {
            Ok(matched) => matched,
            Err(QuillError::CorruptCredentialRecord) => {
                error!(%username, "stored password hash is unusable");
                return Err(QuillError::CorruptCredentialRecord);
            }
            Err(e) => return Err(e),
        };
        if !matched {
            warn!(%username, "login rejected");
            return Err(QuillError::InvalidCredentials);
        }

        let token = sessions.issue(&username, Utc::now())?;
        info!(%username, "session issued");
        Ok(token)
    }

    /// Verify `password` against `stored`. Without a stored hash the decoy is
    /// verified instead and the result is `Ok(false)`, so every rejection
    /// costs one Argon2 run.
    async fn check_password(
        &self,
        password: String,
        stored: Option<String>,
    ) -> Result<bool, QuillError> {
        let passwords = self.passwords.clone();
        let decoy = self.decoy_hash.clone();
        let verified = spawn_blocking(move || match stored {
            Some(hash) => passwords.verify(&password, &hash),
            None => {
                let hash =
                    decoy.get_or_init(|| passwords.hash(DECOY_PASSWORD).unwrap_or_default());
                let _ = passwords.verify(&password, hash);
                Ok(false)
            }
        })
        .await??;
        Ok(verified)
    }

    /// The username a session token was issued to.
    pub fn verify_session(&self, token: &str) -> Result<String, QuillError> {
        self.sessions()?.verify(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{ConnectionTokenSigner, Credentials, StaticCredentialResolver};
    use argon2::Params;
    use std::time::Duration;

    fn service(secret: Option<&str>) -> UserService<StaticCredentialResolver> {
        let factory = ConnectionFactory::new(
            None,
            StaticCredentialResolver::new(Credentials::new("AKID", "secret", None)),
            ConnectionTokenSigner::new("us-east-1", Duration::from_secs(900)),
        );
        UserService::new(
            Arc::new(factory),
            PasswordAuthority::with_params(Params::new(8 * 1024, 1, 1, None).unwrap()),
            SessionTokenIssuer::from_secret(secret),
        )
    }

    fn creds(username: &str, password: &str) -> UserCredentials {
        UserCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_validates_before_connecting() {
        let svc = service(Some("k"));
        let err = svc.register(creds("ada", "")).await.unwrap_err();
        assert!(matches!(err, QuillError::EmptyPassword));

        let err = svc.register(creds(" ", "pw")).await.unwrap_err();
        assert!(matches!(err, QuillError::InvalidArgument(_)));

        let err = svc.register(creds("ada", "pw")).await.unwrap_err();
        assert!(matches!(err, QuillError::EndpointNotConfigured));
    }

    #[tokio::test]
    async fn login_requires_session_secret() {
        let err = service(None).login(creds("ada", "pw")).await.unwrap_err();
        assert!(matches!(err, QuillError::SessionSecretNotConfigured));
    }

    #[tokio::test]
    async fn login_surfaces_infrastructure_faults() {
        let err = service(Some("k")).login(creds("ada", "pw")).await.unwrap_err();
        assert!(matches!(err, QuillError::EndpointNotConfigured));
    }

    #[tokio::test]
    async fn missing_user_still_runs_argon2() {
        let svc = service(Some("k"));
        assert!(svc.decoy_hash.get().is_none());

        assert!(!svc.check_password("pw".into(), None).await.unwrap());
        let decoy = svc.decoy_hash.get().expect("decoy hash computed");
        assert!(decoy.starts_with("$argon2id$"));
        assert!(svc.passwords.verify(DECOY_PASSWORD, decoy).unwrap());

        // the decoy never authenticates, even with its own plaintext
        assert!(!svc.check_password(DECOY_PASSWORD.into(), None).await.unwrap());
    }

    #[tokio::test]
    async fn stored_hash_is_verified() {
        let svc = service(Some("k"));
        let hash = svc.passwords.hash("right").unwrap();
        assert!(svc.check_password("right".into(), Some(hash.clone())).await.unwrap());
        assert!(!svc.check_password("wrong".into(), Some(hash)).await.unwrap());
        let corrupt = svc.check_password("x".into(), Some("plaintext".into())).await;
        assert!(matches!(corrupt, Err(QuillError::CorruptCredentialRecord)));
    }

    #[test]
    fn verify_session_round_trip() {
        let svc = service(Some("k"));
        let token = svc.sessions().unwrap().issue("ada", Utc::now()).unwrap();
        assert_eq!(svc.verify_session(&token).unwrap(), "ada");
        assert!(matches!(
            service(None).verify_session(&token),
            Err(QuillError::SessionSecretNotConfigured)
        ));
    }
}
