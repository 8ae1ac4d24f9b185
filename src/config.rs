use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Region the DSQL cluster lives in when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection tokens are minted for 15 minutes unless overridden.
pub const DEFAULT_TOKEN_VALIDITY_SECS: u64 = 15 * 60;

const ENV_KEYS: &[&str] = &[
    "CLUSTER_ENDPOINT",
    "AWS_REGION",
    "JWT_SECRET",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "TOKEN_VALIDITY_SECS",
    "INIT_SCHEMA",
];

/// Process-wide settings, read once at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// DSQL cluster host. Absence is reported per operation, not at startup.
    pub cluster_endpoint: Option<String>,
    pub aws_region: String,
    /// HS256 secret for session tokens. Never logged.
    pub jwt_secret: Option<String>,
    pub listen_addr: String,
    pub loglevel: String,
    pub token_validity_secs: u64,
    /// Create tables and seed the id counter before serving.
    pub init_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_endpoint: None,
            aws_region: DEFAULT_REGION.to_string(),
            jwt_secret: None,
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            token_validity_secs: DEFAULT_TOKEN_VALIDITY_SECS,
            init_schema: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the recognised environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(ENV_KEYS))
            .extract()
    }

    /// The configured endpoint, treating a blank value as absent.
    pub fn endpoint(&self) -> Option<&str> {
        self.cluster_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn session_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|s| !s.is_empty())
    }

    pub fn token_validity(&self) -> Duration {
        Duration::from_secs(self.token_validity_secs)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cluster_endpoint", &self.cluster_endpoint)
            .field("aws_region", &self.aws_region)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("listen_addr", &self.listen_addr)
            .field("loglevel", &self.loglevel)
            .field("token_validity_secs", &self.token_validity_secs)
            .field("init_schema", &self.init_schema)
            .finish()
    }
}
