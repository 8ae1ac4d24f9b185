//! Presigned DSQL connection tokens (AWS Signature Version 4, query form).
//!
//! The token is the presigned `GET https://{endpoint}/?Action=...` URL with the
//! scheme removed. DSQL accepts it as the password for exactly the window in
//! `X-Amz-Expires`.

use crate::aws::credentials::Credentials;
use crate::error::QuillError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "dsql";
const SIGNED_HEADERS: &str = "host";
/// SigV4 refuses presigned URLs that live longer than a week.
const MAX_VALIDITY_SECS: u64 = 7 * 24 * 60 * 60;
/// Hex SHA-256 of the empty request body.
const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// DSQL action the token authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbConnectAction {
    /// Connect as the `admin` role.
    #[default]
    DbConnectAdmin,
    /// Connect as any other role.
    DbConnect,
}

impl DbConnectAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DbConnectAction::DbConnectAdmin => "DbConnectAdmin",
            DbConnectAction::DbConnect => "DbConnect",
        }
    }
}

/// A signed token usable as a database password until `expires_at`.
#[derive(Clone)]
pub struct ConnectionToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl ConnectionToken {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Valid up to and including `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

impl fmt::Debug for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mints connection tokens for one region with a fixed validity window.
#[derive(Clone, Debug)]
pub struct ConnectionTokenSigner {
    region: String,
    validity: Duration,
}

impl ConnectionTokenSigner {
    pub fn new(region: impl Into<String>, validity: Duration) -> Self {
        Self {
            region: region.into(),
            validity,
        }
    }

    /// Sign a token for `endpoint` as of `now`.
    ///
    /// Deterministic: identical inputs yield byte-identical tokens.
    pub fn sign(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        action: DbConnectAction,
        now: DateTime<Utc>,
    ) -> Result<ConnectionToken, QuillError> {
        let host = normalize_host(endpoint)?;

        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(QuillError::SigningFailed("incomplete credentials".into()));
        }
        if self.region.is_empty() {
            return Err(QuillError::SigningFailed("empty region".into()));
        }
        let expires_secs = self.validity.as_secs();
        if expires_secs == 0 || expires_secs > MAX_VALIDITY_SECS {
            return Err(QuillError::SigningFailed(format!(
                "validity of {expires_secs}s outside 1..={MAX_VALIDITY_SECS}"
            )));
        }

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);

        let mut params: Vec<(&str, String)> = vec![
            ("Action", action.as_str().to_string()),
            ("X-Amz-Algorithm", ALGORITHM.to_string()),
            (
                "X-Amz-Credential",
                format!("{}/{scope}", credentials.access_key_id),
            ),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", expires_secs.to_string()),
            ("X-Amz-SignedHeaders", SIGNED_HEADERS.to_string()),
        ];
        if let Some(token) = credentials.session_token.as_deref() {
            params.push(("X-Amz-Security-Token", token.to_string()));
        }
        params.sort();

        let canonical_query = params
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "GET\n/\n{canonical_query}\nhost:{host}\n\n{SIGNED_HEADERS}\n{EMPTY_PAYLOAD_SHA256}"
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = derive_signing_key(&credentials.secret_access_key, &date, &self.region, SERVICE)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(ConnectionToken {
            value: format!("{host}/?{canonical_query}&X-Amz-Signature={signature}"),
            expires_at: now + ChronoDuration::seconds(expires_secs as i64),
        })
    }
}

/// Validate that `endpoint` is a bare host and return it in canonical form.
fn normalize_host(endpoint: &str) -> Result<String, QuillError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(QuillError::SigningFailed("empty endpoint".into()));
    }
    let url = Url::parse(&format!("https://{trimmed}"))
        .map_err(|e| QuillError::SigningFailed(format!("endpoint is not a host: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| QuillError::SigningFailed("endpoint has no host".into()))?;
    if url.path() != "/"
        || url.query().is_some()
        || url.port().is_some()
        || !url.username().is_empty()
        || !host.eq_ignore_ascii_case(trimmed)
    {
        return Err(QuillError::SigningFailed(
            "endpoint must be a bare host name".into(),
        ));
    }
    Ok(host.to_string())
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, QuillError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, QuillError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| QuillError::SigningFailed(format!("hmac key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 encoding as SigV4 wants it: only unreserved characters pass.
fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
