//! AWS identity plumbing for DSQL: credential resolution and SigV4 token minting.

pub mod credentials;
pub mod signer;

pub use credentials::{
    AwsCredentialResolver, CredentialResolver, Credentials, StaticCredentialResolver,
};
pub use signer::{ConnectionToken, ConnectionTokenSigner, DbConnectAction};
