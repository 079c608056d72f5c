use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    token: String,
    secret: Vec<u8>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Authentication headers for exactly one request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedHeaders {
    pub token: String,
    pub signature: String,
    pub nonce: String,
    pub timestamp: String,
}

/// HMAC accepts keys of any length, so this never fires in practice; it
/// keeps the `new_from_slice` result propagated instead of unwrapped.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid signing key: {0}")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
}

/// Signs with the current wall clock and a fresh v4 nonce.
pub fn sign(credentials: &Credentials) -> Result<SignedHeaders, SignError> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let nonce = Uuid::new_v4().to_string();
    sign_with(credentials, timestamp_ms, &nonce)
}

pub fn sign_with(
    credentials: &Credentials,
    timestamp_ms: u128,
    nonce: &str,
) -> Result<SignedHeaders, SignError> {
    let timestamp = timestamp_ms.to_string();

    let mut mac = HmacSha256::new_from_slice(&credentials.secret)?;
    mac.update(credentials.token().as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(nonce.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(SignedHeaders {
        token: credentials.token().to_string(),
        signature,
        nonce: nonce.to_string(),
        timestamp,
    })
}
