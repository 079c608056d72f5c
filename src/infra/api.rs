use crate::domain::{Command, Credentials, DeviceCatalog, SignError, SignedHeaders, sign};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

const BIN_NAME: &str = env!("CARGO_PKG_NAME");
const API_SUCCESS: i64 = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to sign {operation} request: {source}")]
    Sign {
        operation: &'static str,
        source: SignError,
    },

    #[error("{operation} request failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} rejected by API (statusCode {status_code}): {message}")]
    Status {
        operation: &'static str,
        status_code: String,
        message: String,
    },

    #[error("{operation} response has no body")]
    MissingBody { operation: &'static str },
}

/// Response wrapper shared by every endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(rename = "statusCode", default)]
    status_code: Value,
    #[serde(default)]
    message: String,
    body: Option<T>,
}

impl<T> ApiEnvelope<T> {
    fn is_success(&self) -> bool {
        match &self.status_code {
            Value::Number(number) => number.as_i64() == Some(API_SUCCESS),
            Value::String(text) => text.trim().parse::<i64>().ok() == Some(API_SUCCESS),
            _ => false,
        }
    }

    fn into_checked(self, operation: &'static str) -> Result<Option<T>, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Status {
                operation,
                status_code: match self.status_code {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
                message: self.message,
            });
        }
        Ok(self.body)
    }
}

/// Owns the HTTP agent for the lifetime of one run.
pub struct ApiClient {
    agent: ureq::Agent,
    host: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(host: &str, credentials: Credentials) -> Self {
        Self {
            agent: make_agent(),
            host: host.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn fetch_catalog(&self) -> Result<DeviceCatalog, ApiError> {
        const OPERATION: &str = "list devices";

        let url = format!("{}/v1.1/devices", self.host);
        let headers = self.signed_headers(OPERATION)?;
        debug!(%url, nonce = %headers.nonce, "fetching device list");

        let mut response = self
            .agent
            .get(&url)
            .header("User-Agent", &user_agent())
            .header("Authorization", &headers.token)
            .header("sign", &headers.signature)
            .header("nonce", &headers.nonce)
            .header("t", &headers.timestamp)
            .call()
            .map_err(|error| ApiError::Transport {
                operation: OPERATION,
                message: error.to_string(),
            })?;

        let envelope = response
            .body_mut()
            .read_json::<ApiEnvelope<DeviceCatalog>>()
            .map_err(|error| ApiError::Decode {
                operation: OPERATION,
                message: error.to_string(),
            })?;

        let catalog = envelope
            .into_checked(OPERATION)?
            .ok_or(ApiError::MissingBody {
                operation: OPERATION,
            })?;
        if catalog.is_empty() {
            warn!("device list is empty");
        }
        info!(
            devices = catalog.devices.len(),
            infrared_remotes = catalog.infrared_remotes.len(),
            "fetched device list"
        );
        Ok(catalog)
    }

    pub fn send_command(&self, device_id: &str, command: &Command) -> Result<(), ApiError> {
        const OPERATION: &str = "send command";

        let url = format!("{}/v1.1/devices/{device_id}/commands", self.host);
        let headers = self.signed_headers(OPERATION)?;
        debug!(%url, command = %command.command, nonce = %headers.nonce, "sending command");

        let mut response = self
            .agent
            .post(&url)
            .header("User-Agent", &user_agent())
            .header("Authorization", &headers.token)
            .header("sign", &headers.signature)
            .header("nonce", &headers.nonce)
            .header("t", &headers.timestamp)
            .send_json(command)
            .map_err(|error| ApiError::Transport {
                operation: OPERATION,
                message: error.to_string(),
            })?;

        let envelope = response
            .body_mut()
            .read_json::<ApiEnvelope<Value>>()
            .map_err(|error| ApiError::Decode {
                operation: OPERATION,
                message: error.to_string(),
            })?;
        envelope.into_checked(OPERATION)?;
        Ok(())
    }

    fn signed_headers(&self, operation: &'static str) -> Result<SignedHeaders, ApiError> {
        sign(&self.credentials).map_err(|source| ApiError::Sign { operation, source })
    }
}

fn user_agent() -> String {
    format!("{BIN_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

fn make_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder().build();
    config.into()
}
