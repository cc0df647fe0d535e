//! Gateway client errors.

use jid_resolver::LookupError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),
}

impl From<GatewayError> for LookupError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Http(e) if e.is_timeout() => LookupError::Timeout,
            other => LookupError::Failed(other.to_string()),
        }
    }
}
