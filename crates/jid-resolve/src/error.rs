//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] lid_gateway_client::GatewayError),

    #[error("Usage: jid-resolve <jid-or-number>...")]
    Usage,

    #[error("{0} input(s) could not be converted")]
    Conversion(usize),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
