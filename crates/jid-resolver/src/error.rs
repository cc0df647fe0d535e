//! Identity resolution errors.

use thiserror::Error;

/// Errors surfaced by the forward (phone number to JID) direction.
///
/// The decode direction never fails; unresolvable identifiers are `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// Errors returned by a live LID lookup capability.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup failed: {0}")]
    Failed(String),

    #[error("Lookup timed out")]
    Timeout,
}
