//! Live LID lookup capability.

use crate::error::LookupError;
use async_trait::async_trait;

/// Resolves a linked identifier to its owning phone-bearing JID over the
/// network, for LIDs that have no local reverse mapping yet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LidLookup: Send + Sync {
    /// Look up the phone JID for `lid_jid`. `Ok(None)` means the platform does
    /// not know the mapping.
    async fn lookup_pn(&self, lid_jid: &str) -> Result<Option<String>, LookupError>;
}
