//! Gateway API types.

use serde::Deserialize;

/// Response of the LID lookup endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LidLookupResponse {
    /// The queried LID JID, echoed back.
    pub jid: String,
    /// Phone-bearing JID, or `null` if the platform has no mapping.
    pub pn: Option<String>,
}
