//! JID shape classification.

use regex::Regex;
use std::sync::LazyLock;

/// Server for phone-bearing user JIDs.
pub const USER_SERVER: &str = "s.whatsapp.net";

/// Phone-bearing JID: `{digits}[:{device}]@s.whatsapp.net` or `@hosted`.
static PHONE_JID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?::\d+)?@(?:s\.whatsapp\.net|hosted)$").unwrap());

/// Linked-identifier JID: `{digits}[:{device}]@lid` or `@hosted.lid`.
static LID_JID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?::\d+)?@(?:lid|hosted\.lid)$").unwrap());

/// Classified JID, borrowing the identifying digits from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JidKind<'a> {
    /// Carries the phone number digits directly.
    Phone(&'a str),
    /// Opaque linked identifier; needs a reverse mapping.
    Lid(&'a str),
    /// Groups, broadcasts and anything else.
    Other,
}

impl<'a> JidKind<'a> {
    /// Classify a JID. Device suffixes are dropped.
    pub fn parse(jid: &'a str) -> Self {
        if let Some(caps) = PHONE_JID_RE.captures(jid) {
            if let Some(user) = caps.get(1) {
                return JidKind::Phone(user.as_str());
            }
        }
        if let Some(caps) = LID_JID_RE.captures(jid) {
            if let Some(lid) = caps.get(1) {
                return JidKind::Lid(lid.as_str());
            }
        }
        JidKind::Other
    }
}

/// Whether the JID is addressed to a linked-identifier server, regardless of
/// whether its user part is well formed.
pub fn has_lid_suffix(jid: &str) -> bool {
    jid.ends_with("@lid") || jid.ends_with("@hosted.lid")
}
