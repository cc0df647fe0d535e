//! WhatsApp identity resolution.
//!
//! Converts between E.164 phone numbers and WhatsApp JIDs, including linked
//! identifiers (LIDs) that are reverse-mapped through files written by the
//! pairing subsystem, with an optional live lookup for unmapped LIDs.

mod error;
mod jid;
mod lookup;
mod mapping;
mod normalize;
mod paths;
mod resolver;

pub use error::{LookupError, ResolveError};
pub use jid::{has_lid_suffix, JidKind, USER_SERVER};
pub use lookup::LidLookup;
pub use mapping::{reverse_mapping_file_name, MappingProbe, ReverseMappingStore};
pub use normalize::{
    is_self_chat_mode, to_whatsapp_jid, with_whatsapp_prefix, E164Normalizer, PhoneNormalizer,
    WHATSAPP_PREFIX,
};
pub use paths::{CredentialPaths, MappingDirectoryResolver};
pub use resolver::{JidResolver, ResolveOptions};
