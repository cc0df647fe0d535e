//! Read-only access to LID reverse-mapping files.
//!
//! The pairing subsystem writes one `lid-mapping-{lid}_reverse.json` file per
//! linked identifier. Each holds a JSON string or number with the owning phone
//! number, or `null` while the mapping is not yet known.

use crate::normalize::PhoneNormalizer;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of probing a single directory for a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingProbe {
    /// Normalized E.164 phone number.
    Found(String),
    /// No mapping file in this directory.
    Absent,
    /// The file exists but records no mapping yet.
    Empty,
    /// The file could not be read.
    Unreadable(String),
    /// The file does not hold a usable phone number.
    Malformed(String),
}

/// Name of the reverse-mapping file for `lid`.
pub fn reverse_mapping_file_name(lid: &str) -> String {
    format!("lid-mapping-{}_reverse.json", lid)
}

/// Reads reverse mappings across a priority-ordered list of directories.
#[derive(Clone)]
pub struct ReverseMappingStore {
    normalizer: Arc<dyn PhoneNormalizer>,
}

impl ReverseMappingStore {
    pub fn new(normalizer: Arc<dyn PhoneNormalizer>) -> Self {
        Self { normalizer }
    }

    /// First phone number found for `lid`, trying `dirs` in order.
    ///
    /// Every non-hit is a miss; storage faults never reach the caller.
    pub fn read_reverse(&self, lid: &str, dirs: &[PathBuf]) -> Option<String> {
        let file_name = reverse_mapping_file_name(lid);

        for dir in dirs {
            let path = dir.join(&file_name);
            match self.probe(&path) {
                MappingProbe::Found(phone) => {
                    debug!("Resolved LID {} via {}", lid, path.display());
                    return Some(phone);
                }
                MappingProbe::Absent | MappingProbe::Empty => {}
                MappingProbe::Unreadable(reason) | MappingProbe::Malformed(reason) => {
                    warn!("Skipping reverse mapping {}: {}", path.display(), reason);
                }
            }
        }

        None
    }

    /// Probe one mapping file.
    pub fn probe(&self, path: &Path) -> MappingProbe {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return MappingProbe::Absent,
            Err(e) => return MappingProbe::Unreadable(e.to_string()),
        };

        let raw = match serde_json::from_str::<Value>(&data) {
            Ok(Value::Null) => return MappingProbe::Empty,
            Ok(Value::String(s)) => s.trim().to_string(),
            Ok(Value::Number(n)) => match integral(&n) {
                Some(digits) => digits.to_string(),
                None => return MappingProbe::Malformed(format!("non-integral number: {}", n)),
            },
            Ok(other) => {
                return MappingProbe::Malformed(format!("unexpected JSON value: {}", other))
            }
            Err(e) => return MappingProbe::Malformed(e.to_string()),
        };

        // Payloads are full international numbers written without the `+`.
        let candidate = if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            format!("+{}", raw)
        } else {
            raw
        };

        match self.normalizer.normalize(&candidate) {
            Ok(phone) => MappingProbe::Found(phone),
            Err(e) => MappingProbe::Malformed(e.to_string()),
        }
    }
}

/// Integer value of a JSON number, including floats with no fractional part.
fn integral(n: &serde_json::Number) -> Option<u64> {
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}
