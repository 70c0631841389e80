use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk shape of the ETag cache.
///
/// Both sections are always written, even when empty, so a freshly created
/// cache file already has the layout every later flush produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintCache {
    /// Channel name to the last ETag seen for it
    #[serde(default)]
    pub etags: BTreeMap<String, String>,
    /// Channel name to whether its last run was a cache hit
    #[serde(default)]
    pub cached: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub fingerprint: String,
    pub was_cached: bool,
}

impl FingerprintCache {
    pub fn record(&self, channel: &str) -> Option<FingerprintRecord> {
        let fingerprint = self.etags.get(channel)?.clone();
        Some(FingerprintRecord {
            fingerprint,
            was_cached: self.cached.get(channel).copied().unwrap_or(false),
        })
    }

    pub fn insert(&mut self, channel: &str, record: FingerprintRecord) {
        self.etags.insert(channel.to_string(), record.fingerprint);
        self.cached.insert(channel.to_string(), record.was_cached);
    }

    pub fn len(&self) -> usize {
        self.etags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.etags.is_empty()
    }
}
