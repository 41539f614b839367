//! Concurrent store of streamer infos keyed by class name and version.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rootio_rbytes::{self as rbytes, RBytesError, StreamerInfoContext};

use crate::{RDictError, StreamerInfo};

/// In-memory schema store.
///
/// Holds any number of versions per class. Lookups take a shared lock, so
/// many buffers can resolve versions while another thread adds entries.
///
/// # Example
///
/// ```
/// use rootio_rdict::{StreamerInfo, Streamers};
///
/// let db = Streamers::new();
/// db.add(StreamerInfo::new("TNamed", 1, 0xdfb7_4a3c));
/// db.add(StreamerInfo::new("TNamed", 2, 0x1234_5678));
///
/// assert_eq!(db.get("TNamed", -1).unwrap().class_version, 2);
/// assert_eq!(db.get("TNamed", 1).unwrap().checksum, 0xdfb7_4a3c);
/// assert!(db.get("TH1F", -1).is_none());
/// ```
#[derive(Debug, Default)]
pub struct Streamers {
    db: RwLock<HashMap<String, Vec<Arc<StreamerInfo>>>>,
}

impl Streamers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `si`, replacing any entry with the same name and class version.
    pub fn add(&self, si: StreamerInfo) {
        tracing::debug!(class = %si.name, version = si.class_version, "rdict: adding streamer info");
        let mut db = self.db.write();
        let versions = db.entry(si.name.clone()).or_default();
        versions.retain(|v| v.class_version != si.class_version);
        versions.push(Arc::new(si));
        versions.sort_by_key(|v| v.class_version);
    }

    /// Returns the entry for `name` at `version`; a negative version selects
    /// the highest class version.
    pub fn get(&self, name: &str, version: i32) -> Option<Arc<StreamerInfo>> {
        let db = self.db.read();
        let versions = db.get(name)?;
        if version < 0 {
            return versions.last().cloned();
        }
        versions
            .iter()
            .find(|v| v.class_version == version)
            .cloned()
    }

    /// Class names in the store, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.db.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of entries, counting each version separately.
    pub fn len(&self) -> usize {
        self.db.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a store from a JSON array of streamer infos.
    pub fn from_json(s: &str) -> Result<Self, RDictError> {
        let infos: Vec<StreamerInfo> = serde_json::from_str(s)?;
        let db = Self::new();
        for si in infos {
            db.add(si);
        }
        Ok(db)
    }

    /// Dumps the store as a JSON array, ordered by name then version.
    pub fn to_json(&self) -> Result<String, RDictError> {
        let db = self.db.read();
        let mut names: Vec<&String> = db.keys().collect();
        names.sort();
        let infos: Vec<&StreamerInfo> = names
            .into_iter()
            .flat_map(|name| db[name].iter().map(|si| si.as_ref()))
            .collect();
        Ok(serde_json::to_string_pretty(&infos)?)
    }
}

impl StreamerInfoContext for Streamers {
    fn streamer_info(
        &self,
        name: &str,
        version: i32,
    ) -> Result<Arc<dyn rbytes::StreamerInfo>, RBytesError> {
        match self.get(name, version) {
            Some(si) => Ok(si),
            None => Err(RBytesError::UnknownStreamer {
                name: name.to_string(),
                version,
            }),
        }
    }
}
