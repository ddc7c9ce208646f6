//! Durable record of already-published offer ids.
//!
//! The store is a single JSON file `{"offer_ids": [...]}`, rewritten in
//! full on every update. Saves use the write-to-temp-then-rename pattern
//! so a crash mid-write never leaves a partial file for the next load.
//! Ids are sorted before encoding, keeping the file diffable.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{BridgeError, Result};

/// On-disk shape of the store.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredOfferIds {
    offer_ids: Vec<u64>,
}

/// File-backed set of published offer ids.
pub struct OfferStore {
    path: PathBuf,
}

impl OfferStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored id set. A missing file is a first run and yields
    /// the empty set; a present-but-malformed file is an error.
    pub fn load(&self) -> Result<HashSet<u64>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredOfferIds =
            serde_json::from_slice(&bytes).map_err(|source| BridgeError::StorageCorrupt {
                path: self.path.clone(),
                source,
            })?;

        Ok(stored.offer_ids.into_iter().collect())
    }

    /// Atomically overwrites the store with the given set.
    pub fn save(&self, ids: &HashSet<u64>) -> Result<()> {
        let mut offer_ids: Vec<u64> = ids.iter().copied().collect();
        offer_ids.sort_unstable();
        let bytes = serde_json::to_vec_pretty(&StoredOfferIds { offer_ids })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        // The rename itself must survive a crash too.
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fsync_dir(parent)?;
            }
        }

        Ok(())
    }
}

/// Restricts a stored id set to offers still live on the marketplace.
///
/// An offer that disappears from the listing is forgotten; if it relists
/// under the same id later it counts as new again. Accepted trade-off to
/// keep the store bounded.
pub fn prune(ids: &HashSet<u64>, live: &HashSet<u64>) -> HashSet<u64> {
    ids.intersection(live).copied().collect()
}

fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir = File::open(dir_path)?;
    dir.sync_all()
}
