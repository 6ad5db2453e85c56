//! The on-disk manifest: the sole durable record of what has been
//! indexed, mapping document identifiers to their last-known state.
//!
//! After a successful reconciliation cycle the manifest equals the
//! filesystem snapshot exactly. Load and save both degrade gracefully:
//! a missing, corrupt, or unwritable manifest is logged and treated as
//! empty/stale, never raised, because the next cycle's snapshot
//! comparison is self-correcting.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::snapshot::{DocumentRecord, Snapshot};

/// A manifest entry as persisted on disk.
///
/// Both fields are optional so an entry written by an older build or
/// edited by hand still parses; the classifier schedules any entry
/// missing a field for re-indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub last_modified: Option<u64>,
    pub file_size: Option<u64>,
}

impl From<DocumentRecord> for ManifestEntry {
    fn from(record: DocumentRecord) -> Self {
        Self {
            last_modified: Some(record.last_modified),
            file_size: Some(record.file_size),
        }
    }
}

/// Durable mapping of document identifier -> last-known state.
pub type Manifest = BTreeMap<String, ManifestEntry>;

/// Load the manifest, returning an empty one on any read or parse
/// failure. Corruption is never fatal: an empty manifest simply makes
/// the next cycle classify every present document as added.
pub fn load_manifest(path: &Path) -> Manifest {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "manifest not found, starting empty");
            return Manifest::new();
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not read manifest, starting empty");
            return Manifest::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(manifest) => {
            tracing::debug!(path = %path.display(), "loaded manifest");
            manifest
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "malformed manifest, starting empty");
            Manifest::new()
        }
    }
}

/// Serialize the full manifest, overwriting prior contents.
///
/// A write failure is logged and swallowed: the in-memory state stays
/// authoritative for this process, and a stale manifest on disk only
/// triggers re-classification on the next cycle, not corruption.
pub fn save_manifest(manifest: &Manifest, path: &Path) {
    let text = match serde_json::to_string_pretty(manifest) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not serialize manifest");
            return;
        }
    };

    if let Err(e) = std::fs::write(path, text) {
        tracing::error!(path = %path.display(), error = %e, "could not write manifest");
    } else {
        tracing::debug!(path = %path.display(), entries = manifest.len(), "saved manifest");
    }
}

/// Build the manifest that records a snapshot as fully indexed.
pub fn manifest_from_snapshot(snapshot: &Snapshot) -> Manifest {
    snapshot
        .iter()
        .map(|(name, record)| (name.clone(), ManifestEntry::from(*record)))
        .collect()
}
