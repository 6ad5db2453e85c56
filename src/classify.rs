use crate::{
    manifest::Manifest,
    snapshot::{DocumentFilter, Snapshot},
};

/// The three disjoint change sets derived from one snapshot/manifest
/// comparison. Recomputed every cycle, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// In the snapshot, unknown to the manifest.
    pub added: Vec<String>,
    /// Known to both, but the recorded state differs (or the manifest
    /// entry is incomplete).
    pub updated: Vec<String>,
    /// Known to the manifest, absent from the snapshot.
    pub deleted: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Updates and deletions can only be honored by rebuilding the
    /// index from the current ground truth; the index has no
    /// delete-by-source primitive.
    pub fn requires_rebuild(&self) -> bool {
        !self.updated.is_empty() || !self.deleted.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }
}

/// Compare the current snapshot against the manifest.
///
/// Pure function: same inputs, same `ChangeSet`. A document is updated
/// when its modification time increased *or* its size differs; the size
/// check is authoritative when timestamps collide, and a decreased
/// timestamp with an equal size is deliberately ignored so clock
/// adjustments do not trigger spurious re-indexing. Manifest entries
/// missing either field are scheduled as updated to repair them.
///
/// The extension filter is applied to deletion detection exactly as the
/// snapshot reader applies it to discovery, so entries for files the
/// reader would never report cannot produce phantom deletions.
pub fn classify(
    snapshot: &Snapshot,
    manifest: &Manifest,
    filter: &DocumentFilter,
) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (name, record) in snapshot {
        let Some(entry) = manifest.get(name) else {
            tracing::info!(document = %name, "new document detected");
            changes.added.push(name.clone());
            continue;
        };

        let (Some(last_modified), Some(file_size)) =
            (entry.last_modified, entry.file_size)
        else {
            tracing::warn!(document = %name, "incomplete manifest entry, re-indexing");
            changes.updated.push(name.clone());
            continue;
        };

        if record.last_modified > last_modified || record.file_size != file_size {
            tracing::info!(document = %name, "document updated");
            changes.updated.push(name.clone());
        }
    }

    for name in manifest.keys() {
        if !snapshot.contains_key(name) && filter.matches(name) {
            tracing::info!(document = %name, "document deleted");
            changes.deleted.push(name.clone());
        }
    }

    changes
}
