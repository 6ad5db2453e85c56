use std::{collections::BTreeMap, path::Path, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Filesystem state of one tracked document.
///
/// Two records describe an unchanged document iff both fields match
/// exactly. A document counts as changed when its modification time
/// increased *or* its size differs; either condition alone is enough,
/// which tolerates clock skew and truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Last modification time as seconds since the Unix epoch.
    pub last_modified: u64,
    /// Size in bytes.
    pub file_size: u64,
}

/// The current state of the watched directory: filename -> record.
///
/// Identifiers are plain filenames, unique within the directory; the
/// scan is not recursive.
pub type Snapshot = BTreeMap<String, DocumentRecord>;

/// Default extension allow-list for document discovery.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "txt"];

/// Extension allow-list shared by the snapshot reader and the
/// deleted-document detection in the classifier.
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    extensions: Vec<String>,
}

impl DocumentFilter {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a document identifier passes the allow-list.
    pub fn matches(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// Read the current state of every qualifying document in `dir`.
///
/// Returns `Err` when the directory itself cannot be read, so callers
/// can tell an inaccessible directory apart from an empty one and
/// suppress deletion inference instead of mass-deleting everything the
/// manifest knows about. Individual entries that vanish or fail to
/// stat mid-scan are skipped with a warning.
///
/// Pure read of filesystem metadata; no side effects.
pub fn scan_documents(dir: &Path, filter: &DocumentFilter) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !filter.matches(&name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(document = %name, error = %e, "could not stat entry, skipping");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let last_modified = metadata
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        snapshot.insert(
            name,
            DocumentRecord {
                last_modified,
                file_size: metadata.len(),
            },
        );
    }

    tracing::debug!(dir = %dir.display(), documents = snapshot.len(), "scanned watched directory");
    Ok(snapshot)
}
