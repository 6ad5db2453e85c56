//! Reconciliation controller: drives one batch synchronization cycle
//! between the watched directory, the manifest, and the index.
//!
//! A cycle scans the directory, classifies changes against the
//! manifest, then either leaves the index alone, inserts nodes for new
//! documents incrementally, or rebuilds the index from the complete
//! current document set. Updates and deletions always force a full
//! rebuild: the index has no delete-by-source primitive, so
//! correctness after a change can only be guaranteed by rebuilding
//! from ground truth. That makes any update or deletion O(corpus), a
//! known scalability ceiling.
//!
//! No error escapes a cycle. Ingestion and indexing failures are
//! reported through [`SyncOutcome::Failed`] so callers can tell
//! "nothing to do" from "attempted and failed".

use std::path::PathBuf;

use crate::{
    classify::{classify, ChangeSet},
    error::Result,
    index_store::IndexFacade,
    loader::ContentLoader,
    manifest::{load_manifest, manifest_from_snapshot, save_manifest},
    snapshot::{scan_documents, DocumentFilter, Snapshot},
    transform::IngestionTransform,
};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Snapshot and manifest already agree; the index was untouched.
    Clean,
    /// New documents were inserted into the existing index.
    Inserted { added: usize },
    /// The index was freshly built from the current document set.
    Rebuilt { documents: usize },
    /// Ingestion or indexing failed. The previous index is returned
    /// unchanged, but the manifest still advanced to the snapshot, so
    /// the failed documents will not be retried until a forced rebuild.
    Failed { reason: String },
    /// The watched directory could not be read. Deletion inference is
    /// suppressed and the manifest is left untouched.
    Skipped { reason: String },
}

/// What one call to [`SyncEngine::sync_cycle`] did.
#[derive(Debug)]
pub struct SyncReport<I> {
    /// The index after the cycle, if one exists.
    pub index: Option<I>,
    /// The classification the cycle acted on.
    pub changes: ChangeSet,
    pub outcome: SyncOutcome,
}

/// Owns the collaborators and paths for reconciliation cycles.
///
/// Construction and teardown belong to the caller; the engine holds no
/// process-global state. `sync_cycle` and `full_rebuild` take
/// `&mut self`: at most one cycle may run against a given index at a
/// time, and the exclusive borrow enforces that within a process.
/// Cross-process callers must serialize cycles themselves.
pub struct SyncEngine<L, T, F>
where
    F: IndexFacade,
{
    loader: L,
    transform: T,
    store: F,
    documents_dir: PathBuf,
    manifest_path: PathBuf,
    filter: DocumentFilter,
}

impl<L, T, F> SyncEngine<L, T, F>
where
    L: ContentLoader,
    T: IngestionTransform,
    F: IndexFacade,
{
    pub fn new(
        loader: L,
        transform: T,
        store: F,
        documents_dir: PathBuf,
        manifest_path: PathBuf,
        filter: DocumentFilter,
    ) -> Self {
        Self {
            loader,
            transform,
            store,
            documents_dir,
            manifest_path,
            filter,
        }
    }

    /// Best-effort load of the previously persisted index.
    pub fn load_existing(&self) -> Option<F::Index> {
        self.store.load_existing()
    }

    /// Classify the current directory state against the manifest
    /// without touching the index or the manifest.
    pub fn pending_changes(&self) -> Result<ChangeSet> {
        let snapshot = scan_documents(&self.documents_dir, &self.filter)?;
        let manifest = load_manifest(&self.manifest_path);
        Ok(classify(&snapshot, &manifest, &self.filter))
    }

    /// Run one reconciliation cycle.
    ///
    /// Terminal step in every non-skipped branch: the manifest is
    /// rewritten to exactly the snapshot taken at cycle start, even
    /// when ingestion failed, so the manifest never permanently
    /// diverges from the filesystem view driving the next cycle.
    pub fn sync_cycle(&mut self, existing: Option<F::Index>) -> SyncReport<F::Index> {
        tracing::info!(dir = %self.documents_dir.display(), "starting document synchronization");

        let snapshot = match scan_documents(&self.documents_dir, &self.filter) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    dir = %self.documents_dir.display(),
                    error = %e,
                    "watched directory unreadable, skipping cycle"
                );
                return SyncReport {
                    index: existing,
                    changes: ChangeSet::default(),
                    outcome: SyncOutcome::Skipped {
                        reason: e.to_string(),
                    },
                };
            }
        };

        let manifest = load_manifest(&self.manifest_path);
        let changes = classify(&snapshot, &manifest, &self.filter);

        // A manifest with entries but no loadable index means documents
        // were indexed by an earlier run whose index is gone. Rebuild
        // everything from the current snapshot.
        let force_rebuild = existing.is_none() && !manifest.is_empty();
        if force_rebuild {
            tracing::info!("manifest present without an index, forcing re-index");
        }

        let (index, outcome) =
            self.reconcile(&changes, existing, force_rebuild, &snapshot);

        save_manifest(&manifest_from_snapshot(&snapshot), &self.manifest_path);

        SyncReport {
            index,
            changes,
            outcome,
        }
    }

    /// Rebuild the index from the current snapshot, bypassing
    /// classification. This is the forced-reindex path for recovering
    /// from a cycle that advanced the manifest past a failed ingestion.
    pub fn full_rebuild(&mut self) -> SyncReport<F::Index> {
        let snapshot = match scan_documents(&self.documents_dir, &self.filter) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "watched directory unreadable, skipping rebuild");
                return SyncReport {
                    index: None,
                    changes: ChangeSet::default(),
                    outcome: SyncOutcome::Skipped {
                        reason: e.to_string(),
                    },
                };
            }
        };

        let (index, outcome) = match self.build_index(None) {
            Ok(index) => (
                Some(index),
                SyncOutcome::Rebuilt {
                    documents: snapshot.len(),
                },
            ),
            Err(e) => {
                tracing::error!(error = %e, "full rebuild failed");
                (
                    None,
                    SyncOutcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        save_manifest(&manifest_from_snapshot(&snapshot), &self.manifest_path);

        SyncReport {
            index,
            changes: ChangeSet::default(),
            outcome,
        }
    }

    fn reconcile(
        &self,
        changes: &ChangeSet,
        existing: Option<F::Index>,
        force_rebuild: bool,
        snapshot: &Snapshot,
    ) -> (Option<F::Index>, SyncOutcome) {
        if changes.is_empty() && !force_rebuild {
            tracing::info!("no changes detected");
            return (existing, SyncOutcome::Clean);
        }

        if changes.requires_rebuild() || force_rebuild {
            tracing::info!(
                updated = changes.updated.len(),
                deleted = changes.deleted.len(),
                "re-indexing from the complete document set"
            );
            return match self.build_index(None) {
                Ok(index) => (
                    Some(index),
                    SyncOutcome::Rebuilt {
                        documents: snapshot.len(),
                    },
                ),
                Err(e) => {
                    tracing::error!(error = %e, "re-indexing failed, keeping previous index");
                    (
                        existing,
                        SyncOutcome::Failed {
                            reason: e.to_string(),
                        },
                    )
                }
            };
        }

        // Only additions remain.
        match existing {
            Some(mut index) => {
                match self.insert_added(&mut index, &changes.added) {
                    Ok(()) => {
                        tracing::info!(added = changes.added.len(), "indexed new documents");
                        (
                            Some(index),
                            SyncOutcome::Inserted {
                                added: changes.added.len(),
                            },
                        )
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "indexing new documents failed");
                        (
                            Some(index),
                            SyncOutcome::Failed {
                                reason: e.to_string(),
                            },
                        )
                    }
                }
            }
            // No index yet: the freshly built index already contains
            // everything, so no separate insert step is needed.
            None => match self.build_index(Some(&changes.added)) {
                Ok(index) => (
                    Some(index),
                    SyncOutcome::Rebuilt {
                        documents: changes.added.len(),
                    },
                ),
                Err(e) => {
                    tracing::error!(error = %e, "building index for new documents failed");
                    (
                        None,
                        SyncOutcome::Failed {
                            reason: e.to_string(),
                        },
                    )
                }
            },
        }
    }

    fn build_index(&self, only: Option<&[String]>) -> Result<F::Index> {
        let documents = self.loader.load(&self.documents_dir, only)?;
        let nodes = self.transform.run(&documents)?;
        self.store.build_from(&documents, nodes)
    }

    fn insert_added(&self, index: &mut F::Index, added: &[String]) -> Result<()> {
        let documents = self.loader.load(&self.documents_dir, Some(added))?;
        let nodes = self.transform.run(&documents)?;
        self.store.insert(index, nodes)
    }
}
