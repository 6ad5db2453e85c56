//! docsync - a document-synchronization engine for retrieval-augmented
//! generation pipelines.
//!
//! docsync watches a directory of source documents and reconciles a
//! persistent vector index and an on-disk manifest with it: new
//! documents are inserted incrementally, while updates and deletions
//! trigger a full re-index from the current document set. Embedding,
//! retrieval, and answer construction are external collaborators
//! behind the [`ContentLoader`], [`IngestionTransform`], and
//! [`IndexFacade`] traits.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use docsync::{
//!     DocumentFilter, FsLoader, RedbVectorStore, SyncEngine, WindowChunker,
//! };
//!
//! let store = RedbVectorStore::new(PathBuf::from("index.redb"));
//! let mut engine = SyncEngine::new(
//!     FsLoader::default(),
//!     WindowChunker::default(),
//!     store,
//!     PathBuf::from("data"),
//!     PathBuf::from("manifest.json"),
//!     DocumentFilter::default(),
//! );
//!
//! let existing = engine.load_existing();
//! let report = engine.sync_cycle(existing);
//! println!("{:?}", report.outcome);
//! ```

pub mod classify;
pub mod config;
pub mod data_dir;
pub mod error;
pub mod index_store;
pub mod loader;
pub mod manifest;
pub mod reconcile;
pub mod snapshot;
pub mod transform;

pub use classify::{classify, ChangeSet};
pub use config::AppConfig;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use index_store::{IndexFacade, NodeIndex, RedbVectorStore};
pub use loader::{ContentLoader, FsLoader, SourceDocument};
pub use manifest::{
    load_manifest, manifest_from_snapshot, save_manifest, Manifest,
    ManifestEntry,
};
pub use reconcile::{SyncEngine, SyncOutcome, SyncReport};
pub use snapshot::{scan_documents, DocumentFilter, DocumentRecord, Snapshot};
pub use transform::{IngestionTransform, Node, WindowChunker};
