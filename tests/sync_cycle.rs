use std::path::{Path, PathBuf};

use docsync::{
    load_manifest, DocumentFilter, Error, FsLoader, IngestionTransform, Node,
    RedbVectorStore, SourceDocument, SyncEngine, SyncOutcome, WindowChunker,
};

/// Transform standing in for an ingestion backend that is down.
struct StuckPipeline;

impl IngestionTransform for StuckPipeline {
    fn run(&self, _documents: &[SourceDocument]) -> docsync::Result<Vec<Node>> {
        Err(Error::Config("pipeline unavailable".into()))
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    docs_dir: PathBuf,
    manifest_path: PathBuf,
    index_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let docs_dir = tmp.path().join("data");
        std::fs::create_dir(&docs_dir).unwrap();
        let manifest_path = tmp.path().join("manifest.json");
        let index_path = tmp.path().join("index.redb");
        Self {
            _tmp: tmp,
            docs_dir,
            manifest_path,
            index_path,
        }
    }

    fn engine(&self) -> SyncEngine<FsLoader, WindowChunker, RedbVectorStore> {
        SyncEngine::new(
            FsLoader::default(),
            WindowChunker::default(),
            RedbVectorStore::new(self.index_path.clone()),
            self.docs_dir.clone(),
            self.manifest_path.clone(),
            DocumentFilter::default(),
        )
    }

    fn write(&self, name: &str, text: &str) {
        std::fs::write(self.docs_dir.join(name), text).unwrap();
    }

    fn remove(&self, name: &str) {
        std::fs::remove_file(self.docs_dir.join(name)).unwrap();
    }
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[test]
fn fresh_directory_builds_index_and_manifest() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha document");
    fx.write("b.md", "bravo document");

    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert_eq!(report.changes.added, vec!["a.md", "b.md"]);
    assert_eq!(report.outcome, SyncOutcome::Rebuilt { documents: 2 });

    let index = report.index.unwrap();
    assert_eq!(sorted(index.source_names().unwrap()), vec!["a.md", "b.md"]);
    assert!(index.node_count().unwrap() >= 2);

    let manifest = load_manifest(&fx.manifest_path);
    assert_eq!(
        manifest.keys().cloned().collect::<Vec<_>>(),
        vec!["a.md", "b.md"]
    );
}

#[test]
fn second_cycle_is_clean_and_persisted_index_reloads() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    let first = engine.sync_cycle(engine.load_existing());
    assert_eq!(first.outcome, SyncOutcome::Rebuilt { documents: 1 });
    drop(first);

    // A new engine in the same process state loads the persisted index
    // and finds nothing to do.
    let mut engine = fx.engine();
    let existing = engine.load_existing();
    assert!(existing.is_some());
    let second = engine.sync_cycle(existing);
    assert_eq!(second.outcome, SyncOutcome::Clean);
}

#[test]
fn new_document_takes_the_incremental_path() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    let first = engine.sync_cycle(engine.load_existing());
    let node_count_before = first.index.as_ref().unwrap().node_count().unwrap();
    drop(first);

    fx.write("b.md", "bravo");
    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert_eq!(report.changes.added, vec!["b.md"]);
    assert!(report.changes.updated.is_empty());
    assert!(report.changes.deleted.is_empty());
    assert_eq!(report.outcome, SyncOutcome::Inserted { added: 1 });

    let index = report.index.unwrap();
    assert_eq!(sorted(index.source_names().unwrap()), vec!["a.md", "b.md"]);
    assert_eq!(index.node_count().unwrap(), node_count_before + 1);
    // The untouched document's node is still there.
    assert!(index.get_node("a.md#0").unwrap().is_some());
}

#[test]
fn changed_content_rebuilds_from_current_snapshot() {
    let fx = Fixture::new();
    fx.write("a.md", "original");

    let mut engine = fx.engine();
    engine.sync_cycle(engine.load_existing());

    // A different byte size guarantees detection even when the mtime
    // does not advance within the same second.
    fx.write("a.md", "rewritten and longer");
    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert_eq!(report.changes.updated, vec!["a.md"]);
    assert_eq!(report.outcome, SyncOutcome::Rebuilt { documents: 1 });

    let index = report.index.unwrap();
    assert_eq!(index.source_names().unwrap(), vec!["a.md"]);
    let node = index.get_node("a.md#0").unwrap().unwrap();
    assert_eq!(node.text, "rewritten and longer");
}

#[test]
fn deletion_rebuilds_even_when_survivors_are_unchanged() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");
    fx.write("c.md", "charlie");

    let mut engine = fx.engine();
    engine.sync_cycle(engine.load_existing());

    fx.remove("c.md");
    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert!(report.changes.added.is_empty());
    assert!(report.changes.updated.is_empty());
    assert_eq!(report.changes.deleted, vec!["c.md"]);
    assert_eq!(report.outcome, SyncOutcome::Rebuilt { documents: 1 });

    let index = report.index.unwrap();
    assert_eq!(index.source_names().unwrap(), vec!["a.md"]);

    let manifest = load_manifest(&fx.manifest_path);
    assert!(!manifest.contains_key("c.md"));
}

#[test]
fn corrupt_manifest_recovers_by_reindexing() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    engine.sync_cycle(engine.load_existing());

    std::fs::write(&fx.manifest_path, "{definitely not json").unwrap();
    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    // The corrupt manifest loads as empty, so everything is added.
    assert_eq!(report.changes.added, vec!["a.md"]);
    assert!(report.changes.deleted.is_empty());

    // Write-back repairs the manifest.
    let manifest = load_manifest(&fx.manifest_path);
    assert!(manifest.contains_key("a.md"));
}

#[test]
fn lost_index_with_intact_manifest_is_rebuilt() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    let first = engine.sync_cycle(engine.load_existing());
    drop(first);

    std::fs::remove_file(&fx.index_path).unwrap();

    let mut engine = fx.engine();
    let existing = engine.load_existing();
    assert!(existing.is_none());
    let report = engine.sync_cycle(existing);

    // Classification sees nothing to do, but the engine still rebuilds.
    assert!(report.changes.is_empty());
    assert_eq!(report.outcome, SyncOutcome::Rebuilt { documents: 1 });
    assert_eq!(report.index.unwrap().source_names().unwrap(), vec!["a.md"]);
}

#[test]
fn failed_reindex_keeps_the_previous_index_intact() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    let first = engine.sync_cycle(engine.load_existing());
    let nodes_before = first.index.as_ref().unwrap().node_count().unwrap();
    drop(first);

    // The content change forces a rebuild, which the broken pipeline
    // fails before the persisted index is replaced.
    fx.write("a.md", "alpha, rewritten at length");
    let mut engine = SyncEngine::new(
        FsLoader::default(),
        StuckPipeline,
        RedbVectorStore::new(fx.index_path.clone()),
        fx.docs_dir.clone(),
        fx.manifest_path.clone(),
        DocumentFilter::default(),
    );
    let report = engine.sync_cycle(engine.load_existing());

    assert!(matches!(report.outcome, SyncOutcome::Failed { .. }));
    let index = report.index.unwrap();
    assert_eq!(index.node_count().unwrap(), nodes_before);
    assert_eq!(index.source_names().unwrap(), vec!["a.md"]);
    assert_eq!(index.get_node("a.md#0").unwrap().unwrap().text, "alpha");
}

#[test]
fn missing_directory_skips_without_mass_deletion() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");

    let mut engine = fx.engine();
    engine.sync_cycle(engine.load_existing());

    std::fs::remove_dir_all(&fx.docs_dir).unwrap();
    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert!(matches!(report.outcome, SyncOutcome::Skipped { .. }));
    // The manifest still remembers the document.
    let manifest = load_manifest(&fx.manifest_path);
    assert!(manifest.contains_key("a.md"));
}

#[test]
fn full_rebuild_recovers_after_manual_reset() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");
    fx.write("b.md", "bravo");

    let mut engine = fx.engine();
    engine.sync_cycle(engine.load_existing());

    // Nothing changed; a normal cycle would be clean, but a forced
    // rebuild reconstructs everything.
    let mut engine = fx.engine();
    let report = engine.full_rebuild();
    assert_eq!(report.outcome, SyncOutcome::Rebuilt { documents: 2 });
    assert_eq!(
        sorted(report.index.unwrap().source_names().unwrap()),
        vec!["a.md", "b.md"]
    );
}

#[test]
fn unsupported_files_are_invisible_end_to_end() {
    let fx = Fixture::new();
    fx.write("a.md", "alpha");
    fx.write("noise.bin", "not a document");

    let mut engine = fx.engine();
    let report = engine.sync_cycle(engine.load_existing());

    assert_eq!(report.changes.added, vec!["a.md"]);
    assert_eq!(report.index.unwrap().source_names().unwrap(), vec!["a.md"]);
    let manifest = load_manifest(&fx.manifest_path);
    assert!(!manifest.contains_key("noise.bin"));
}

fn touch_with_content(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

#[test]
fn status_dry_run_leaves_no_trace() {
    let fx = Fixture::new();
    touch_with_content(&fx.docs_dir.join("a.md"), "alpha");

    let engine = fx.engine();
    let changes = engine.pending_changes().unwrap();
    assert_eq!(changes.added, vec!["a.md"]);

    assert!(!fx.manifest_path.exists());
    assert!(!fx.index_path.exists());
}
