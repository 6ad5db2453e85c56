//! Index access facade: the boundary between the reconciliation core
//! and the vector store that owns the index.
//!
//! The core never looks inside an index; it only appends nodes to an
//! existing one, builds a fresh one from a complete document set, or
//! asks for a best-effort load of a previously persisted one. The
//! default implementation keeps nodes in a redb database; a real
//! deployment can substitute any vector store by implementing
//! [`IndexFacade`].

use std::path::{Path, PathBuf};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::{
    error::Result,
    loader::SourceDocument,
    transform::Node,
};

/// Node id -> JSON-serialized [`Node`].
const NODES: TableDefinition<&str, &str> = TableDefinition::new("nodes");
/// Identifiers of the documents the index was derived from.
const SOURCES: TableDefinition<&str, ()> = TableDefinition::new("sources");

/// External collaborator contract for index access.
pub trait IndexFacade {
    type Index;

    /// Append nodes to an existing index.
    fn insert(&self, index: &mut Self::Index, nodes: Vec<Node>) -> Result<()>;

    /// Construct a fresh index from a complete document set and its
    /// transformed nodes, discarding any previously persisted index.
    /// Every document is registered as a source even when the
    /// transform produced no content for it.
    fn build_from(
        &self,
        documents: &[SourceDocument],
        nodes: Vec<Node>,
    ) -> Result<Self::Index>;

    /// Best-effort load of a previously persisted index. Any failure
    /// yields `None`; the caller decides whether to rebuild.
    fn load_existing(&self) -> Option<Self::Index>;
}

/// A persisted accumulation of nodes, addressable by source document.
pub struct NodeIndex {
    db: Database,
}

impl NodeIndex {
    fn create(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(redb::Error::from)?;

        let txn = db.begin_write()?;
        txn.open_table(NODES)?;
        txn.open_table(SOURCES)?;
        txn.commit()?;

        Ok(Self { db })
    }

    fn open(path: &Path) -> Result<Self> {
        let db = Database::open(path).map_err(redb::Error::from)?;

        // A database without our tables was not written by us.
        let txn = db.begin_read()?;
        txn.open_table(NODES)?;
        txn.open_table(SOURCES)?;

        Ok(Self { db })
    }

    fn register_sources(&self, documents: &[SourceDocument]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut sources = txn.open_table(SOURCES)?;
            for document in documents {
                sources.insert(document.name.as_str(), ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn insert_nodes(&self, nodes: Vec<Node>) -> Result<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin_write()?;
        {
            let mut node_table = txn.open_table(NODES)?;
            let mut sources = txn.open_table(SOURCES)?;
            for node in &nodes {
                let payload = serde_json::to_string(node)?;
                node_table.insert(node.id.as_str(), payload.as_str())?;
                sources.insert(node.source.as_str(), ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Identifiers of every document this index was derived from.
    pub fn source_names(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SOURCES)?;
        let mut names = Vec::new();
        for entry in table.iter()? {
            let (k, _v) = entry?;
            names.push(k.value().to_string());
        }
        Ok(names)
    }

    /// Total number of stored nodes.
    pub fn node_count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(NODES)?;
        let mut count = 0u64;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Retrieve a stored node by id.
    pub fn get_node(&self, id: &str) -> Result<Option<Node>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(NODES)?;
        let Some(guard) = table.get(id)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(guard.value())?))
    }
}

impl std::fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIndex").finish_non_exhaustive()
    }
}

/// redb-backed [`IndexFacade`] implementation.
#[derive(Debug, Clone)]
pub struct RedbVectorStore {
    path: PathBuf,
}

impl RedbVectorStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexFacade for RedbVectorStore {
    type Index = NodeIndex;

    fn insert(&self, index: &mut NodeIndex, nodes: Vec<Node>) -> Result<()> {
        let count = nodes.len();
        index.insert_nodes(nodes)?;
        tracing::info!(nodes = count, "inserted nodes into existing index");
        Ok(())
    }

    fn build_from(
        &self,
        documents: &[SourceDocument],
        nodes: Vec<Node>,
    ) -> Result<NodeIndex> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        let index = NodeIndex::create(&self.path)?;
        index.register_sources(documents)?;
        let count = nodes.len();
        index.insert_nodes(nodes)?;
        tracing::info!(
            documents = documents.len(),
            nodes = count,
            "built fresh index"
        );
        Ok(index)
    }

    fn load_existing(&self) -> Option<NodeIndex> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no persisted index, starting from scratch");
            return None;
        }
        match NodeIndex::open(&self.path) {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not load persisted index");
                None
            }
        }
    }
}
