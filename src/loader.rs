use std::path::Path;

use rayon::prelude::*;

use crate::{
    error::Result,
    snapshot::DocumentFilter,
};

/// A raw source document loaded from the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Document identifier: the filename within the watched directory.
    pub name: String,
    /// Parsed content.
    pub text: String,
}

/// Loads parsed content for the reconciliation controller.
pub trait ContentLoader {
    /// Load every qualifying document in `dir`, or exactly the named
    /// subset when `only` is given. Zero results is not an error.
    fn load(
        &self,
        dir: &Path,
        only: Option<&[String]>,
    ) -> Result<Vec<SourceDocument>>;
}

/// Filesystem loader that reads documents as UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    filter: DocumentFilter,
}

impl FsLoader {
    pub fn new(filter: DocumentFilter) -> Self {
        Self { filter }
    }

    fn qualifying_names(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if self.filter.matches(&name) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

impl ContentLoader for FsLoader {
    fn load(
        &self,
        dir: &Path,
        only: Option<&[String]>,
    ) -> Result<Vec<SourceDocument>> {
        let names = match only {
            Some(names) => names.to_vec(),
            None => self.qualifying_names(dir)?,
        };

        // Read files in parallel; unreadable files are skipped with a
        // warning rather than failing the whole batch.
        let mut documents: Vec<SourceDocument> = names
            .par_iter()
            .filter_map(|name| {
                let path = dir.join(name);
                match std::fs::read_to_string(&path) {
                    Ok(text) => Some(SourceDocument {
                        name: name.clone(),
                        text,
                    }),
                    Err(e) => {
                        tracing::warn!(document = %name, error = %e, "could not read document, skipping");
                        None
                    }
                }
            })
            .collect();
        documents.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(dir = %dir.display(), documents = documents.len(), "loaded documents");
        Ok(documents)
    }
}
