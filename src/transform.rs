//! Ingestion transform: turning raw documents into index-ready nodes.
//!
//! The default transform splits documents into fixed-size character
//! windows with optional overlap. Window sizes are expressed in
//! characters, sized after a 1024-token splitter at roughly four
//! characters per token.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    loader::SourceDocument,
};

/// Approximate characters per token for English text.
const CHARS_PER_TOKEN: usize = 4;

/// Default chunk size in characters (~1024 tokens).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * CHARS_PER_TOKEN;

/// Default overlap between adjacent chunks in characters (~128 tokens).
pub const DEFAULT_CHUNK_OVERLAP: usize = 128 * CHARS_PER_TOKEN;

/// A unit of transformed content, the thing actually stored in the
/// index. Addressable by the document it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier: `<source>#<ordinal>`.
    pub id: String,
    /// Identifier of the document this node derives from.
    pub source: String,
    /// Chunked content.
    pub text: String,
}

/// Transforms loaded documents into nodes.
///
/// Failures propagate as errors and are absorbed at the
/// reconciliation-cycle boundary.
pub trait IngestionTransform {
    fn run(&self, documents: &[SourceDocument]) -> Result<Vec<Node>>;
}

/// Splits each document into overlapping character windows.
#[derive(Debug, Clone, Copy)]
pub struct WindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WindowChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl IngestionTransform for WindowChunker {
    fn run(&self, documents: &[SourceDocument]) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for document in documents {
            for (ordinal, text) in
                split_windows(&document.text, self.chunk_size, self.overlap)
                    .into_iter()
                    .enumerate()
            {
                nodes.push(Node {
                    id: format!("{}#{ordinal}", document.name),
                    source: document.name.clone(),
                    text,
                });
            }
        }
        tracing::debug!(documents = documents.len(), nodes = nodes.len(), "transformed documents");
        Ok(nodes)
    }
}

/// Split text into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one. Always
/// yields at least one window so every document stays represented in
/// the index, even when empty.
fn split_windows(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    windows
}
