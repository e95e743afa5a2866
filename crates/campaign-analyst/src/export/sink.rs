//! Destinations for exported documents.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ExportResult;

/// A document that has been handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    /// File name the document was saved under.
    pub file_name: String,
    /// Location on disk, for sinks that write files.
    pub path: Option<PathBuf>,
    /// Size in bytes.
    pub size: usize,
}

/// Where exported documents go.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Persist `bytes` under `file_name`.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> ExportResult<SavedDocument>;
}

/// Writes documents into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> ExportResult<SavedDocument> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        let size = bytes.len();
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(path = %path.display(), size, "Saved document");
        Ok(SavedDocument { file_name: file_name.to_string(), path: Some(path), size })
    }
}

/// Keeps documents in memory, for HTTP downloads and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the most recent document.
    pub fn take_last(&self) -> Option<(String, Vec<u8>)> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).pop()
    }

    /// Names of all saved documents, oldest first.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> ExportResult<SavedDocument> {
        let size = bytes.len();
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((file_name.to_string(), bytes));
        Ok(SavedDocument { file_name: file_name.to_string(), path: None, size })
    }
}
