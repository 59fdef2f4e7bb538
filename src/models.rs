//! Data models for the review pipelines.
//!
//! This module contains the core data structures shared by the
//! summarization and extraction pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single input article, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    /// 1-based ordinal assigned in input order.
    pub number: usize,
    /// Display name (file stem).
    pub name: String,
    /// Source location on disk.
    pub path: PathBuf,
    /// Character length of the content.
    pub chars: usize,
    /// Raw article text.
    pub content: String,
}

impl Document {
    /// Creates a document from a source path and its content.
    pub fn new(number: usize, path: &Path, content: String) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            number,
            name,
            path: path.to_path_buf(),
            chars: content.chars().count(),
            content,
        }
    }
}

/// An ordered group of documents sent together in one completion request.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Documents in this batch, in input order.
    pub documents: Vec<Document>,
}

impl Batch {
    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// The batcher never emits an empty batch, but callers still check.
    #[allow(dead_code)] // Counterpart to len for completeness
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Display names of the documents in this batch.
    pub fn document_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }
}

/// Captured result of analyzing one batch.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// 1-based batch number.
    pub batch_num: usize,
    /// Names of the articles that were in the batch.
    pub articles: Vec<String>,
    /// The completion text, or an `Error: ...` marker if the call failed.
    pub result: String,
}

/// One (Section, Field, Value) triple parsed from an extraction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Which extraction pass produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionType {
    #[serde(rename = "AMSTAR")]
    Amstar,
    #[serde(rename = "Study Data")]
    StudyData,
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionType::Amstar => write!(f, "AMSTAR"),
            ExtractionType::StudyData => write!(f, "Study Data"),
        }
    }
}

/// One output row of the extraction pipeline.
///
/// The row list always matches the master schema in length and order;
/// unresolved fields carry an explicit placeholder value.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedField {
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "ExtractionType")]
    pub extraction_type: ExtractionType,
    #[serde(rename = "ProcessedAt")]
    pub processed_at: DateTime<Utc>,
}
