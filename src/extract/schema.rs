//! Master field schema loaded from CSV.
//!
//! The schema defines the complete output shape of the extraction
//! pipeline: every run resolves exactly these fields, in this order.
//! Quality-assessment entries are stamped with an explicit item number
//! at load time; that number is the stable join key against assessment
//! results.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Section name marking AMSTAR 2 quality-assessment entries.
pub const QUALITY_SECTION: &str = "AMSTAR2_Items";

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Section")]
    section: String,
    #[serde(rename = "Field")]
    field: String,
}

/// One expected output field.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub section: String,
    pub field: String,
    /// 1-based AMSTAR item number, present only for quality entries.
    pub item_number: Option<usize>,
}

/// Ordered list of expected (Section, Field) pairs.
#[derive(Debug, Clone)]
pub struct MasterSchema {
    entries: Vec<SchemaEntry>,
}

impl MasterSchema {
    /// Load the schema from a CSV file. This is the one input whose
    /// absence is fatal to a run.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to read master schema: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to parse master schema: {}", path.display()))
    }

    /// Parse schema rows from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();
        let mut next_item = 1usize;

        for row in csv_reader.deserialize::<RawEntry>() {
            let raw = row.context("Malformed schema row")?;

            let item_number = if raw.section == QUALITY_SECTION {
                let n = next_item;
                next_item += 1;
                Some(n)
            } else {
                None
            };

            entries.push(SchemaEntry {
                section: raw.section,
                field: raw.field,
                item_number,
            });
        }

        if entries.is_empty() {
            bail!("Master schema contains no fields");
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)] // Counterpart to len; load rejects empty schemas
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of quality-assessment entries.
    pub fn quality_count(&self) -> usize {
        self.entries.iter().filter(|e| e.item_number.is_some()).count()
    }

    /// Field names of all study-data entries, in schema order. These
    /// are embedded verbatim in the study-data prompt.
    pub fn study_fields(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.item_number.is_none())
            .map(|e| e.field.as_str())
            .collect()
    }
}
