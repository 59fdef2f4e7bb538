//! Output writers for analysis and extraction results.

use crate::models::{ExtractionType, ResolvedField};
use anyhow::{Context, Result};
use std::path::Path;

/// Write a cluster analysis as a text file with a header block.
pub fn write_cluster_analysis(
    path: &Path,
    cluster_name: &str,
    article_count: usize,
    analysis: &str,
) -> Result<()> {
    let mut output = String::new();
    output.push_str(&format!("Cluster Analysis Results: {cluster_name}\n"));
    output.push_str(&format!("Number of articles: {article_count}\n"));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));
    output.push_str(analysis);

    std::fs::write(path, output)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))
}

/// Write resolved extraction fields as CSV.
pub fn write_extraction_csv(path: &Path, rows: &[ResolvedField]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row for field: {}", row.field))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    Ok(())
}

/// Text summary of an extraction run, by provenance.
pub fn extraction_summary(rows: &[ResolvedField]) -> String {
    let assessment_count = rows
        .iter()
        .filter(|r| r.extraction_type == ExtractionType::Amstar)
        .count();
    let study_count = rows
        .iter()
        .filter(|r| r.extraction_type == ExtractionType::StudyData)
        .count();

    let mut lines = Vec::new();
    lines.push("EXTRACTION SUMMARY:".to_string());
    lines.push(format!("Total fields: {}", rows.len()));
    lines.push(format!("AMSTAR assessments: {assessment_count}"));
    lines.push(format!("Study data fields: {study_count}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn row(field: &str, value: &str, extraction_type: ExtractionType) -> ResolvedField {
        ResolvedField {
            section: "Study_Info".to_string(),
            field: field.to_string(),
            value: value.to_string(),
            extraction_type,
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn test_write_cluster_analysis_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        write_cluster_analysis(&path, "eating_disorders", 7, "the analysis body").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Cluster Analysis Results: eating_disorders\n"));
        assert!(written.contains("Number of articles: 7\n"));
        assert!(written.contains(&"=".repeat(60)));
        assert!(written.ends_with("the analysis body"));
    }

    #[test]
    fn test_write_extraction_csv_headers_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let rows = vec![
            row("Item_1", "Yes. Met", ExtractionType::Amstar),
            row("Country", "Brazil", ExtractionType::StudyData),
        ];
        write_extraction_csv(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Section,Field,Value,ExtractionType,ProcessedAt")
        );
        assert!(written.contains("Item_1,Yes. Met,AMSTAR"));
        assert!(written.contains("Country,Brazil,Study Data"));
    }

    #[test]
    fn test_extraction_summary_counts_by_provenance() {
        let rows = vec![
            row("Item_1", "Yes", ExtractionType::Amstar),
            row("Item_2", "No", ExtractionType::Amstar),
            row("Country", "Brazil", ExtractionType::StudyData),
        ];

        let summary = extraction_summary(&rows);
        assert!(summary.contains("Total fields: 3"));
        assert!(summary.contains("AMSTAR assessments: 2"));
        assert!(summary.contains("Study data fields: 1"));
    }
}
