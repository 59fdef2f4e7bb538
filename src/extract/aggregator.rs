//! Merging the two extraction passes against the master schema.
//!
//! Resolves every schema entry in master order: quality entries by
//! their stable item number into the assessment set, everything else by
//! exact field name into the study set. Missing keys resolve to
//! explicit placeholders so the output always matches the schema shape.

use crate::extract::scoring;
use crate::extract::schema::MasterSchema;
use crate::models::{ExtractionType, FieldRecord, ResolvedField};
use chrono::Utc;
use std::collections::HashMap;

/// Section name for the appended rating summary rows.
pub const OVERALL_SECTION: &str = "AMSTAR2_Overall";

/// Combine the assessment and study record sets into one resolved list
/// matching the schema. When the assessment set is non-empty, three
/// summary rows (overall rating, flaw count, weakness count) are
/// appended after the schema fields.
pub fn combine(
    assessment: &[FieldRecord],
    study: &[FieldRecord],
    schema: &MasterSchema,
) -> Vec<ResolvedField> {
    let assessment_lookup: HashMap<&str, &str> = assessment
        .iter()
        .map(|r| (r.field.as_str(), r.value.as_str()))
        .collect();
    let study_lookup: HashMap<&str, &str> = study
        .iter()
        .map(|r| (r.field.as_str(), r.value.as_str()))
        .collect();

    let processed_at = Utc::now();
    let mut resolved = Vec::with_capacity(schema.len() + 3);

    for entry in schema.entries() {
        let (value, extraction_type) = match entry.item_number {
            Some(n) => {
                let value = assessment_lookup
                    .get(format!("Item_{n}").as_str())
                    .map(|v| (*v).to_string())
                    .unwrap_or_else(|| format!("AMSTAR assessment needed for: {}", entry.field));
                (value, ExtractionType::Amstar)
            }
            None => {
                let value = study_lookup
                    .get(entry.field.as_str())
                    .map(|v| (*v).to_string())
                    .unwrap_or_else(|| format!("Study data needed for: {}", entry.field));
                (value, ExtractionType::StudyData)
            }
        };

        resolved.push(ResolvedField {
            section: entry.section.clone(),
            field: entry.field.clone(),
            value,
            extraction_type,
            processed_at,
        });
    }

    if !assessment.is_empty() {
        let summary = scoring::evaluate(assessment);

        resolved.push(ResolvedField {
            section: OVERALL_SECTION.to_string(),
            field: "Overall_Confidence_Rating".to_string(),
            value: format!("{} - {}", summary.rating, summary.rating.description()),
            extraction_type: ExtractionType::Amstar,
            processed_at,
        });
        resolved.push(ResolvedField {
            section: OVERALL_SECTION.to_string(),
            field: "Critical_Flaws_Count".to_string(),
            value: summary.critical_flaws.to_string(),
            extraction_type: ExtractionType::Amstar,
            processed_at,
        });
        resolved.push(ResolvedField {
            section: OVERALL_SECTION.to_string(),
            field: "Non_Critical_Weaknesses_Count".to_string(),
            value: summary.non_critical_weaknesses.to_string(),
            extraction_type: ExtractionType::Amstar,
            processed_at,
        });
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_CSV: &str = "\
Section,Field
AMSTAR2_Items,PICO components in research question
AMSTAR2_Items,Protocol established prior to conduct
Study_Info,Country of corresponding author
Study_Results,Focus and main finding for outcome
";

    fn schema() -> MasterSchema {
        MasterSchema::from_reader(SCHEMA_CSV.as_bytes()).unwrap()
    }

    fn record(field: &str, value: &str) -> FieldRecord {
        FieldRecord {
            section: "any".to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_resolves_by_item_number_and_field_name() {
        let assessment = vec![
            record("Item_1", "Yes. PICO fully described"),
            record("Item_2", "No. No protocol"),
        ];
        let study = vec![record("Country of corresponding author", "Australia")];

        let resolved = combine(&assessment, &study, &schema());

        assert_eq!(resolved[0].value, "Yes. PICO fully described");
        assert_eq!(resolved[0].extraction_type, ExtractionType::Amstar);
        assert_eq!(resolved[1].value, "No. No protocol");
        assert_eq!(resolved[2].value, "Australia");
        assert_eq!(resolved[2].extraction_type, ExtractionType::StudyData);
    }

    #[test]
    fn test_missing_fields_resolve_to_placeholders() {
        let resolved = combine(&[], &[], &schema());

        assert_eq!(resolved.len(), schema().len());
        assert_eq!(
            resolved[0].value,
            "AMSTAR assessment needed for: PICO components in research question"
        );
        assert_eq!(
            resolved[3].value,
            "Study data needed for: Focus and main finding for outcome"
        );
    }

    #[test]
    fn test_output_shape_matches_schema_regardless_of_hits() {
        let partial = vec![record("Item_2", "Yes. Registered")];
        let with_hits = combine(&partial, &[], &schema());
        let without_hits = combine(&partial, &[], &schema());

        assert_eq!(with_hits.len(), without_hits.len());
        for (a, b) in with_hits.iter().zip(&without_hits) {
            assert_eq!(a.section, b.section);
            assert_eq!(a.field, b.field);
        }
    }

    #[test]
    fn test_summary_rows_appended_when_assessment_present() {
        let assessment = vec![record("Item_2", "No. No protocol")];
        let resolved = combine(&assessment, &[], &schema());

        assert_eq!(resolved.len(), schema().len() + 3);

        let rating_row = &resolved[schema().len()];
        assert_eq!(rating_row.section, OVERALL_SECTION);
        assert_eq!(rating_row.field, "Overall_Confidence_Rating");
        assert!(rating_row.value.starts_with("LOW - "));

        assert_eq!(resolved[schema().len() + 1].field, "Critical_Flaws_Count");
        assert_eq!(resolved[schema().len() + 1].value, "1");
        assert_eq!(
            resolved[schema().len() + 2].field,
            "Non_Critical_Weaknesses_Count"
        );
        assert_eq!(resolved[schema().len() + 2].value, "0");
    }

    #[test]
    fn test_no_summary_rows_without_assessment() {
        let study = vec![record("Country of corresponding author", "Japan")];
        let resolved = combine(&[], &study, &schema());
        assert_eq!(resolved.len(), schema().len());
    }

    #[test]
    fn test_schema_order_preserved() {
        let resolved = combine(&[], &[], &schema());
        let fields: Vec<&str> = resolved.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "PICO components in research question",
                "Protocol established prior to conduct",
                "Country of corresponding author",
                "Focus and main finding for outcome"
            ]
        );
    }
}
