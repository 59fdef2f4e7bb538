//! AMSTAR 2 overall-confidence rubric.
//!
//! The instrument's sixteen items split into seven critical appraisal
//! domains and nine non-critical ones; counts of failed items in each
//! group map to a four-level confidence rating through a fixed decision
//! table.

use crate::models::FieldRecord;
use std::collections::HashMap;
use std::fmt;

/// Critical appraisal domains.
pub const CRITICAL_ITEMS: [usize; 7] = [2, 4, 7, 9, 11, 13, 15];

/// Non-critical domains.
pub const NON_CRITICAL_ITEMS: [usize; 9] = [1, 3, 5, 6, 8, 10, 12, 14, 16];

/// Overall confidence in the results of a review.
/// Ordinal: `High > Moderate > Low > CriticallyLow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    CriticallyLow,
    Low,
    Moderate,
    High,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::High => write!(f, "HIGH"),
            Rating::Moderate => write!(f, "MODERATE"),
            Rating::Low => write!(f, "LOW"),
            Rating::CriticallyLow => write!(f, "CRITICALLY LOW"),
        }
    }
}

impl Rating {
    /// Human-readable rationale attached to each rating.
    pub fn description(&self) -> &'static str {
        match self {
            Rating::High => {
                "No or one non-critical weakness: the systematic review provides an accurate and comprehensive summary of the results of the available studies that address the question of interest"
            }
            Rating::Moderate => {
                "More than one non-critical weakness: the systematic review has more than one weakness but no critical flaws. It may provide an accurate summary of the results of the available studies that were included in the review"
            }
            Rating::Low => {
                "One critical flaw with or without non-critical weaknesses: the review has a critical flaw and may not provide an accurate and comprehensive summary of the available studies that address the question of interest"
            }
            Rating::CriticallyLow => {
                "More than one critical flaw with or without non-critical weaknesses: the review has more than one critical flaw and should not be relied on to provide an accurate and comprehensive summary of the available studies"
            }
        }
    }
}

/// Outcome of evaluating a set of assessment responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSummary {
    pub rating: Rating,
    pub critical_flaws: usize,
    pub non_critical_weaknesses: usize,
}

/// Fixed decision table over flaw and weakness counts. Total over both
/// inputs; the non-critical count only matters when no critical domain
/// failed.
pub fn rate(critical_flaws: usize, non_critical_weaknesses: usize) -> Rating {
    match (critical_flaws, non_critical_weaknesses) {
        (0, 0..=1) => Rating::High,
        (0, _) => Rating::Moderate,
        (1, _) => Rating::Low,
        _ => Rating::CriticallyLow,
    }
}

/// A response counts against its item when the case-normalized text
/// contains "no." or "partial yes." anywhere. Containment over the
/// whole value, not the leading status word; see DESIGN.md.
fn is_failed(value: &str) -> bool {
    let normalized = value.to_lowercase();
    normalized.contains("no.") || normalized.contains("partial yes.")
}

/// Evaluate assessment records (keyed `Item_1` .. `Item_16`) against
/// the rubric. An item missing from the records is not a flaw.
pub fn evaluate(records: &[FieldRecord]) -> RatingSummary {
    let lookup: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.field.as_str(), r.value.as_str()))
        .collect();

    let failed_count = |items: &[usize]| {
        items
            .iter()
            .filter(|n| {
                lookup
                    .get(format!("Item_{n}").as_str())
                    .is_some_and(|value| is_failed(value))
            })
            .count()
    };

    let critical_flaws = failed_count(&CRITICAL_ITEMS);
    let non_critical_weaknesses = failed_count(&NON_CRITICAL_ITEMS);

    RatingSummary {
        rating: rate(critical_flaws, non_critical_weaknesses),
        critical_flaws,
        non_critical_weaknesses,
    }
}
