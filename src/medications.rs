//! Medication selection.
//!
//! The analysis service understands a fixed catalog of twelve drugs with
//! established pharmacogenomic dosing guidance. The user builds an
//! ordered, duplicate-free selection from that catalog; selection order
//! decides the order of result tabs, because the service returns one
//! report per drug aligned to the submitted list.

use serde::{Deserialize, Serialize};

/// Closed catalog of supported medications, canonical lowercase.
pub const SUPPORTED_MEDICATIONS: [&str; 12] = [
    "codeine",
    "tramadol",
    "clopidogrel",
    "escitalopram",
    "warfarin",
    "phenytoin",
    "simvastatin",
    "atorvastatin",
    "azathioprine",
    "mercaptopurine",
    "fluorouracil",
    "capecitabine",
];

/// Exact-match membership test. Candidates added to a selection must be
/// spelled exactly as the catalog spells them.
pub fn is_supported(name: &str) -> bool {
    SUPPORTED_MEDICATIONS.contains(&name)
}

/// Catalog entries containing `term` as a case-insensitive substring,
/// minus entries already selected. Re-evaluated per keystroke; the
/// catalog is small enough that nothing is cached.
pub fn filter_catalog<'a>(
    term: &str,
    selection: &'a MedicationSelection,
) -> impl Iterator<Item = &'static str> + 'a {
    let needle = term.to_lowercase();
    SUPPORTED_MEDICATIONS
        .iter()
        .copied()
        .filter(move |drug| drug.to_lowercase().contains(&needle) && !selection.contains(drug))
}

/// The user's ordered selection of distinct medications.
///
/// First-insertion order is preserved and significant. Starts empty and
/// is cleared on workflow reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicationSelection {
    drugs: Vec<String>,
}

impl MedicationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a medication if it is supported and not already present;
    /// anything else leaves the selection unchanged.
    pub fn add(&mut self, candidate: &str) -> &[String] {
        if is_supported(candidate) && !self.contains(candidate) {
            self.drugs.push(candidate.to_string());
        }
        &self.drugs
    }

    /// Remove a medication by value. Absent values are a no-op.
    pub fn remove(&mut self, candidate: &str) -> &[String] {
        self.drugs.retain(|d| d != candidate);
        &self.drugs
    }

    pub fn clear(&mut self) {
        self.drugs.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.drugs.iter().any(|d| d == name)
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.drugs
    }

    /// Wire form: comma-joined in selection order.
    pub fn joined(&self) -> String {
        self.drugs.join(",")
    }
}
