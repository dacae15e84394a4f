//! Per-drug analysis reports.
//!
//! These types mirror the analysis service response schema field for
//! field. A report is immutable once received: export re-serializes it
//! losslessly, and everything the result screen shows is derived
//! through the pure transforms at the bottom of this module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Wire types, one report per submitted drug
// ═══════════════════════════════════════════

/// Complete analysis for one medication against one genomic file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    /// Service-assigned identifier for this analysis run.
    pub patient_id: String,
    pub drug: String,
    /// UTC, `%Y-%m-%dT%H:%M:%SZ`.
    pub timestamp: String,
    pub risk_assessment: RiskAssessment,
    pub pharmacogenomic_profile: Vec<GeneProfile>,
    pub clinical_recommendation: ClinicalRecommendation,
    pub llm_generated_explanation: LlmExplanation,
    /// Pipeline stage outcomes keyed by stage name, e.g.
    /// `vcf_parsing_success`. Keys are not interpreted, only displayed.
    pub quality_metrics: BTreeMap<String, bool>,
}

impl AnalysisReport {
    pub fn risk_category(&self) -> RiskCategory {
        RiskCategory::from_label(&self.risk_assessment.risk_label)
    }

    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::from_label(&self.risk_assessment.severity)
    }

    pub fn confidence_percent(&self) -> u8 {
        confidence_percent(self.risk_assessment.confidence_score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    /// Raw service label. Display goes through [`RiskCategory`] so an
    /// unexpected label degrades instead of breaking the screen.
    pub risk_label: String,
    pub severity: String,
    /// Service contract keeps this within [0, 1].
    pub confidence_score: f64,
}

/// Star-allele calling for one gene relevant to the drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneProfile {
    pub gene: String,
    pub star_allele_1: String,
    pub star_allele_2: String,
    /// E.g. `*1/*4`.
    pub diplotype: String,
    /// Metabolizer phenotype, e.g. `Poor Metabolizer`.
    pub phenotype: String,
    /// Empty when the genome matched the reference for this gene.
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedVariant {
    pub rsid: String,
    pub gene: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
    pub genotype: String,
    pub star_allele: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalRecommendation {
    pub summary: String,
    pub dosing_guidance: String,
    pub monitoring_requirements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmExplanation {
    pub mechanism: String,
    pub clinical_context: String,
    pub patient_friendly_summary: String,
}

// ═══════════════════════════════════════════
// Display transforms
// ═══════════════════════════════════════════

/// Closed set of display categories for the risk banner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Safe,
    AdjustDosage,
    Toxic,
    Ineffective,
    Unknown,
}

impl RiskCategory {
    /// Canonicalize a service label. Labels outside the four known
    /// categories display as Unknown rather than failing.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Safe" => Self::Safe,
            "Adjust Dosage" => Self::AdjustDosage,
            "Toxic" => Self::Toxic,
            "Ineffective" => Self::Ineffective,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::AdjustDosage => "Adjust Dosage",
            Self::Toxic => "Toxic",
            Self::Ineffective => "Ineffective",
            Self::Unknown => "Unknown",
        }
    }

    /// Uppercase form for the result header banner.
    pub fn banner(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::AdjustDosage => "ADJUST DOSAGE",
            Self::Toxic => "TOXIC",
            Self::Ineffective => "INEFFECTIVE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Severity scale for the risk badge. Ordered, lowest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl SeverityLevel {
    /// Unrecognized severities display at the lowest intensity.
    pub fn from_label(label: &str) -> Self {
        match label {
            "none" => Self::None,
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Whole-number percentage for a confidence score, clamped to [0, 100].
pub fn confidence_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Title for a quality-metric key: underscores to spaces, each word
/// capitalized. `vcf_parsing_success` renders as `Vcf Parsing Success`.
pub fn metric_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `passed / total` pair shown above the quality metrics grid.
pub fn quality_summary(metrics: &BTreeMap<String, bool>) -> (usize, usize) {
    let passed = metrics.values().filter(|passed| **passed).count();
    (passed, metrics.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn risk_labels_canonicalize() {
        assert_eq!(RiskCategory::from_label("Safe"), RiskCategory::Safe);
        assert_eq!(
            RiskCategory::from_label("Adjust Dosage"),
            RiskCategory::AdjustDosage
        );
        assert_eq!(RiskCategory::from_label("Toxic"), RiskCategory::Toxic);
        assert_eq!(
            RiskCategory::from_label("Ineffective"),
            RiskCategory::Ineffective
        );
    }

    #[test]
    fn unexpected_risk_label_degrades_to_unknown() {
        assert_eq!(RiskCategory::from_label("Hazardous"), RiskCategory::Unknown);
        assert_eq!(RiskCategory::from_label(""), RiskCategory::Unknown);
        // Case matters: the service sends title case
        assert_eq!(RiskCategory::from_label("toxic"), RiskCategory::Unknown);
    }

    #[test]
    fn banner_is_uppercase_form() {
        assert_eq!(RiskCategory::AdjustDosage.banner(), "ADJUST DOSAGE");
        assert_eq!(RiskCategory::Toxic.banner(), "TOXIC");
        assert_eq!(RiskCategory::Toxic.as_str(), "Toxic");
    }

    #[test]
    fn severity_labels_canonicalize_with_floor_fallback() {
        assert_eq!(SeverityLevel::from_label("high"), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_label("critical"), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_label("mystery"), SeverityLevel::None);
    }

    #[test]
    fn severity_orders_by_intensity() {
        assert!(SeverityLevel::None < SeverityLevel::Low);
        assert!(SeverityLevel::High < SeverityLevel::Critical);
    }

    #[test]
    fn confidence_renders_as_whole_percent() {
        assert_eq!(confidence_percent(0.87), 87);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
        assert_eq!(confidence_percent(0.005), 1);
    }

    #[test]
    fn confidence_clamps_out_of_range_scores() {
        assert_eq!(confidence_percent(1.7), 100);
        assert_eq!(confidence_percent(-0.2), 0);
    }

    #[test]
    fn metric_titles_capitalize_each_word() {
        assert_eq!(metric_title("vcf_parsing_success"), "Vcf Parsing Success");
        assert_eq!(
            metric_title("llm_explanation_generated"),
            "Llm Explanation Generated"
        );
        assert_eq!(metric_title("single"), "Single");
    }

    #[test]
    fn quality_summary_counts_passed_over_total() {
        let metrics = BTreeMap::from([
            ("a".to_string(), true),
            ("b".to_string(), false),
            ("c".to_string(), true),
        ]);
        assert_eq!(quality_summary(&metrics), (2, 3));
        assert_eq!(quality_summary(&BTreeMap::new()), (0, 0));
    }

    #[test]
    fn report_parses_service_response() {
        let body = json!({
            "patient_id": "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9",
            "drug": "codeine",
            "timestamp": "2025-03-14T09:26:53Z",
            "risk_assessment": {
                "risk_label": "Toxic",
                "severity": "high",
                "confidence_score": 0.87
            },
            "pharmacogenomic_profile": [{
                "gene": "CYP2D6",
                "star_allele_1": "*1",
                "star_allele_2": "*1xN",
                "diplotype": "*1/*1xN",
                "phenotype": "Ultrarapid Metabolizer",
                "detected_variants": [{
                    "rsid": "rs1065852",
                    "gene": "CYP2D6",
                    "ref": "G",
                    "alt": "A",
                    "genotype": "1/1",
                    "star_allele": "*10"
                }]
            }],
            "clinical_recommendation": {
                "summary": "Avoid codeine",
                "dosing_guidance": "Use a non-tramadol alternative",
                "monitoring_requirements": "Watch for opioid toxicity"
            },
            "llm_generated_explanation": {
                "mechanism": "Ultrarapid CYP2D6 conversion to morphine",
                "clinical_context": "Risk of overdose at standard doses",
                "patient_friendly_summary": "Your body converts codeine unusually fast"
            },
            "quality_metrics": {
                "vcf_parsing_success": true,
                "gene_variants_found": true,
                "star_allele_determined": true,
                "phenotype_determined": true,
                "recommendation_generated": true,
                "llm_explanation_generated": false
            }
        });

        let report: AnalysisReport = serde_json::from_value(body).unwrap();
        assert_eq!(report.drug, "codeine");
        assert_eq!(report.risk_category(), RiskCategory::Toxic);
        assert_eq!(report.severity_level(), SeverityLevel::High);
        assert_eq!(report.confidence_percent(), 87);
        assert_eq!(report.pharmacogenomic_profile[0].detected_variants[0].reference, "G");
        assert_eq!(quality_summary(&report.quality_metrics), (5, 6));
    }

    #[test]
    fn report_reserializes_ref_field_name() {
        let variant = DetectedVariant {
            rsid: "rs4244285".to_string(),
            gene: "CYP2C19".to_string(),
            reference: "G".to_string(),
            alt: "A".to_string(),
            genotype: "0/1".to_string(),
            star_allele: "*2".to_string(),
        };
        let json = serde_json::to_string(&variant).unwrap();
        assert!(json.contains("\"ref\":\"G\""));
        assert!(!json.contains("reference"));
    }

    #[test]
    fn empty_variant_list_means_reference_genome() {
        let profile: GeneProfile = serde_json::from_value(json!({
            "gene": "TPMT",
            "star_allele_1": "*1",
            "star_allele_2": "*1",
            "diplotype": "*1/*1",
            "phenotype": "Normal Metabolizer",
            "detected_variants": []
        }))
        .unwrap();
        assert!(profile.detected_variants.is_empty());
    }
}
