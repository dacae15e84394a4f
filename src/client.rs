//! HTTP client for the remote pharmacogenomic analysis service.
//!
//! One call shape: a single multipart POST carrying the raw VCF bytes
//! and the comma-joined medication list. The service fans out per drug
//! internally and answers with an ordered report list. Nothing is
//! retried; every way the call can fail is classified into an
//! [`ApiFailure`] for the normalizer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::config;
use crate::error::{protocol_violation, ApiFailure, ErrorRecord};
use crate::report::{
    AnalysisReport, ClinicalRecommendation, DetectedVariant, GeneProfile, LlmExplanation,
    RiskAssessment,
};
use crate::upload::InputFile;

/// Seam between the workflow controller and the remote service.
pub trait AnalysisApi: Send + Sync {
    /// Submit one file with the full ordered drug list. Exactly one
    /// round trip per call.
    fn analyze(&self, file: &InputFile, drugs: &[String])
        -> Result<Vec<AnalysisReport>, ApiFailure>;
}

/// Blocking reqwest client for the real service.
pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpAnalysisClient {
    /// Create a client pointing at an analysis service instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client for the configured service address with the standard
    /// analysis timeout.
    pub fn from_config() -> Self {
        Self::new(&config::api_base_url(), config::ANALYZE_TIMEOUT_SECS)
    }
}

impl AnalysisApi for HttpAnalysisClient {
    fn analyze(
        &self,
        file: &InputFile,
        drugs: &[String],
    ) -> Result<Vec<AnalysisReport>, ApiFailure> {
        let url = format!("{}/api/analyze", self.base_url);
        let form = reqwest::blocking::multipart::Form::new()
            .part(
                "file",
                reqwest::blocking::multipart::Part::bytes(file.content.clone())
                    .file_name(file.name.clone()),
            )
            .text("drug", drugs.join(","));

        let response = self.client.post(&url).multipart(form).send().map_err(|e| {
            if e.is_timeout() {
                ApiFailure::Transport {
                    message: format!("Request timed out after {}s", self.timeout_secs),
                }
            } else {
                ApiFailure::Transport {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_error_body(status.as_u16(), &body));
        }

        response.json().map_err(|e| {
            ApiFailure::Canonical(protocol_violation(format!(
                "Undecodable analysis response: {e}"
            )))
        })
    }
}

/// Classify a non-2xx response body into a failure shape.
///
/// A JSON body with a canonical top-level `error` record passes
/// through; a body with a top-level `detail` is handed to the
/// normalizer as-is; anything else degrades to a transport failure
/// carrying the generic status message.
pub fn classify_error_body(status: u16, body: &str) -> ApiFailure {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(error) = value.get("error") {
            if let Ok(record) = serde_json::from_value::<ErrorRecord>(error.clone()) {
                return ApiFailure::Canonical(record);
            }
        }
        if let Some(detail) = value.get("detail") {
            return ApiFailure::Detail(detail.clone());
        }
    }
    ApiFailure::Transport {
        message: format!("Request failed with status code {status}"),
    }
}

// ═══════════════════════════════════════════
// Mock client + fixtures
// ═══════════════════════════════════════════

/// Mock analysis service for tests. Returns a scripted outcome and
/// counts calls, so tests can prove whether a request was issued.
pub struct MockAnalysisClient {
    /// None means echo mode: one generated report per submitted drug.
    response: Option<Result<Vec<AnalysisReport>, ApiFailure>>,
    calls: Arc<AtomicUsize>,
}

impl MockAnalysisClient {
    /// One generated report per submitted drug, in submission order.
    pub fn echoing() -> Self {
        Self {
            response: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_reports(reports: Vec<AnalysisReport>) -> Self {
        Self {
            response: Some(Ok(reports)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_failure(failure: ApiFailure) -> Self {
        Self {
            response: Some(Err(failure)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, usable after the mock has been
    /// boxed into a [`crate::core_state::CoreState`].
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl AnalysisApi for MockAnalysisClient {
    fn analyze(
        &self,
        _file: &InputFile,
        drugs: &[String],
    ) -> Result<Vec<AnalysisReport>, ApiFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(outcome) => outcome.clone(),
            None => Ok(drugs.iter().map(|drug| sample_report(drug)).collect()),
        }
    }
}

/// A plausible single-drug report for mocks and tests.
pub fn sample_report(drug: &str) -> AnalysisReport {
    AnalysisReport {
        patient_id: uuid::Uuid::new_v4().to_string(),
        drug: drug.to_string(),
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        risk_assessment: RiskAssessment {
            risk_label: "Adjust Dosage".to_string(),
            severity: "moderate".to_string(),
            confidence_score: 0.82,
        },
        pharmacogenomic_profile: vec![GeneProfile {
            gene: "CYP2D6".to_string(),
            star_allele_1: "*1".to_string(),
            star_allele_2: "*4".to_string(),
            diplotype: "*1/*4".to_string(),
            phenotype: "Intermediate Metabolizer".to_string(),
            detected_variants: vec![DetectedVariant {
                rsid: "rs3892097".to_string(),
                gene: "CYP2D6".to_string(),
                reference: "C".to_string(),
                alt: "T".to_string(),
                genotype: "0/1".to_string(),
                star_allele: "*4".to_string(),
            }],
        }],
        clinical_recommendation: ClinicalRecommendation {
            summary: format!("Review {drug} dosing against CYP2D6 intermediate metabolizer status"),
            dosing_guidance: "Consider a reduced starting dose with stepwise titration".to_string(),
            monitoring_requirements: "Monitor response and adverse effects over the first two weeks"
                .to_string(),
        },
        llm_generated_explanation: LlmExplanation {
            mechanism: "The *4 allele reduces CYP2D6 activity, slowing drug clearance".to_string(),
            clinical_context: "Intermediate metabolizers can reach higher plasma levels at standard doses"
                .to_string(),
            patient_friendly_summary: "Your body processes this medication more slowly than average"
                .to_string(),
        },
        quality_metrics: std::collections::BTreeMap::from([
            ("vcf_parsing_success".to_string(), true),
            ("gene_variants_found".to_string(), true),
            ("star_allele_determined".to_string(), true),
            ("phenotype_determined".to_string(), true),
            ("recommendation_generated".to_string(), true),
            ("llm_explanation_generated".to_string(), true),
        ]),
    }
}
