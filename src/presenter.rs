//! Result presentation state.
//!
//! Once a result set is on screen the user navigates it through three
//! pieces of view state: the active medication tab, at most one expanded
//! gene panel, and the raw-JSON view. All three live here, scoped to the
//! result set that produced them and dropped with it. Export helpers sit
//! at the bottom; they are pure reads over the report list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config;
use crate::report::{metric_title, quality_summary, AnalysisReport, RiskCategory, SeverityLevel};

/// One gene panel within one result tab.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenePanelKey {
    pub tab: usize,
    pub gene: usize,
}

/// Errors from presenter navigation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PresenterError {
    #[error("Result tab {index} out of range ({count} reports)")]
    TabOutOfRange { index: usize, count: usize },

    #[error("Gene panel {index} out of range ({count} genes)")]
    GeneOutOfRange { index: usize, count: usize },
}

/// View state over an ordered result set.
///
/// Fresh presenters point at the first tab with every auxiliary panel
/// closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPresenter {
    active_index: usize,
    expanded_gene: Option<GenePanelKey>,
    raw_open: bool,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self {
            active_index: 0,
            expanded_gene: None,
            raw_open: false,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn expanded_gene(&self) -> Option<GenePanelKey> {
        self.expanded_gene
    }

    pub fn raw_open(&self) -> bool {
        self.raw_open
    }

    /// Activate a tab. Every selection collapses the gene panel and the
    /// raw view, including re-selecting the already active tab.
    pub fn select_tab(&mut self, index: usize, report_count: usize) -> Result<(), PresenterError> {
        if index >= report_count {
            return Err(PresenterError::TabOutOfRange {
                index,
                count: report_count,
            });
        }
        self.active_index = index;
        self.expanded_gene = None;
        self.raw_open = false;
        Ok(())
    }

    /// Expand or collapse one gene panel on the active tab. Toggling the
    /// open panel closes it; toggling another panel replaces it, so at
    /// most one is open at a time.
    pub fn toggle_gene(&mut self, gene_index: usize, gene_count: usize) -> Result<(), PresenterError> {
        if gene_index >= gene_count {
            return Err(PresenterError::GeneOutOfRange {
                index: gene_index,
                count: gene_count,
            });
        }
        let key = GenePanelKey {
            tab: self.active_index,
            gene: gene_index,
        };
        self.expanded_gene = if self.expanded_gene == Some(key) {
            None
        } else {
            Some(key)
        };
        Ok(())
    }

    /// Flip the raw-JSON view.
    pub fn toggle_raw(&mut self) {
        self.raw_open = !self.raw_open;
    }

    /// Project the full view the webview renders.
    pub fn view(&self, results: &[AnalysisReport]) -> PresenterView {
        PresenterView {
            active_index: self.active_index,
            expanded_gene: self.expanded_gene,
            raw_open: self.raw_open,
            reports: results.iter().map(ReportView::from_report).collect(),
        }
    }
}

impl Default for ResultPresenter {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════
// View types serialised to the frontend
// ═══════════════════════════════════════════

/// Header row for one result tab: the derived display values next to
/// the raw ones the banner needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportView {
    pub drug: String,
    pub patient_id: String,
    pub timestamp: String,
    pub risk_category: RiskCategory,
    pub risk_banner: String,
    pub severity: SeverityLevel,
    pub confidence_percent: u8,
    pub quality_passed: usize,
    pub quality_total: usize,
    pub quality_metrics: Vec<MetricView>,
    pub gene_count: usize,
}

impl ReportView {
    fn from_report(report: &AnalysisReport) -> Self {
        let (quality_passed, quality_total) = quality_summary(&report.quality_metrics);
        let risk_category = report.risk_category();
        Self {
            drug: report.drug.clone(),
            patient_id: report.patient_id.clone(),
            timestamp: report.timestamp.clone(),
            risk_category,
            risk_banner: risk_category.banner().to_string(),
            severity: report.severity_level(),
            confidence_percent: report.confidence_percent(),
            quality_passed,
            quality_total,
            quality_metrics: report
                .quality_metrics
                .iter()
                .map(|(key, passed)| MetricView {
                    key: key.clone(),
                    title: metric_title(key),
                    passed: *passed,
                })
                .collect(),
            gene_count: report.pharmacogenomic_profile.len(),
        }
    }
}

/// One pass/fail indicator row in the quality metrics grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricView {
    pub key: String,
    pub title: String,
    pub passed: bool,
}

/// Complete presenter snapshot for the result screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenterView {
    pub active_index: usize,
    pub expanded_gene: Option<GenePanelKey>,
    pub raw_open: bool,
    pub reports: Vec<ReportView>,
}

// ═══════════════════════════════════════════
// Export
// ═══════════════════════════════════════════

/// Errors while writing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Pretty JSON for the entire result set, not just the active tab.
/// Shared by the copy buffer and the file download.
pub fn export_json(results: &[AnalysisReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

/// Artifact name for a downloaded result set, derived from the first
/// report's patient identifier.
pub fn export_file_name(results: &[AnalysisReport]) -> String {
    let patient_id = results
        .first()
        .map(|r| r.patient_id.as_str())
        .unwrap_or("unknown");
    format!("{}_{}.json", config::EXPORT_FILE_PREFIX, patient_id)
}

/// Write the export artifact into `dir`, returning the written path.
pub fn write_export(results: &[AnalysisReport], dir: &Path) -> Result<PathBuf, ExportError> {
    let json = export_json(results)?;
    let path = dir.join(export_file_name(results));
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), reports = results.len(), "Result set exported");
    Ok(path)
}
