//! The analysis workflow state machine.
//!
//! One controller owns the genomic input file, the medication selection,
//! and exactly one active state: Idle, Loading, ResultReady, or Failed.
//! Every transition funnels through this type, so the rules live in one
//! place: submission requires both inputs, at most one request is in
//! flight, at most one error is visible, and presenter state exists only
//! while results do.

use serde::{Deserialize, Serialize};

use crate::error::{missing_input, normalize, protocol_violation, ApiFailure, ErrorRecord};
use crate::medications::MedicationSelection;
use crate::presenter::{PresenterError, PresenterView, ResultPresenter};
use crate::report::AnalysisReport;
use crate::upload::{FileSummary, InputFile};

/// The four workflow states. Exactly one is active at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Loading,
    ResultReady { results: Vec<AnalysisReport> },
    Failed { error: ErrorRecord },
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Idle
    }
}

impl WorkflowState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The visible error, if the workflow has failed.
    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// What a submit attempt decided before any network activity.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Preconditions hold; the state is Loading and this request should
    /// be issued.
    Ready(AnalysisRequest),
    /// A previous submission has not settled. Nothing was issued and
    /// nothing changed.
    InFlight,
    /// Missing file or empty selection. The state moved to Failed and
    /// nothing was issued.
    MissingInput,
}

/// The only unit the controller ever submits: one validated file plus a
/// non-empty ordered medication list, captured at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub file: InputFile,
    pub drugs: Vec<String>,
}

/// Errors from operations that need the workflow to be in a particular
/// state.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WorkflowError {
    #[error("No analysis results to present")]
    NoResults,

    #[error(transparent)]
    Presenter(#[from] PresenterError),
}

/// Client-side workflow controller: the active state plus the inputs it
/// guards.
#[derive(Debug, Default)]
pub struct Workflow {
    state: WorkflowState,
    input_file: Option<InputFile>,
    selection: MedicationSelection,
    /// Some iff state is ResultReady.
    presenter: Option<ResultPresenter>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    // ── Input ownership ──

    pub fn set_input_file(&mut self, file: InputFile) {
        self.input_file = Some(file);
    }

    pub fn clear_input_file(&mut self) {
        self.input_file = None;
    }

    pub fn input_file(&self) -> Option<&InputFile> {
        self.input_file.as_ref()
    }

    pub fn selection(&self) -> &MedicationSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut MedicationSelection {
        &mut self.selection
    }

    // ── Transitions ──

    /// First half of a submission: enforce the single-in-flight gate and
    /// the both-inputs precondition. On success the state reads Loading
    /// and the returned request carries a snapshot of the inputs; the
    /// remote call itself runs outside any lock.
    pub fn begin_submit(&mut self) -> SubmitOutcome {
        if self.state.is_loading() {
            return SubmitOutcome::InFlight;
        }

        // A new attempt replaces whatever result or error was on screen.
        let request = match (&self.input_file, self.selection.is_empty()) {
            (Some(file), false) => AnalysisRequest {
                file: file.clone(),
                drugs: self.selection.as_slice().to_vec(),
            },
            _ => {
                self.presenter = None;
                self.state = WorkflowState::Failed {
                    error: missing_input(),
                };
                return SubmitOutcome::MissingInput;
            }
        };

        self.presenter = None;
        self.state = WorkflowState::Loading;
        SubmitOutcome::Ready(request)
    }

    /// Second half of a submission: record the settled response for the
    /// request returned by [`begin_submit`]. A success whose report
    /// count does not match the submitted drug count is treated as a
    /// failure, since tabs and drugs must stay index-aligned.
    ///
    /// [`begin_submit`]: Workflow::begin_submit
    pub fn settle(
        &mut self,
        submitted_drugs: usize,
        outcome: Result<Vec<AnalysisReport>, ApiFailure>,
    ) {
        let outcome = outcome.and_then(|reports| {
            if reports.len() == submitted_drugs {
                Ok(reports)
            } else {
                Err(ApiFailure::Canonical(protocol_violation(format!(
                    "Expected {} reports, received {}",
                    submitted_drugs,
                    reports.len()
                ))))
            }
        });

        match outcome {
            Ok(results) => {
                self.presenter = Some(ResultPresenter::new());
                self.state = WorkflowState::ResultReady { results };
            }
            Err(failure) => {
                self.presenter = None;
                self.state = WorkflowState::Failed {
                    error: normalize(failure),
                };
            }
        }
    }

    /// Return to Idle, dropping the file, the selection, and any result
    /// or error. Ignored while a request is in flight; the submission
    /// settles first.
    pub fn reset(&mut self) {
        if self.state.is_loading() {
            tracing::debug!("Reset ignored while a submission is in flight");
            return;
        }
        self.state = WorkflowState::Idle;
        self.input_file = None;
        self.selection.clear();
        self.presenter = None;
    }

    /// Dismiss the visible error without touching the inputs. A no-op in
    /// any state but Failed.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, WorkflowState::Failed { .. }) {
            self.state = WorkflowState::Idle;
        }
    }

    // ── Result access ──

    /// The active result set; Some iff the state is ResultReady.
    pub fn results(&self) -> Option<&[AnalysisReport]> {
        match &self.state {
            WorkflowState::ResultReady { results } => Some(results),
            _ => None,
        }
    }

    /// Current presenter view; Some iff the state is ResultReady.
    pub fn presenter_view(&self) -> Option<PresenterView> {
        match (&self.presenter, self.results()) {
            (Some(presenter), Some(results)) => Some(presenter.view(results)),
            _ => None,
        }
    }

    /// Activate a result tab.
    pub fn select_result_tab(&mut self, index: usize) -> Result<PresenterView, WorkflowError> {
        let count = self
            .results()
            .map(|results| results.len())
            .ok_or(WorkflowError::NoResults)?;
        let presenter = self.presenter.as_mut().ok_or(WorkflowError::NoResults)?;
        presenter.select_tab(index, count)?;
        self.presenter_view().ok_or(WorkflowError::NoResults)
    }

    /// Expand or collapse one gene panel on the active tab.
    pub fn toggle_gene_panel(&mut self, gene_index: usize) -> Result<PresenterView, WorkflowError> {
        let gene_count = {
            let presenter = self.presenter.as_ref().ok_or(WorkflowError::NoResults)?;
            let results = self.results().ok_or(WorkflowError::NoResults)?;
            results
                .get(presenter.active_index())
                .map(|report| report.pharmacogenomic_profile.len())
                .unwrap_or(0)
        };
        let presenter = self.presenter.as_mut().ok_or(WorkflowError::NoResults)?;
        presenter.toggle_gene(gene_index, gene_count)?;
        self.presenter_view().ok_or(WorkflowError::NoResults)
    }

    /// Flip the raw-JSON view.
    pub fn toggle_raw_view(&mut self) -> Result<PresenterView, WorkflowError> {
        let presenter = self.presenter.as_mut().ok_or(WorkflowError::NoResults)?;
        presenter.toggle_raw();
        self.presenter_view().ok_or(WorkflowError::NoResults)
    }

    // ── Snapshot ──

    /// Everything the webview needs to render the current screen.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            state: self.state.clone(),
            file: self.input_file.as_ref().map(InputFile::summary),
            selection: self.selection.as_slice().to_vec(),
            presenter: self.presenter_view(),
        }
    }
}

/// Serialized workflow view for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub file: Option<FileSummary>,
    pub selection: Vec<String>,
    pub presenter: Option<PresenterView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::sample_report;
    use crate::error::{API_ERROR, MISSING_INPUT, NETWORK_ERROR};

    fn vcf_file() -> InputFile {
        InputFile {
            name: "patient_001.vcf".to_string(),
            content: b"##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\n".to_vec(),
        }
    }

    fn ready_workflow(drugs: &[&str]) -> Workflow {
        let mut workflow = Workflow::new();
        workflow.set_input_file(vcf_file());
        for drug in drugs {
            workflow.selection_mut().add(drug);
        }
        workflow
    }

    /// Drive a workflow into ResultReady with one report per drug.
    fn settled_workflow(drugs: &[&str]) -> Workflow {
        let mut workflow = ready_workflow(drugs);
        let request = match workflow.begin_submit() {
            SubmitOutcome::Ready(request) => request,
            other => panic!("expected Ready, got {other:?}"),
        };
        let reports = request.drugs.iter().map(|d| sample_report(d)).collect();
        workflow.settle(request.drugs.len(), Ok(reports));
        workflow
    }

    #[test]
    fn new_workflow_is_idle_and_empty() {
        let workflow = Workflow::new();
        assert!(workflow.state().is_idle());
        assert!(workflow.input_file().is_none());
        assert!(workflow.selection().is_empty());
        assert!(workflow.presenter_view().is_none());
    }

    #[test]
    fn submit_without_any_input_fails_locally() {
        let mut workflow = Workflow::new();
        assert_eq!(workflow.begin_submit(), SubmitOutcome::MissingInput);
        let error = workflow.state().error().expect("failed state");
        assert_eq!(error.code, MISSING_INPUT);
    }

    #[test]
    fn submit_with_file_but_no_drugs_fails_locally() {
        let mut workflow = Workflow::new();
        workflow.set_input_file(vcf_file());
        assert_eq!(workflow.begin_submit(), SubmitOutcome::MissingInput);
        assert_eq!(workflow.state().error().unwrap().code, MISSING_INPUT);
    }

    #[test]
    fn submit_with_drugs_but_no_file_fails_locally() {
        let mut workflow = Workflow::new();
        workflow.selection_mut().add("codeine");
        assert_eq!(workflow.begin_submit(), SubmitOutcome::MissingInput);
        assert_eq!(workflow.state().error().unwrap().code, MISSING_INPUT);
    }

    #[test]
    fn submit_with_both_inputs_goes_loading() {
        let mut workflow = ready_workflow(&["warfarin", "codeine"]);
        let request = match workflow.begin_submit() {
            SubmitOutcome::Ready(request) => request,
            other => panic!("expected Ready, got {other:?}"),
        };
        assert!(workflow.state().is_loading());
        assert_eq!(request.file.name, "patient_001.vcf");
        assert_eq!(request.drugs, ["warfarin", "codeine"]);
    }

    #[test]
    fn request_preserves_selection_order() {
        let mut workflow = ready_workflow(&["phenytoin", "azathioprine", "codeine"]);
        match workflow.begin_submit() {
            SubmitOutcome::Ready(request) => {
                assert_eq!(request.drugs, ["phenytoin", "azathioprine", "codeine"]);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut workflow = ready_workflow(&["codeine"]);
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        assert_eq!(workflow.begin_submit(), SubmitOutcome::InFlight);
        assert!(workflow.state().is_loading());
    }

    #[test]
    fn settle_success_reaches_result_ready() {
        let workflow = settled_workflow(&["warfarin", "codeine"]);
        let results = workflow.results().expect("results");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].drug, "warfarin");
        let view = workflow.presenter_view().expect("presenter");
        assert_eq!(view.active_index, 0);
        assert_eq!(view.reports.len(), 2);
    }

    #[test]
    fn settle_failure_reaches_failed_with_normalized_error() {
        let mut workflow = ready_workflow(&["codeine"]);
        let request = match workflow.begin_submit() {
            SubmitOutcome::Ready(request) => request,
            other => panic!("expected Ready, got {other:?}"),
        };
        workflow.settle(
            request.drugs.len(),
            Err(ApiFailure::Transport {
                message: "connection refused".to_string(),
            }),
        );
        let error = workflow.state().error().expect("failed state");
        assert_eq!(error.code, NETWORK_ERROR);
        assert!(workflow.presenter_view().is_none());
        // Inputs survive a failure for re-submission
        assert!(workflow.input_file().is_some());
        assert_eq!(workflow.selection().len(), 1);
    }

    #[test]
    fn report_count_mismatch_is_a_protocol_violation() {
        let mut workflow = ready_workflow(&["warfarin", "codeine"]);
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        workflow.settle(2, Ok(vec![sample_report("warfarin")]));
        let error = workflow.state().error().expect("failed state");
        assert_eq!(error.code, API_ERROR);
        assert!(error.details.as_deref().unwrap().contains("Expected 2"));
    }

    #[test]
    fn resubmit_after_failure_clears_the_error() {
        let mut workflow = ready_workflow(&["codeine"]);
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        workflow.settle(
            1,
            Err(ApiFailure::Transport {
                message: String::new(),
            }),
        );
        assert!(workflow.state().error().is_some());
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        assert!(workflow.state().is_loading());
        assert!(workflow.state().error().is_none());
    }

    #[test]
    fn resubmit_from_result_ready_discards_previous_results() {
        let mut workflow = settled_workflow(&["codeine"]);
        assert!(workflow.results().is_some());
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        assert!(workflow.state().is_loading());
        assert!(workflow.results().is_none());
        assert!(workflow.presenter_view().is_none());
    }

    #[test]
    fn reset_returns_to_pristine_idle() {
        let mut workflow = settled_workflow(&["warfarin"]);
        workflow.reset();
        assert!(workflow.state().is_idle());
        assert!(workflow.input_file().is_none());
        assert!(workflow.selection().is_empty());
        assert!(workflow.presenter_view().is_none());
    }

    #[test]
    fn reset_clears_a_failed_state_too() {
        let mut workflow = Workflow::new();
        assert_eq!(workflow.begin_submit(), SubmitOutcome::MissingInput);
        workflow.reset();
        assert!(workflow.state().is_idle());
    }

    #[test]
    fn reset_is_ignored_while_loading() {
        let mut workflow = ready_workflow(&["codeine"]);
        assert!(matches!(workflow.begin_submit(), SubmitOutcome::Ready(_)));
        workflow.reset();
        assert!(workflow.state().is_loading());
        assert!(workflow.input_file().is_some());
    }

    #[test]
    fn dismiss_error_keeps_inputs() {
        let mut workflow = Workflow::new();
        workflow.set_input_file(vcf_file());
        assert_eq!(workflow.begin_submit(), SubmitOutcome::MissingInput);
        workflow.dismiss_error();
        assert!(workflow.state().is_idle());
        assert!(workflow.input_file().is_some());
    }

    #[test]
    fn dismiss_error_outside_failed_is_noop() {
        let mut workflow = settled_workflow(&["codeine"]);
        workflow.dismiss_error();
        assert!(workflow.results().is_some());
    }

    #[test]
    fn presenter_ops_require_results() {
        let mut workflow = Workflow::new();
        assert_eq!(
            workflow.select_result_tab(0).unwrap_err(),
            WorkflowError::NoResults
        );
        assert_eq!(
            workflow.toggle_gene_panel(0).unwrap_err(),
            WorkflowError::NoResults
        );
        assert_eq!(
            workflow.toggle_raw_view().unwrap_err(),
            WorkflowError::NoResults
        );
    }

    #[test]
    fn tab_navigation_through_workflow() {
        let mut workflow = settled_workflow(&["warfarin", "codeine"]);
        let view = workflow.select_result_tab(1).unwrap();
        assert_eq!(view.active_index, 1);
        let err = workflow.select_result_tab(5).unwrap_err();
        assert!(matches!(err, WorkflowError::Presenter(_)));
    }

    #[test]
    fn gene_panel_toggles_against_active_report() {
        let mut workflow = settled_workflow(&["warfarin"]);
        // sample reports carry one gene profile
        let view = workflow.toggle_gene_panel(0).unwrap();
        assert!(view.expanded_gene.is_some());
        assert!(workflow.toggle_gene_panel(1).is_err());
    }

    #[test]
    fn snapshot_serializes_state_tags() {
        let workflow = Workflow::new();
        let json = serde_json::to_string(&workflow.snapshot()).unwrap();
        assert!(json.contains("\"status\":\"idle\""));

        let workflow = settled_workflow(&["codeine"]);
        let json = serde_json::to_string(&workflow.snapshot()).unwrap();
        assert!(json.contains("\"status\":\"result_ready\""));
        assert!(json.contains("\"results\""));

        let mut workflow = Workflow::new();
        workflow.begin_submit();
        let json = serde_json::to_string(&workflow.snapshot()).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains(MISSING_INPUT));
    }

    #[test]
    fn snapshot_carries_file_summary_and_selection() {
        let workflow = ready_workflow(&["warfarin", "codeine"]);
        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.file.unwrap().name, "patient_001.vcf");
        assert_eq!(snapshot.selection, ["warfarin", "codeine"]);
        assert!(snapshot.presenter.is_none());
    }
}
