//! Shared application state.
//!
//! One `CoreState` is created at startup, wrapped in `Arc`, and handed
//! to every IPC command. It owns the workflow controller behind an
//! `RwLock` and the analysis-service client behind the [`AnalysisApi`]
//! seam, so commands and tests talk to the same state through the same
//! methods.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::client::AnalysisApi;
use crate::workflow::{SubmitOutcome, Workflow, WorkflowSnapshot};

// ═══════════════════════════════════════════════════════════
// CoreState, shared by every IPC command
// ═══════════════════════════════════════════════════════════

/// Transport-agnostic application state.
///
/// The workflow sits behind an `RwLock`: snapshot reads are concurrent,
/// transitions take the write lock briefly. The remote analysis call
/// never runs under the lock; the workflow already reads Loading while
/// the request is in flight, and that alone enforces the
/// one-outstanding-request rule.
pub struct CoreState {
    workflow: RwLock<Workflow>,
    client: Box<dyn AnalysisApi>,
}

impl CoreState {
    /// Create the shared state around the service client used for every
    /// submission.
    pub fn new(client: Box<dyn AnalysisApi>) -> Self {
        Self {
            workflow: RwLock::new(Workflow::new()),
            client,
        }
    }

    // ── Workflow access ─────────────────────────────────────

    /// Acquire a read lock on the workflow.
    pub fn read_workflow(&self) -> Result<RwLockReadGuard<'_, Workflow>, CoreError> {
        self.workflow.read().map_err(|_| CoreError::LockPoisoned)
    }

    /// Acquire a write lock on the workflow.
    pub fn write_workflow(&self) -> Result<RwLockWriteGuard<'_, Workflow>, CoreError> {
        self.workflow.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Snapshot the current workflow for rendering.
    pub fn snapshot(&self) -> Result<WorkflowSnapshot, CoreError> {
        Ok(self.read_workflow()?.snapshot())
    }

    // ── Submission ──────────────────────────────────────────

    /// Run one full submission.
    ///
    /// The gate and precondition check happen under the write lock, the
    /// blocking remote call runs with the lock released, and the settled
    /// outcome is recorded under the lock again. Rejected attempts (in
    /// flight, missing input) return the current snapshot without any
    /// network activity.
    pub fn submit(&self) -> Result<WorkflowSnapshot, CoreError> {
        let request = {
            let mut workflow = self.write_workflow()?;
            match workflow.begin_submit() {
                SubmitOutcome::Ready(request) => request,
                SubmitOutcome::InFlight => {
                    tracing::debug!("Submission ignored: a request is already in flight");
                    return Ok(workflow.snapshot());
                }
                SubmitOutcome::MissingInput => {
                    tracing::debug!("Submission refused: missing file or empty selection");
                    return Ok(workflow.snapshot());
                }
            }
        };

        tracing::info!(
            file = %request.file.name,
            drugs = %request.drugs.join(","),
            "Submitting analysis request"
        );
        let outcome = self.client.analyze(&request.file, &request.drugs);
        match &outcome {
            Ok(reports) => tracing::info!(reports = reports.len(), "Analysis settled"),
            Err(failure) => tracing::warn!(%failure, "Analysis request failed"),
        }

        let mut workflow = self.write_workflow()?;
        workflow.settle(request.drugs.len(), outcome);
        Ok(workflow.snapshot())
    }
}

/// Errors from core state operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}
