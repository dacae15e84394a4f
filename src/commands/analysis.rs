//! Workflow IPC commands.
//!
//! Four commands:
//! - `submit_analysis`: run one submission end to end
//! - `reset_workflow`: back to Idle, dropping every input and outcome
//! - `dismiss_error`: clear the visible error, keep the inputs
//! - `get_workflow_state`: snapshot for rendering
//!
//! `submit_analysis` blocks its command thread for the duration of the
//! round trip; the webview keeps rendering, polls `get_workflow_state`,
//! and sees Loading until the submission settles. Commands are sync on
//! purpose: the service client is a blocking reqwest client.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::workflow::WorkflowSnapshot;

/// Run one submission: precondition check, a single remote round trip,
/// and the settled snapshot. With a submission already in flight the
/// current Loading snapshot comes back and nothing is issued.
#[tauri::command]
pub fn submit_analysis(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    state.submit().map_err(|e| e.to_string())
}

/// Return to a pristine Idle workflow. Ignored while a submission is in
/// flight.
#[tauri::command]
pub fn reset_workflow(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.reset();
    Ok(workflow.snapshot())
}

/// Dismiss the visible error without touching the inputs.
#[tauri::command]
pub fn dismiss_error(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.dismiss_error();
    Ok(workflow.snapshot())
}

/// Current workflow snapshot.
#[tauri::command]
pub fn get_workflow_state(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    state.snapshot().map_err(|e| e.to_string())
}
