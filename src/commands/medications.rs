//! Medication selection IPC commands.
//!
//! Four commands:
//! - `list_supported_medications`: the full fixed catalog
//! - `filter_medications`: search matches not already selected
//! - `add_medication`: append to the ordered selection
//! - `remove_medication`: drop from the ordered selection
//!
//! Add and remove return the updated selection so the frontend can
//! re-render the chips without a second round trip.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::medications::{filter_catalog, SUPPORTED_MEDICATIONS};

/// The full supported catalog, in catalog order.
#[tauri::command]
pub fn list_supported_medications() -> Vec<String> {
    SUPPORTED_MEDICATIONS.iter().map(|d| d.to_string()).collect()
}

/// Catalog entries matching the search term, excluding ones already
/// selected. Called on every keystroke.
#[tauri::command]
pub fn filter_medications(
    state: State<'_, Arc<CoreState>>,
    term: String,
) -> Result<Vec<String>, String> {
    let workflow = state.read_workflow().map_err(|e| e.to_string())?;
    Ok(filter_catalog(&term, workflow.selection())
        .map(|d| d.to_string())
        .collect())
}

/// Add one medication. Unsupported or duplicate candidates leave the
/// selection unchanged.
#[tauri::command]
pub fn add_medication(
    state: State<'_, Arc<CoreState>>,
    name: String,
) -> Result<Vec<String>, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    Ok(workflow.selection_mut().add(&name).to_vec())
}

/// Remove one medication by value.
#[tauri::command]
pub fn remove_medication(
    state: State<'_, Arc<CoreState>>,
    name: String,
) -> Result<Vec<String>, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    Ok(workflow.selection_mut().remove(&name).to_vec())
}
