//! File intake IPC commands.
//!
//! The frontend hands over a path picked through the dialog plugin; the
//! core validates, loads, and owns the file from then on. A rejection
//! comes back as the command error string and leaves the workflow
//! untouched, so the message can sit inline next to the file input.

use std::path::Path;
use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::upload::{load_input_file, FileSummary};

/// Validate a candidate VCF and take ownership of it.
///
/// Replaces any previously held file. `Err` carries the inline
/// rejection message.
#[tauri::command]
pub fn select_input_file(
    state: State<'_, Arc<CoreState>>,
    path: String,
) -> Result<FileSummary, String> {
    let file = load_input_file(Path::new(&path)).map_err(|e| e.to_string())?;
    let summary = file.summary();

    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.set_input_file(file);
    Ok(summary)
}

/// Drop the held file without touching the rest of the workflow.
#[tauri::command]
pub fn clear_input_file(state: State<'_, Arc<CoreState>>) -> Result<(), String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.clear_input_file();
    Ok(())
}

/// Summary of the held file for the upload chip, if any.
#[tauri::command]
pub fn get_input_file(state: State<'_, Arc<CoreState>>) -> Result<Option<FileSummary>, String> {
    let workflow = state.read_workflow().map_err(|e| e.to_string())?;
    Ok(workflow.input_file().map(|file| file.summary()))
}
