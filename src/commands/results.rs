//! Result presentation IPC commands.
//!
//! Five commands:
//! - `select_result_tab`: activate one medication tab
//! - `toggle_gene_panel`: expand or collapse a gene panel
//! - `toggle_raw_view`: flip the raw-JSON view
//! - `copy_results`: serialized result set for the clipboard
//! - `download_results`: write the export file, return its path
//!
//! All five require the workflow to hold results; outside ResultReady
//! they fail with the same message the frontend shows as a toast.

use std::path::PathBuf;
use std::sync::Arc;

use tauri::State;

use crate::config;
use crate::core_state::CoreState;
use crate::presenter::{export_json, write_export, PresenterView};

/// Activate a result tab. Collapses the gene panel and the raw view.
#[tauri::command]
pub fn select_result_tab(
    state: State<'_, Arc<CoreState>>,
    index: usize,
) -> Result<PresenterView, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.select_result_tab(index).map_err(|e| e.to_string())
}

/// Expand or collapse one gene panel on the active tab.
#[tauri::command]
pub fn toggle_gene_panel(
    state: State<'_, Arc<CoreState>>,
    gene_index: usize,
) -> Result<PresenterView, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.toggle_gene_panel(gene_index).map_err(|e| e.to_string())
}

/// Flip the raw-JSON view for the current result set.
#[tauri::command]
pub fn toggle_raw_view(state: State<'_, Arc<CoreState>>) -> Result<PresenterView, String> {
    let mut workflow = state.write_workflow().map_err(|e| e.to_string())?;
    workflow.toggle_raw_view().map_err(|e| e.to_string())
}

/// Pretty JSON of the complete result set for the clipboard. Pure read;
/// presenter state is untouched.
#[tauri::command]
pub fn copy_results(state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    let workflow = state.read_workflow().map_err(|e| e.to_string())?;
    let results = workflow.results().ok_or("No analysis results to present")?;
    export_json(results).map_err(|e| e.to_string())
}

/// Write the export file and return the written path. Defaults to the
/// user's download directory when no directory is given.
#[tauri::command]
pub fn download_results(
    state: State<'_, Arc<CoreState>>,
    directory: Option<String>,
) -> Result<String, String> {
    let dir = directory
        .map(PathBuf::from)
        .unwrap_or_else(config::default_export_dir);

    let workflow = state.read_workflow().map_err(|e| e.to_string())?;
    let results = workflow.results().ok_or("No analysis results to present")?;
    let path = write_export(results, &dir).map_err(|e| e.to_string())?;
    Ok(path.display().to_string())
}
