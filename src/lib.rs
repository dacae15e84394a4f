pub mod client; // Analysis service HTTP client
pub mod commands;
pub mod config;
pub mod core_state;
pub mod error; // Canonical error records + normalization
pub mod medications;
pub mod presenter; // Result navigation + export
pub mod report;
pub mod upload;
pub mod workflow; // Submission state machine

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::client::HttpAnalysisClient;
use crate::core_state::CoreState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("PharmaGuard starting v{}", config::APP_VERSION);

    // The service address is resolved once here; everything downstream
    // goes through the injected client.
    let client = HttpAnalysisClient::from_config();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(Arc::new(CoreState::new(Box::new(client))))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::upload::select_input_file,
            commands::upload::clear_input_file,
            commands::upload::get_input_file,
            commands::medications::list_supported_medications,
            commands::medications::filter_medications,
            commands::medications::add_medication,
            commands::medications::remove_medication,
            commands::analysis::submit_analysis,
            commands::analysis::reset_workflow,
            commands::analysis::dismiss_error,
            commands::analysis::get_workflow_state,
            commands::results::select_result_tab,
            commands::results::toggle_gene_panel,
            commands::results::toggle_raw_view,
            commands::results::copy_results,
            commands::results::download_results,
        ])
        .run(tauri::generate_context!())
        .expect("error while running PharmaGuard");
}
