pub mod analysis;
pub mod medications;
pub mod results;
pub mod upload;

/// Health check command for verifying the IPC bridge.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}
