use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "PharmaGuard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analysis service address used when PHARMAGUARD_API_URL is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Largest genomic file accepted for upload (5 MiB).
pub const MAX_VCF_BYTES: u64 = 5 * 1024 * 1024;

/// Ceiling for one analysis round trip, which covers every selected drug.
pub const ANALYZE_TIMEOUT_SECS: u64 = 300;

/// Prefix for exported report files: pharmaguard_<patient_id>.json
pub const EXPORT_FILE_PREFIX: &str = "pharmaguard";

/// Base URL of the analysis service.
/// Resolved once at startup; the rest of the app never reads the environment.
pub fn api_base_url() -> String {
    std::env::var("PHARMAGUARD_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// Where exported reports land when the caller does not pick a directory:
/// the user's download directory, falling back to home.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,pharmaguard_lib=debug".to_string()
}
