//! Genomic file intake.
//!
//! A candidate VCF passes two checks before it can enter the workflow:
//! the name must end in the literal `.vcf` extension, and the size must
//! stay within [`config::MAX_VCF_BYTES`]. Rejections are reported inline
//! at the file input and never touch the workflow state machine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config;

/// A validated genomic input file, held by the workflow until it is
/// replaced or the workflow resets.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl InputFile {
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary::new(&self.name, self.size_bytes())
    }
}

/// File metadata shown in the upload chip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
    /// Size in MB with two decimals, e.g. "0.43".
    pub size_mb: String,
}

impl FileSummary {
    pub fn new(name: &str, size_bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            size_bytes,
            size_mb: format!("{:.2}", as_mb(size_bytes)),
        }
    }
}

/// Why a candidate file was refused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    InvalidFileType,
    TooLarge { size_bytes: u64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFileType => {
                write!(f, "Invalid file type. Only .vcf files are accepted.")
            }
            Self::TooLarge { size_bytes } => {
                write!(
                    f,
                    "File too large ({:.2} MB). Maximum is 5 MB.",
                    as_mb(*size_bytes)
                )
            }
        }
    }
}

/// Outcome of checking a candidate against the acceptance rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(RejectReason),
}

/// Check name and size against the acceptance rules.
///
/// Extension first, then size: a candidate failing both reports the
/// extension. The suffix match is case-sensitive, so `.VCF` is refused.
pub fn validate_candidate(name: &str, size_bytes: u64) -> ValidationOutcome {
    if !name.ends_with(".vcf") {
        return ValidationOutcome::Rejected(RejectReason::InvalidFileType);
    }
    if size_bytes > config::MAX_VCF_BYTES {
        return ValidationOutcome::Rejected(RejectReason::TooLarge { size_bytes });
    }
    ValidationOutcome::Accepted
}

/// Errors while loading a candidate file from disk.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path is not a regular file: {0}")]
    NotAFile(String),

    #[error("{0}")]
    Rejected(RejectReason),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a candidate from disk. Name and size are validated before any
/// content is read, so an oversized file is never pulled into memory.
pub fn load_input_file(path: &Path) -> Result<InputFile, UploadError> {
    if !path.exists() {
        return Err(UploadError::NotFound(path.display().to_string()));
    }
    if !path.is_file() {
        return Err(UploadError::NotAFile(path.display().to_string()));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let size_bytes = std::fs::metadata(path)?.len();

    match validate_candidate(&name, size_bytes) {
        ValidationOutcome::Accepted => {
            let content = std::fs::read(path)?;
            tracing::info!(file = %name, size_bytes, "Input file accepted");
            Ok(InputFile { name, content })
        }
        ValidationOutcome::Rejected(reason) => {
            tracing::debug!(file = %name, %reason, "Input file rejected");
            Err(UploadError::Rejected(reason))
        }
    }
}

fn as_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
