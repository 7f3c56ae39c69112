//! Error types for ingestion.
//!
//! Two tiers: [`DegradeReason`] never leaves the component that detected it and only empties a field;
//! [`IngestError`] is what reaches the caller of a run.

use std::path::PathBuf;
use thiserror::Error;

/// Why a field (metadata, hash, thumbnail) was left empty. Recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegradeReason {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("{tool} not found")]
    ToolMissing { tool: String },

    #[error("{tool} timed out after {secs}s")]
    ToolTimeout { tool: String, secs: u64 },

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },

    #[error("{tool} produced malformed output: {detail}")]
    MalformedOutput { tool: String, detail: String },

    #[error("{tool} finished but wrote no output")]
    NoOutput { tool: String },
}

impl DegradeReason {
    /// True for conditions caused by the external tool rather than the file.
    pub fn is_tool_condition(&self) -> bool {
        matches!(
            self,
            DegradeReason::ToolMissing { .. }
                | DegradeReason::ToolTimeout { .. }
                | DegradeReason::ToolFailed { .. }
                | DegradeReason::MalformedOutput { .. }
                | DegradeReason::NoOutput { .. }
        )
    }
}

impl From<std::io::Error> for DegradeReason {
    fn from(e: std::io::Error) -> Self {
        DegradeReason::Io(e.to_string())
    }
}

impl From<image::ImageError> for DegradeReason {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => DegradeReason::Io(io.to_string()),
            other => DegradeReason::Decode(other.to_string()),
        }
    }
}

/// Terminal conditions of an ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Scan root does not exist. Nothing was ingested.
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Another run is still active on this library.
    #[error("an ingestion run is already in progress")]
    AlreadyRunning,

    /// The worker thread panicked.
    #[error("ingestion worker panicked")]
    WorkerPanicked,

    /// Anything outside per-file degradation (catalog write failure, etc.).
    /// Records committed before the failure are kept.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
