use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Faults that end a scan before any response section can be read.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("image file not found: {path}")]
    ImageNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no API key configured (set API_key in the env file)")]
    MissingApiKey,
    #[error("error sending request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("vision API answered with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode vision API response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ScanError {
    /// Connectivity, timeout, status and decode faults all come from the network call.
    pub fn is_network(&self) -> bool {
        matches!(self, ScanError::Request(_) | ScanError::Status { .. } | ScanError::Decode(_))
    }
}
