//! Error types for ethoframe

use thiserror::Error;

/// Errors that can occur while building a dataset descriptor
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read input: {0}")]
    InputRead(String),

    #[error("No CSV/TSV files found in {0}")]
    NoInputFiles(String),

    #[error("No behaviors found across {0} input file(s)")]
    NoBehaviors(usize),

    #[error("No class directories found in {0}")]
    NoClassDirectories(String),

    #[error("No readable videos found in {0}")]
    NoValidVideos(String),

    #[error("Frame count probe failed: {0}")]
    ProbeError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid dataset descriptor: {0}")]
    InvalidDescriptor(String),
}
