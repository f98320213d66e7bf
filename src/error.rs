use std::time::Duration;

use thiserror::Error;

/// Main error type for the delivery planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Media analysis unavailable: {0}")]
    AnalysisUnavailable(#[from] ProbeError),

    #[error("Profile not found: {0}")]
    ProfileNotFound(usize),

    #[error("No viable delivery protocol for this source")]
    NoViableProtocol,

    #[error("Profile bitrate {bitrate} kbps leaves no room for video after {audio_bitrate} kbps of audio")]
    InsufficientBitrate { bitrate: u32, audio_bitrate: u32 },

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Invalid quality ladder: {0}")]
    InvalidLadder(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Media prober errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to spawn prober: {0}")]
    Spawn(String),

    #[error("Prober exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to parse prober output: {0}")]
    Parse(String),

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Prober returned no usable metadata")]
    EmptyResult,
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::AnalysisUnavailable(_) => "AnalysisUnavailable",
            PlannerError::ProfileNotFound(_) => "ProfileNotFound",
            PlannerError::NoViableProtocol => "NoViableProtocol",
            PlannerError::InsufficientBitrate { .. } => "InsufficientBitrate",
            PlannerError::SourceNotFound(_) => "SourceNotFound",
            PlannerError::InvalidLadder(_) => "InvalidLadder",
            PlannerError::Config(_) => "Config",
            PlannerError::Io(_) => "Io",
        }
    }
}
