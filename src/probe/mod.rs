//! Media probing module
//!
//! The planner never reads media files itself; it asks a [`MediaProber`]
//! for a metadata snapshot once per source.

pub mod ffprobe;

use std::path::Path;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::media::MediaMetadata;

pub use ffprobe::FfprobeProber;

/// Produces a metadata snapshot for a source file
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Probe `source` and return its metadata
    async fn probe(&self, source: &Path) -> Result<MediaMetadata, ProbeError>;
}
