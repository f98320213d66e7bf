//! Analysis cache
//!
//! Memoizes the one-time metadata probe for a source. Concurrent callers
//! share a single in-flight probe; a failed or empty probe leaves the cache
//! unpopulated so a later call probes again.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::error::{ProbeError, Result};
use crate::media::MediaMetadata;
use crate::probe::MediaProber;

/// Analyzed snapshot with the time it was produced
#[derive(Debug)]
pub struct Analysis {
    pub metadata: Arc<MediaMetadata>,
    pub analyzed_at: DateTime<Utc>,
}

/// Per-source memoized probe
pub struct AnalysisCache {
    source: PathBuf,
    prober: Arc<dyn MediaProber>,
    timeout: Option<Duration>,
    cell: OnceCell<Analysis>,
}

impl AnalysisCache {
    pub fn new(source: impl Into<PathBuf>, prober: Arc<dyn MediaProber>) -> Self {
        Self {
            source: source.into(),
            prober,
            timeout: None,
            cell: OnceCell::new(),
        }
    }

    /// Bound each probe attempt; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Return the metadata, probing the source on first use
    pub async fn ensure_analyzed(&self) -> Result<Arc<MediaMetadata>> {
        let analysis = self.cell.get_or_try_init(|| self.run_probe()).await?;
        Ok(analysis.metadata.clone())
    }

    /// Metadata if a probe already succeeded
    pub fn cached(&self) -> Option<Arc<MediaMetadata>> {
        self.cell.get().map(|a| a.metadata.clone())
    }

    /// When the cached snapshot was produced
    pub fn analyzed_at(&self) -> Option<DateTime<Utc>> {
        self.cell.get().map(|a| a.analyzed_at)
    }

    async fn run_probe(&self) -> std::result::Result<Analysis, ProbeError> {
        tracing::info!(
            "Probing {:?} with {}",
            self.source,
            self.prober.name()
        );

        let probe = self.prober.probe(&self.source);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, probe).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(limit)),
            },
            None => probe.await,
        };

        let metadata = match result {
            Ok(metadata) if metadata.is_empty() => Err(ProbeError::EmptyResult),
            other => other,
        }
        .map_err(|e| {
            tracing::warn!("Probe of {:?} failed: {}", self.source, e);
            e
        })?;

        tracing::debug!(
            "Probed {:?}: {} streams, {}x{}, {:.1}s",
            self.source,
            metadata.streams.len(),
            metadata.resolution.width,
            metadata.resolution.height,
            metadata.duration
        );

        Ok(Analysis {
            metadata: Arc::new(metadata),
            analyzed_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("source", &self.source)
            .field("prober", &self.prober.name())
            .field("timeout", &self.timeout)
            .field("analyzed", &self.cell.initialized())
            .finish()
    }
}
