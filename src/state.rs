//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Registered sources and their planners
//! - The shared prober, evaluator and ladder
//! - Server configuration

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::analysis::AnalysisCache;
use crate::compat::{CompatibilityEvaluator, RuleEvaluator};
use crate::config::ServerConfig;
use crate::ladder::LadderConfig;
use crate::planner::MediaPlanner;
use crate::probe::{FfprobeProber, MediaProber};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A registered source file
#[derive(Debug)]
pub struct SourceEntry {
    pub source_id: String,
    pub planner: MediaPlanner,
    pub registered_at: DateTime<Utc>,
    pub last_accessed: AtomicU64,
}

impl SourceEntry {
    pub fn source_path(&self) -> &Path {
        self.planner.source()
    }

    /// Update last accessed time to now
    pub fn touch(&self) {
        self.last_accessed.store(now_secs(), Ordering::Relaxed);
    }

    /// Get seconds since last access
    pub fn time_since_last_access(&self) -> u64 {
        now_secs().saturating_sub(self.last_accessed.load(Ordering::Relaxed))
    }
}

/// Application state shared across all handlers
pub struct AppState {
    /// Registered sources (source_id -> SourceEntry)
    pub sources: DashMap<String, Arc<SourceEntry>>,

    /// Path-to-source lookup for deduplication
    pub path_to_source: DashMap<PathBuf, String>,

    /// Prober shared by every source
    pub prober: Arc<dyn MediaProber>,

    /// Evaluator shared by every source
    pub evaluator: Arc<dyn CompatibilityEvaluator>,

    /// Quality tier table
    pub ladder: Arc<LadderConfig>,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState probing with ffprobe
    pub fn new(config: ServerConfig) -> Self {
        let prober = Arc::new(FfprobeProber::new(config.probe.ffprobe_path.clone()));
        Self::with_prober(config, prober)
    }

    /// Create a new AppState with a custom prober
    pub fn with_prober(config: ServerConfig, prober: Arc<dyn MediaProber>) -> Self {
        tracing::info!("Using {} prober", prober.name());
        Self {
            sources: DashMap::new(),
            path_to_source: DashMap::new(),
            prober,
            evaluator: Arc::new(RuleEvaluator::new()),
            ladder: Arc::new(config.ladder.clone()),
            config,
        }
    }

    /// Register a source file, returning the existing entry for a known path
    pub fn register_source(&self, path: impl Into<PathBuf>) -> Arc<SourceEntry> {
        let path = path.into();
        if let Some(existing) = self.get_source_by_path(&path) {
            existing.touch();
            return existing;
        }

        let source_id = Uuid::new_v4().to_string();
        let analysis = AnalysisCache::new(path.clone(), self.prober.clone())
            .with_timeout(self.config.probe.timeout());
        let planner = MediaPlanner::new(analysis, self.ladder.clone(), self.evaluator.clone());
        let entry = Arc::new(SourceEntry {
            source_id: source_id.clone(),
            planner,
            registered_at: Utc::now(),
            last_accessed: AtomicU64::new(now_secs()),
        });

        // Two concurrent registrations of one path keep the first
        let id = self
            .path_to_source
            .entry(path.clone())
            .or_insert_with(|| source_id.clone())
            .clone();
        if id != source_id {
            if let Some(existing) = self.get_source(&id) {
                return existing;
            }
            self.path_to_source.insert(path.clone(), source_id.clone());
        }

        self.sources.insert(source_id, entry.clone());
        tracing::info!("Registered source {} for {:?}", entry.source_id, path);
        entry
    }

    /// Get a source by ID
    pub fn get_source(&self, source_id: &str) -> Option<Arc<SourceEntry>> {
        self.sources.get(source_id).map(|r| r.clone())
    }

    /// Get a source by file path
    pub fn get_source_by_path(&self, path: &Path) -> Option<Arc<SourceEntry>> {
        self.path_to_source
            .get(path)
            .map(|r| r.clone())
            .and_then(|id| self.get_source(&id))
    }

    /// Remove a source
    pub fn remove_source(&self, source_id: &str) -> Option<Arc<SourceEntry>> {
        let (_, entry) = self.sources.remove(source_id)?;
        self.path_to_source
            .remove_if(entry.source_path(), |_, id| id == source_id);
        tracing::info!("Removed source {}", source_id);
        Some(entry)
    }

    /// Drop sources idle for longer than the configured timeout, returning how many
    pub fn cleanup_idle_sources(&self) -> usize {
        let timeout = self.config.source_idle_timeout_secs;
        let idle: Vec<String> = self
            .sources
            .iter()
            .filter(|r| r.value().time_since_last_access() > timeout)
            .map(|r| r.key().clone())
            .collect();

        for source_id in &idle {
            self.remove_source(source_id);
        }
        idle.len()
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::fixtures::{sample_1080p, StubProber};

    fn state() -> AppState {
        AppState::with_prober(
            ServerConfig::default(),
            Arc::new(StubProber::returning(sample_1080p())),
        )
    }

    #[test]
    fn test_register_and_get() {
        let state = state();
        let entry = state.register_source("/media/movie.mkv");

        let found = state.get_source(&entry.source_id).unwrap();
        assert!(Arc::ptr_eq(&entry, &found));
        assert_eq!(found.source_path(), Path::new("/media/movie.mkv"));
        assert_eq!(state.source_count(), 1);
    }

    #[test]
    fn test_register_same_path_reuses_entry() {
        let state = state();
        let first = state.register_source("/media/movie.mkv");
        let second = state.register_source("/media/movie.mkv");

        assert_eq!(first.source_id, second.source_id);
        assert_eq!(state.source_count(), 1);
    }

    #[test]
    fn test_remove_source() {
        let state = state();
        let entry = state.register_source("/media/movie.mkv");

        assert!(state.remove_source(&entry.source_id).is_some());
        assert!(state.get_source(&entry.source_id).is_none());
        assert!(state
            .get_source_by_path(Path::new("/media/movie.mkv"))
            .is_none());
        assert!(state.remove_source(&entry.source_id).is_none());
    }

    #[test]
    fn test_cleanup_idle_sources() {
        let state = state();
        let stale = state.register_source("/media/old.mkv");
        let fresh = state.register_source("/media/new.mkv");
        stale.last_accessed.store(0, Ordering::Relaxed);

        assert_eq!(state.cleanup_idle_sources(), 1);
        assert!(state.get_source(&stale.source_id).is_none());
        assert!(state.get_source(&fresh.source_id).is_some());
    }

    #[tokio::test]
    async fn test_sources_share_the_prober() {
        let prober = Arc::new(StubProber::returning(sample_1080p()));
        let state = AppState::with_prober(ServerConfig::default(), prober.clone());

        let a = state.register_source("/media/a.mkv");
        let b = state.register_source("/media/b.mkv");
        a.planner.tracks().await.unwrap();
        b.planner.tracks().await.unwrap();
        a.planner.profiles().await.unwrap();

        assert_eq!(prober.calls(), 2);
    }
}
