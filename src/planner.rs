//! Per-source planner
//!
//! Entry points for one source file. Every call first makes sure the
//! source has been analyzed, then runs the pure ladder, encoder and
//! protocol components on the cached snapshot.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisCache;
use crate::compat::{CompatibilityEvaluator, CompatibilityMap};
use crate::decision::{select_protocol, Decision};
use crate::encoder::ProfileSettings;
use crate::error::{PlannerError, Result};
use crate::ladder::{build_ladder, LadderConfig, Profile};
use crate::media::{MediaMetadata, MediaStream};

/// A track entry for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: usize,
    pub language: String,
    pub codec: String,
    pub codec_name: String,
}

impl TrackInfo {
    fn from_stream(id: usize, stream: &MediaStream) -> Self {
        Self {
            id,
            language: stream
                .language
                .clone()
                .unwrap_or_else(|| "und".to_string()),
            codec: stream
                .codec
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            codec_name: stream
                .codec_long_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Tracks of a source grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackListing {
    pub video: Vec<TrackInfo>,
    pub audio: Vec<TrackInfo>,
    /// Subtitles are not planned; always empty
    pub subtitle: Vec<TrackInfo>,
}

impl TrackListing {
    pub fn from_metadata(metadata: &MediaMetadata) -> Self {
        let list = |streams: Vec<&MediaStream>| {
            streams
                .into_iter()
                .enumerate()
                .map(|(id, s)| TrackInfo::from_stream(id, s))
                .collect()
        };
        Self {
            video: list(metadata.video_streams()),
            audio: list(metadata.audio_streams()),
            subtitle: Vec::new(),
        }
    }
}

/// Decision planner for a single source
pub struct MediaPlanner {
    analysis: AnalysisCache,
    ladder: Arc<LadderConfig>,
    evaluator: Arc<dyn CompatibilityEvaluator>,
}

impl MediaPlanner {
    pub fn new(
        analysis: AnalysisCache,
        ladder: Arc<LadderConfig>,
        evaluator: Arc<dyn CompatibilityEvaluator>,
    ) -> Self {
        Self {
            analysis,
            ladder,
            evaluator,
        }
    }

    pub fn source(&self) -> &Path {
        self.analysis.source()
    }

    pub fn analysis(&self) -> &AnalysisCache {
        &self.analysis
    }

    /// Raw metadata snapshot
    pub async fn metadata(&self) -> Result<Arc<MediaMetadata>> {
        self.analysis.ensure_analyzed().await
    }

    /// Video and audio tracks for display
    pub async fn tracks(&self) -> Result<TrackListing> {
        let metadata = self.analysis.ensure_analyzed().await?;
        Ok(TrackListing::from_metadata(&metadata))
    }

    /// Full profile ladder for this source
    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        let metadata = self.analysis.ensure_analyzed().await?;
        Ok(build_ladder(
            metadata.resolution,
            metadata.bitrate,
            &self.ladder.tiers,
        ))
    }

    /// One ladder entry with its encoder settings
    pub async fn profile(&self, id: usize) -> Result<ProfileSettings> {
        ProfileSettings::new(self.ladder_entry(id).await?)
    }

    async fn ladder_entry(&self, id: usize) -> Result<Profile> {
        self.profiles()
            .await?
            .into_iter()
            .nth(id)
            .ok_or(PlannerError::ProfileNotFound(id))
    }

    /// Delivery decision for the given ladder profile and streams
    pub async fn decide(
        &self,
        map: &CompatibilityMap,
        profile_id: usize,
        video_streams: &[usize],
        audio_streams: &[usize],
    ) -> Result<Decision> {
        let profile = self.ladder_entry(profile_id).await?;
        self.decide_with(map, &profile, video_streams, audio_streams)
            .await
    }

    /// Delivery decision for a caller-supplied profile
    pub async fn decide_with(
        &self,
        map: &CompatibilityMap,
        profile: &Profile,
        video_streams: &[usize],
        audio_streams: &[usize],
    ) -> Result<Decision> {
        let metadata = self.analysis.ensure_analyzed().await?;
        let decision = select_protocol(
            map,
            &metadata,
            profile,
            video_streams,
            audio_streams,
            self.evaluator.as_ref(),
        )?;
        tracing::info!(
            "Decision for {:?}: {} (profile {})",
            self.source(),
            decision.protocol,
            profile.id
        );
        Ok(decision)
    }
}

impl std::fmt::Debug for MediaPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPlanner")
            .field("analysis", &self.analysis)
            .field("ladder_version", &self.ladder.version)
            .finish()
    }
}
