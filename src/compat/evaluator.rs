//! Compatibility evaluation - direct play check and per-stream plans

use serde::{Deserialize, Serialize};

use crate::encoder::ProfileSettings;
use crate::media::{bps_to_kbps, MediaMetadata, MediaStream, StreamKind};

use super::rules::CompatibilityRules;

/// Why a source cannot be delivered unmodified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncompatibilityReason {
    ContainerNotSupported,
    VideoCodecNotSupported,
    AudioCodecNotSupported,
    ResolutionTooHigh,
    BitrateTooHigh,
}

/// Result of the direct play check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectPlayVerdict {
    pub playable: bool,
    pub reasons: Vec<IncompatibilityReason>,
}

impl DirectPlayVerdict {
    fn from_reasons(reasons: Vec<IncompatibilityReason>) -> Self {
        Self {
            playable: reasons.is_empty(),
            reasons,
        }
    }
}

/// Encoder target for a transcoded stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeTarget {
    pub codec: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// kbps
    pub bitrate: u32,
}

/// Delivery plan for one requested stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamPlan {
    pub kind: StreamKind,
    /// Requested id (position among streams of the same kind)
    pub id: usize,
    /// Stream index in the source container
    pub source_index: usize,
    pub codec: Option<String>,
    /// Whether the stream must be transcoded instead of passed through
    pub transcode: bool,
    /// Offset in seconds applied to keep audio aligned with the first video stream
    pub start_delay: f64,
    pub target: Option<TranscodeTarget>,
}

/// Evaluates a source against a client's rules for one protocol
pub trait CompatibilityEvaluator: Send + Sync {
    /// Can the source be delivered unmodified under `rules`
    fn can_direct_play(&self, metadata: &MediaMetadata, rules: &CompatibilityRules)
        -> DirectPlayVerdict;

    /// Plans for the requested video streams, in request order
    fn plan_video_streams(
        &self,
        metadata: &MediaMetadata,
        requested: &[usize],
        profile: &ProfileSettings,
        rules: &CompatibilityRules,
    ) -> Vec<StreamPlan>;

    /// Plans for the requested audio streams, aligned to `start_delay`
    fn plan_audio_streams(
        &self,
        metadata: &MediaMetadata,
        requested: &[usize],
        profile: &ProfileSettings,
        rules: &CompatibilityRules,
        start_delay: f64,
    ) -> Vec<StreamPlan>;
}

/// Rule-based evaluator driven by [`CompatibilityRules`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Whether a video stream can be passed through for the profile
    fn video_fits(stream: &MediaStream, profile: &ProfileSettings, rules: &CompatibilityRules) -> bool {
        if !rules.accepts_video(stream) {
            return false;
        }
        if let Some(res) = stream.resolution() {
            if res.width > profile.profile.width || res.height > profile.profile.height {
                return false;
            }
            if !rules.accepts_resolution(res.width, res.height) {
                return false;
            }
        }
        match stream.bitrate {
            Some(bps) => bps_to_kbps(bps) <= profile.profile.bitrate,
            None => true,
        }
    }
}

/// Resolve requested ids against streams of one kind, skipping unknown ids
fn resolve<'a>(
    streams: &[&'a MediaStream],
    requested: &[usize],
    kind: StreamKind,
) -> Vec<(usize, &'a MediaStream)> {
    requested
        .iter()
        .filter_map(|&id| match streams.get(id) {
            Some(stream) => Some((id, *stream)),
            None => {
                tracing::warn!("Requested {:?} stream {} does not exist, skipping", kind, id);
                None
            }
        })
        .collect()
}

impl CompatibilityEvaluator for RuleEvaluator {
    fn can_direct_play(
        &self,
        metadata: &MediaMetadata,
        rules: &CompatibilityRules,
    ) -> DirectPlayVerdict {
        let mut reasons = Vec::new();

        if !rules.accepts_container(metadata.container_names()) {
            reasons.push(IncompatibilityReason::ContainerNotSupported);
        }
        if !metadata.video_streams().iter().all(|s| rules.accepts_video(s)) {
            reasons.push(IncompatibilityReason::VideoCodecNotSupported);
        }
        if !metadata.audio_streams().iter().all(|s| rules.accepts_audio(s)) {
            reasons.push(IncompatibilityReason::AudioCodecNotSupported);
        }
        if !rules.accepts_resolution(metadata.resolution.width, metadata.resolution.height) {
            reasons.push(IncompatibilityReason::ResolutionTooHigh);
        }
        if !rules.accepts_bitrate(bps_to_kbps(metadata.bitrate)) {
            reasons.push(IncompatibilityReason::BitrateTooHigh);
        }

        tracing::debug!("Direct play reasons: {:?}", reasons);
        DirectPlayVerdict::from_reasons(reasons)
    }

    fn plan_video_streams(
        &self,
        metadata: &MediaMetadata,
        requested: &[usize],
        profile: &ProfileSettings,
        rules: &CompatibilityRules,
    ) -> Vec<StreamPlan> {
        let streams = metadata.video_streams();
        resolve(&streams, requested, StreamKind::Video)
            .into_iter()
            .map(|(id, stream)| {
                let transcode = !Self::video_fits(stream, profile, rules);
                StreamPlan {
                    kind: StreamKind::Video,
                    id,
                    source_index: stream.index,
                    codec: stream.codec.clone(),
                    transcode,
                    start_delay: stream.start_time,
                    target: transcode.then(|| TranscodeTarget {
                        codec: rules.video_transcode_codec.clone(),
                        width: Some(profile.profile.width),
                        height: Some(profile.profile.height),
                        bitrate: profile.params.video_bitrate,
                    }),
                }
            })
            .collect()
    }

    fn plan_audio_streams(
        &self,
        metadata: &MediaMetadata,
        requested: &[usize],
        profile: &ProfileSettings,
        rules: &CompatibilityRules,
        start_delay: f64,
    ) -> Vec<StreamPlan> {
        let streams = metadata.audio_streams();
        resolve(&streams, requested, StreamKind::Audio)
            .into_iter()
            .map(|(id, stream)| {
                let transcode = !rules.accepts_audio(stream);
                StreamPlan {
                    kind: StreamKind::Audio,
                    id,
                    source_index: stream.index,
                    codec: stream.codec.clone(),
                    transcode,
                    start_delay: start_delay - stream.start_time,
                    target: transcode.then(|| TranscodeTarget {
                        codec: rules.audio_transcode_codec.clone(),
                        width: None,
                        height: None,
                        bitrate: profile.params.audio_bitrate,
                    }),
                }
            })
            .collect()
    }
}
