//! Protocol selection
//!
//! Chooses how a source is delivered. Protocols are tried in a fixed
//! priority order regardless of the order of the client's map:
//! DOWNLOAD (only when direct play succeeds), then DASH, then HLS.

use serde::{Deserialize, Serialize};

use crate::compat::{CompatibilityEvaluator, CompatibilityMap, DeliveryProtocol, StreamPlan};
use crate::encoder::ProfileSettings;
use crate::ladder::Profile;
use crate::error::{PlannerError, Result};
use crate::media::MediaMetadata;

/// Delivery plan for a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub protocol: DeliveryProtocol,
    /// Source duration in seconds
    pub duration: f64,
    /// Segment length in seconds, 0 for whole-file delivery
    pub chunk_duration: u32,
    pub start_chunk_at: u32,
    /// Video plans followed by audio plans
    pub streams: Vec<StreamPlan>,
}

/// Select a delivery protocol for the source.
///
/// Encoder settings for `profile` are only derived once a segmented protocol
/// is chosen, so direct play never fails on them.
///
/// Returns [`PlannerError::NoViableProtocol`] when no entry of the map can be
/// used.
pub fn select_protocol(
    map: &CompatibilityMap,
    metadata: &MediaMetadata,
    profile: &Profile,
    video_streams: &[usize],
    audio_streams: &[usize],
    evaluator: &dyn CompatibilityEvaluator,
) -> Result<Decision> {
    if let Some(entry) = map.entry(DeliveryProtocol::Download) {
        let verdict = evaluator.can_direct_play(metadata, &entry.rules);
        if verdict.playable {
            tracing::debug!("Direct play accepted, delivering whole file");
            return Ok(Decision {
                protocol: DeliveryProtocol::Download,
                duration: metadata.duration,
                chunk_duration: 0,
                start_chunk_at: 0,
                streams: Vec::new(),
            });
        }
        tracing::debug!("Direct play rejected: {:?}", verdict.reasons);
    }

    for &protocol in &DeliveryProtocol::PRIORITY[1..] {
        let Some(entry) = map.entry(protocol) else {
            continue;
        };

        let desired = ProfileSettings::new(profile.clone())?;
        let video = evaluator.plan_video_streams(metadata, video_streams, &desired, &entry.rules);
        let offset = video.first().map(|plan| plan.start_delay).unwrap_or(0.0);
        let audio =
            evaluator.plan_audio_streams(metadata, audio_streams, &desired, &entry.rules, offset);

        tracing::debug!(
            "Selected {} with {} video and {} audio plans (offset {:.3}s)",
            protocol,
            video.len(),
            audio.len(),
            offset
        );

        let mut streams = video;
        streams.extend(audio);

        return Ok(Decision {
            protocol,
            duration: metadata.duration,
            chunk_duration: desired.params.chunk_duration,
            start_chunk_at: 0,
            streams,
        });
    }

    if map.is_empty() {
        tracing::warn!("Empty compatibility map, no delivery protocol possible");
    } else {
        tracing::warn!("No usable delivery protocol in a map of {} entries", map.len());
    }
    Err(PlannerError::NoViableProtocol)
}
