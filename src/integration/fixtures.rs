//! Test fixtures
//!
//! Canned metadata and a scripted prober so the planner can be exercised
//! without media files or an ffprobe binary.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::encoder::ProfileSettings;
use crate::error::ProbeError;
use crate::ladder::{build_ladder, default_tiers, Profile};
use crate::media::{MediaMetadata, MediaStream, Resolution, StreamKind};
use crate::probe::MediaProber;

/// Prober returning canned metadata and counting invocations
#[derive(Debug)]
pub struct StubProber {
    metadata: Option<MediaMetadata>,
    fail_first: usize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubProber {
    /// Always succeeds with `metadata`
    pub fn returning(metadata: MediaMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            fail_first: 0,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails
    pub fn failing() -> Self {
        Self {
            metadata: None,
            fail_first: 0,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails the first `failures` calls, then returns `metadata`
    pub fn failing_then(failures: usize, metadata: MediaMetadata) -> Self {
        Self {
            fail_first: failures,
            ..Self::returning(metadata)
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of probes started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for StubProber {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn probe(&self, source: &Path) -> Result<MediaMetadata, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.metadata {
            Some(metadata) if call >= self.fail_first => Ok(metadata.clone()),
            _ => Err(ProbeError::Spawn(format!(
                "stub failure for {}",
                source.display()
            ))),
        }
    }
}

fn stream(index: usize, kind: StreamKind, codec: &str) -> MediaStream {
    MediaStream {
        index,
        kind,
        codec: Some(codec.to_string()),
        codec_long_name: None,
        language: None,
        width: None,
        height: None,
        bitrate: None,
        channels: None,
        sample_rate: None,
        start_time: 0.0,
    }
}

/// 1080p Matroska movie: H.264 video, AC-3 (eng) and AAC audio, SubRip subtitles
pub fn sample_1080p() -> MediaMetadata {
    let video = MediaStream {
        codec_long_name: Some("H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".to_string()),
        width: Some(1920),
        height: Some(1080),
        bitrate: Some(7_500_000),
        ..stream(0, StreamKind::Video, "h264")
    };
    let ac3 = MediaStream {
        codec_long_name: Some("ATSC A/52A (AC-3)".to_string()),
        language: Some("eng".to_string()),
        bitrate: Some(448_000),
        channels: Some(6),
        sample_rate: Some(48_000),
        start_time: 0.021,
        ..stream(1, StreamKind::Audio, "ac3")
    };
    let aac = MediaStream {
        bitrate: Some(128_000),
        channels: Some(2),
        sample_rate: Some(48_000),
        ..stream(2, StreamKind::Audio, "aac")
    };
    let subtitle = stream(3, StreamKind::Other, "subrip");

    MediaMetadata {
        container: "matroska,webm".to_string(),
        streams: vec![video, ac3, aac, subtitle],
        duration: 5400.25,
        bitrate: 8_000_000,
        resolution: Resolution::new(1920, 1080),
    }
}

/// Audio-only MP4 with a single AAC track at `bitrate` bps
pub fn sample_audio_only(bitrate: u64) -> MediaMetadata {
    let aac = MediaStream {
        bitrate: Some(bitrate),
        channels: Some(1),
        sample_rate: Some(22_050),
        ..stream(0, StreamKind::Audio, "aac")
    };
    MediaMetadata {
        container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        streams: vec![aac],
        duration: 180.0,
        bitrate,
        resolution: Resolution::default(),
    }
}

/// Settings for the first ladder entry of `metadata` matching `pred`
pub fn profile_settings(
    metadata: &MediaMetadata,
    pred: impl Fn(&Profile) -> bool,
) -> ProfileSettings {
    let profile = build_ladder(metadata.resolution, metadata.bitrate, &default_tiers())
        .into_iter()
        .find(|p| pred(p))
        .expect("no ladder entry matches");
    ProfileSettings::new(profile).expect("profile has usable bitrate")
}
