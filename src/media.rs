//! Media metadata snapshot
//!
//! Immutable description of a source file as reported by the media prober.
//! Produced once per source by the analysis cache and shared read-only.

use serde::{Deserialize, Serialize};

/// Convert bits per second to kbps (1 kbps = 1024 bps), rounded to nearest
pub fn bps_to_kbps(bitrate: u64) -> u32 {
    (bitrate as f64 / 1024.0).round() as u32
}

/// Stream type within a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

/// Width x height in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions fit inside `other`
    pub fn fits_within(&self, other: &Resolution) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

/// A single elementary stream inside the source container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStream {
    /// Stream index in the source container
    pub index: usize,
    pub kind: StreamKind,
    /// Short codec id (e.g. "h264", "aac")
    pub codec: Option<String>,
    /// Human readable codec name
    pub codec_long_name: Option<String>,
    /// Language tag (e.g. "eng")
    pub language: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Bitrate in bits per second, when known
    pub bitrate: Option<u64>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
    /// Presentation start time in seconds
    pub start_time: f64,
}

impl MediaStream {
    pub fn resolution(&self) -> Option<Resolution> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Resolution::new(w, h)),
            _ => None,
        }
    }
}

/// Metadata for a whole source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Container format names (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    pub container: String,
    pub streams: Vec<MediaStream>,
    /// Duration in seconds
    pub duration: f64,
    /// Global bitrate in bits per second
    pub bitrate: u64,
    /// Resolution of the primary video stream
    pub resolution: Resolution,
}

impl MediaMetadata {
    /// Video streams in container order; position is the stream's id
    pub fn video_streams(&self) -> Vec<&MediaStream> {
        self.streams_of(StreamKind::Video)
    }

    /// Audio streams in container order; position is the stream's id
    pub fn audio_streams(&self) -> Vec<&MediaStream> {
        self.streams_of(StreamKind::Audio)
    }

    fn streams_of(&self, kind: StreamKind) -> Vec<&MediaStream> {
        self.streams.iter().filter(|s| s.kind == kind).collect()
    }

    /// A snapshot without any stream carries nothing usable
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Container names as a list
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.container
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_streams_by_kind() {
        let meta = MediaMetadata {
            container: "matroska,webm".to_string(),
            streams: vec![
                stream(0, StreamKind::Video, "h264"),
                stream(1, StreamKind::Audio, "aac"),
                stream(2, StreamKind::Other, "subrip"),
                stream(3, StreamKind::Audio, "ac3"),
            ],
            duration: 10.0,
            bitrate: 1_000_000,
            resolution: Resolution::new(1920, 1080),
        };

        assert_eq!(meta.video_streams().len(), 1);
        let audio = meta.audio_streams();
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[1].index, 3);
        assert!(!meta.is_empty());
        assert_eq!(
            meta.container_names().collect::<Vec<_>>(),
            vec!["matroska", "webm"]
        );
    }

    #[test]
    fn test_bps_to_kbps() {
        assert_eq!(bps_to_kbps(8_000_000), 7813);
        assert_eq!(bps_to_kbps(1024), 1);
        assert_eq!(bps_to_kbps(511), 0);
        assert_eq!(bps_to_kbps(512), 1);
    }

    #[test]
    fn test_resolution_fits_within() {
        let r = Resolution::new(1280, 720);
        assert!(r.fits_within(&Resolution::new(1920, 1080)));
        assert!(r.fits_within(&Resolution::new(1280, 720)));
        assert!(!r.fits_within(&Resolution::new(1920, 700)));
    }
}
