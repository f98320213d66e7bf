//! Compatibility rule set consumed by [`super::RuleEvaluator`]

use serde::{Deserialize, Serialize};

use crate::media::MediaStream;

/// What a client accepts under one protocol.
///
/// Empty codec/container lists accept anything; `None` limits are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompatibilityRules {
    /// Container format names (e.g. "mp4", "matroska")
    pub containers: Vec<String>,
    /// Video codec ids (e.g. "h264", "hevc")
    pub video_codecs: Vec<String>,
    /// Audio codec ids (e.g. "aac", "ac3")
    pub audio_codecs: Vec<String>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Maximum global bitrate in kbps
    pub max_bitrate: Option<u32>,
    /// Codec used when video has to be transcoded
    pub video_transcode_codec: String,
    /// Codec used when audio has to be transcoded
    pub audio_transcode_codec: String,
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
            video_codecs: Vec::new(),
            audio_codecs: Vec::new(),
            max_width: None,
            max_height: None,
            max_bitrate: None,
            video_transcode_codec: "h264".to_string(),
            audio_transcode_codec: "aac".to_string(),
        }
    }
}

fn accepts(list: &[String], value: Option<&str>) -> bool {
    if list.is_empty() {
        return true;
    }
    match value {
        Some(v) => list.iter().any(|item| item.eq_ignore_ascii_case(v)),
        None => false,
    }
}

impl CompatibilityRules {
    pub fn accepts_container<'a>(&self, mut names: impl Iterator<Item = &'a str>) -> bool {
        self.containers.is_empty() || names.any(|n| accepts(&self.containers, Some(n)))
    }

    pub fn accepts_video(&self, stream: &MediaStream) -> bool {
        accepts(&self.video_codecs, stream.codec.as_deref())
    }

    pub fn accepts_audio(&self, stream: &MediaStream) -> bool {
        accepts(&self.audio_codecs, stream.codec.as_deref())
    }

    pub fn accepts_resolution(&self, width: u32, height: u32) -> bool {
        self.max_width.map_or(true, |max| width <= max)
            && self.max_height.map_or(true, |max| height <= max)
    }

    /// `bitrate_kbps` against `max_bitrate`
    pub fn accepts_bitrate(&self, bitrate_kbps: u32) -> bool {
        self.max_bitrate.map_or(true, |max| bitrate_kbps <= max)
    }
}
