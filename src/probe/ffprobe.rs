//! FFprobe-backed [`MediaProber`]
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and maps the JSON output into [`MediaMetadata`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::ProbeError;
use crate::media::{MediaMetadata, MediaStream, StreamKind};

use super::MediaProber;

/// A prober backed by the `ffprobe` CLI
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe_path
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, source: &Path) -> Result<MediaMetadata, ProbeError> {
        tracing::debug!("Running {:?} on {:?}", self.ffprobe_path, source);

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(source)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::Spawn(format!("{:?}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_ffprobe_json(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    bit_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    start_time: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

fn parse_num<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}

/// Map raw ffprobe JSON into a metadata snapshot
pub fn parse_ffprobe_json(json: &[u8]) -> Result<MediaMetadata, ProbeError> {
    let raw: FfprobeOutput =
        serde_json::from_slice(json).map_err(|e| ProbeError::Parse(e.to_string()))?;
    let format = raw.format.unwrap_or_default();

    let streams: Vec<MediaStream> = raw
        .streams
        .into_iter()
        .map(|s| {
            let kind = match s.codec_type.as_deref() {
                Some("video") => StreamKind::Video,
                Some("audio") => StreamKind::Audio,
                _ => StreamKind::Other,
            };
            MediaStream {
                index: s.index,
                kind,
                codec: s.codec_name,
                codec_long_name: s.codec_long_name,
                language: s.tags.language,
                width: s.width,
                height: s.height,
                bitrate: parse_num(s.bit_rate.as_deref()),
                channels: s.channels,
                sample_rate: parse_num(s.sample_rate.as_deref()),
                start_time: parse_num(s.start_time.as_deref()).unwrap_or(0.0),
            }
        })
        .collect();

    let resolution = streams
        .iter()
        .find(|s| s.kind == StreamKind::Video)
        .and_then(MediaStream::resolution)
        .unwrap_or_default();

    let bitrate: u64 = parse_num(format.bit_rate.as_deref())
        .unwrap_or_else(|| streams.iter().filter_map(|s| s.bitrate).sum());

    let metadata = MediaMetadata {
        container: format.format_name.unwrap_or_default(),
        streams,
        duration: parse_num(format.duration.as_deref()).unwrap_or(0.0),
        bitrate,
        resolution,
    };

    if metadata.is_empty() {
        return Err(ProbeError::EmptyResult);
    }

    Ok(metadata)
}
