//! Encoder parameter derivation
//!
//! Maps a ladder profile to concrete x264 and bitrate settings.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::ladder::Profile;

/// Segment length used by the segmented protocols, in seconds
pub const CHUNK_DURATION_SECS: u32 = 8;

/// Audio bitrate bounds in kbps
pub const MIN_AUDIO_BITRATE: u32 = 64;
pub const MAX_AUDIO_BITRATE: u32 = 2048;

const CRF_BY_QUALITY: [u8; 4] = [24, 22, 20, 18];
const DEFAULT_CRF: u8 = 23;

/// x264 speed preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum X264Preset {
    Slow,
    Medium,
    Fast,
    Veryfast,
}

impl X264Preset {
    const BY_QUALITY: [X264Preset; 4] = [
        X264Preset::Slow,
        X264Preset::Medium,
        X264Preset::Fast,
        X264Preset::Veryfast,
    ];

    pub fn for_quality(quality_index: Option<usize>) -> Self {
        quality_index
            .and_then(|i| Self::BY_QUALITY.get(i).copied())
            .unwrap_or(X264Preset::Fast)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            X264Preset::Slow => "slow",
            X264Preset::Medium => "medium",
            X264Preset::Fast => "fast",
            X264Preset::Veryfast => "veryfast",
        }
    }
}

/// Encoder settings derived from a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncoderParams {
    pub x264subme: u8,
    pub x264crf: u8,
    pub x264preset: X264Preset,
    /// kbps
    pub audio_bitrate: u32,
    /// kbps
    pub video_bitrate: u32,
    /// seconds
    pub chunk_duration: u32,
}

/// A profile merged with its encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(flatten)]
    pub params: EncoderParams,
}

impl ProfileSettings {
    pub fn new(profile: Profile) -> Result<Self> {
        let params = derive_params(&profile)?;
        Ok(Self { profile, params })
    }
}

/// 10% of the profile bitrate, clamped to [64, 2048] kbps
fn audio_bitrate_for(bitrate: u32) -> u32 {
    let share = bitrate as f64 * 0.1;
    share
        .clamp(MIN_AUDIO_BITRATE as f64, MAX_AUDIO_BITRATE as f64)
        .round() as u32
}

/// Derive encoder settings for a profile.
///
/// Fails with [`PlannerError::InsufficientBitrate`] when the profile bitrate
/// leaves no positive video bitrate once the audio share is taken.
pub fn derive_params(profile: &Profile) -> Result<EncoderParams> {
    let x264subme = if profile.height <= 480 { 2 } else { 0 };
    let x264crf = profile
        .quality_index
        .and_then(|i| CRF_BY_QUALITY.get(i).copied())
        .unwrap_or(DEFAULT_CRF);
    let x264preset = X264Preset::for_quality(profile.quality_index);

    let audio_bitrate = audio_bitrate_for(profile.bitrate);
    let video_bitrate =
        ((profile.bitrate as f64 - audio_bitrate as f64) * 0.98).round() as i64;
    if video_bitrate <= 0 {
        return Err(PlannerError::InsufficientBitrate {
            bitrate: profile.bitrate,
            audio_bitrate,
        });
    }

    Ok(EncoderParams {
        x264subme,
        x264crf,
        x264preset,
        audio_bitrate,
        video_bitrate: video_bitrate as u32,
        chunk_duration: CHUNK_DURATION_SECS,
    })
}
