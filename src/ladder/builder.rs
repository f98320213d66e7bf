//! Ladder builder - expands the tier table into profiles for one source

use serde::{Deserialize, Serialize};

use crate::media::{bps_to_kbps, Resolution};

use super::resolution::fit_resolution;
use super::tiers::QualityTier;

/// One entry of a source's bitrate ladder
///
/// `id` is the position in the sorted ladder and is only meaningful for the
/// source the ladder was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: usize,
    pub height: u32,
    pub width: u32,
    /// Target bitrate in kbps
    pub bitrate: u32,
    /// Position of the bitrate within its tier; `None` for the original entry
    pub quality_index: Option<usize>,
    pub resized: bool,
    pub original: bool,
}

/// Build the ordered profile ladder for a source
pub fn build_ladder(source: Resolution, bitrate_bps: u64, tiers: &[QualityTier]) -> Vec<Profile> {
    let mut profiles: Vec<Profile> = tiers
        .iter()
        .filter(|tier| Resolution::new(tier.width, tier.height).fits_within(&source))
        .flat_map(|tier| {
            let fit = fit_resolution(source.width, source.height, tier.width, tier.height);
            tier.bitrates
                .iter()
                .enumerate()
                .map(move |(quality_index, &bitrate)| Profile {
                    id: 0,
                    height: fit.height,
                    width: fit.width,
                    bitrate,
                    quality_index: Some(quality_index),
                    resized: fit.resized,
                    original: false,
                })
        })
        .collect();

    profiles.push(Profile {
        id: 0,
        height: source.height,
        width: source.width,
        bitrate: bps_to_kbps(bitrate_bps),
        quality_index: None,
        resized: false,
        original: true,
    });

    // Stable sort keeps input order for equal keys
    profiles.sort_by(|a, b| a.height.cmp(&b.height).then(a.bitrate.cmp(&b.bitrate)));

    for (id, profile) in profiles.iter_mut().enumerate() {
        profile.id = id;
    }

    tracing::debug!(
        "Built ladder with {} profiles for {}x{} @ {} bps",
        profiles.len(),
        source.width,
        source.height,
        bitrate_bps
    );

    profiles
}
