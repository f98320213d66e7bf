//! Resolution fitting
//!
//! Fits a source resolution inside a bounding box, keeping the aspect ratio
//! and producing even dimensions (required by the video encoder).

use serde::{Deserialize, Serialize};

use crate::media::Resolution;

/// Output of [`fit_resolution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedResolution {
    pub width: u32,
    pub height: u32,
    pub resized: bool,
}

/// Largest even value not above `v`
fn even_down(v: i64) -> i64 {
    v - (v % 2 != 0) as i64
}

/// Smallest even value not below `v`
fn even_up(v: i64) -> i64 {
    v + (v % 2 != 0) as i64
}

/// Fit `source_width x source_height` inside `max_width x max_height`.
///
/// Two candidates are tried, one bound by the width and one bound by the
/// height. Note the asymmetry: the width-bound candidate rounds its height
/// down to even while the height-bound candidate rounds its height up.
/// When neither candidate fits, the source dimensions are returned
/// unchanged with `resized = false`.
pub fn fit_resolution(
    source_width: u32,
    source_height: u32,
    max_width: u32,
    max_height: u32,
) -> FittedResolution {
    if Resolution::new(source_width, source_height)
        .fits_within(&Resolution::new(max_width, max_height))
    {
        return FittedResolution {
            width: source_width,
            height: source_height,
            resized: false,
        };
    }

    let ratio = source_width as f64 / source_height as f64;
    let max_w = max_width as f64;
    let max_h = max_height as f64;

    // Float to int casts saturate, so a degenerate ratio just fails the bounds check.
    let candidates = [
        (
            even_down(max_w.ceil() as i64),
            even_down((max_w / ratio).ceil() as i64),
        ),
        (
            even_down((max_h * ratio).ceil() as i64),
            even_up(max_h.ceil() as i64),
        ),
    ];

    for (width, height) in candidates {
        if width > 0 && height > 0 && width <= max_width as i64 && height <= max_height as i64 {
            return FittedResolution {
                width: width as u32,
                height: height as u32,
                resized: true,
            };
        }
    }

    tracing::debug!(
        "No even fit for {}x{} inside {}x{}, keeping source resolution",
        source_width,
        source_height,
        max_width,
        max_height
    );
    FittedResolution {
        width: source_width,
        height: source_height,
        resized: false,
    }
}
