//! Bitrate ladder module
//!
//! This module builds the set of quality profiles offered for a source:
//! - Resolution fitting under even-dimension and aspect-ratio constraints
//! - Static quality tier table (versioned configuration)
//! - Ladder generation and ordering

pub mod builder;
pub mod resolution;
pub mod tiers;

pub use builder::{build_ladder, Profile};
pub use resolution::{fit_resolution, FittedResolution};
pub use tiers::{default_tiers, LadderConfig, QualityTier};
