//! Media delivery planner
//!
//! Decides how a media file should be delivered to a client: which
//! quality ladder to offer, which encoder settings each rung needs, and
//! whether the client can download the file as is or needs a DASH or HLS
//! stream with some tracks transcoded.

pub mod analysis;
pub mod compat;
pub mod config;
pub mod config_file;
pub mod decision;
pub mod encoder;
pub mod error;
pub mod http;
pub mod ladder;
pub mod media;
pub mod planner;
pub mod probe;
pub mod state;

#[cfg(test)]
mod integration;

pub use analysis::AnalysisCache;
pub use compat::{CompatibilityMap, DeliveryProtocol};
pub use config::ServerConfig;
pub use decision::{select_protocol, Decision};
pub use encoder::{derive_params, EncoderParams, ProfileSettings};
pub use error::{PlannerError, ProbeError, Result};
pub use ladder::{build_ladder, fit_resolution, LadderConfig, Profile};
pub use media::MediaMetadata;
pub use planner::MediaPlanner;
