//! Quality tier table
//!
//! Static resolution buckets with their target bitrates. The table is
//! configuration data: the default below is version 1 and can be replaced
//! from the config file without touching the ladder logic.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// A resolution bucket with one or more target bitrates (kbps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTier {
    pub height: u32,
    pub width: u32,
    pub bitrates: Vec<u32>,
}

impl QualityTier {
    pub fn new(width: u32, height: u32, bitrates: &[u32]) -> Self {
        Self {
            height,
            width,
            bitrates: bitrates.to_vec(),
        }
    }
}

/// Built-in tier table, 160p to 4320p
pub fn default_tiers() -> Vec<QualityTier> {
    vec![
        QualityTier::new(285, 160, &[250]),
        QualityTier::new(430, 240, &[500]),
        QualityTier::new(625, 350, &[750]),
        QualityTier::new(855, 480, &[1250]),
        QualityTier::new(1024, 576, &[1750]),
        QualityTier::new(1280, 720, &[2000, 3000, 4000]),
        QualityTier::new(1920, 1080, &[8000, 10000, 12000, 20000]),
        QualityTier::new(2560, 1440, &[22000, 30000]),
        QualityTier::new(3840, 2160, &[50000, 60000, 70000, 80000]),
        QualityTier::new(7680, 4320, &[140000]),
    ]
}

/// Versioned ladder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Version of the tier table, bumped whenever the tiers are retuned
    pub version: u32,

    /// Quality tiers
    pub tiers: Vec<QualityTier>,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            tiers: default_tiers(),
        }
    }
}

impl LadderConfig {
    /// Reject tables the ladder builder cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(PlannerError::InvalidLadder(
                "tier table is empty".to_string(),
            ));
        }
        for tier in &self.tiers {
            if tier.width == 0 || tier.height == 0 {
                return Err(PlannerError::InvalidLadder(format!(
                    "tier {}x{} has a zero dimension",
                    tier.width, tier.height
                )));
            }
            if tier.bitrates.is_empty() {
                return Err(PlannerError::InvalidLadder(format!(
                    "tier {}x{} has no bitrates",
                    tier.width, tier.height
                )));
            }
        }
        Ok(())
    }
}
