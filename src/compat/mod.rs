//! Client compatibility module
//!
//! This module describes what a client can play and evaluates a source
//! against it:
//! - Delivery protocols and the compatibility map sent by the client
//! - Rule sets per protocol (containers, codecs, limits)
//! - Direct play and per-stream pass-through/transcode evaluation

pub mod evaluator;
pub mod rules;

use serde::{Deserialize, Serialize};

pub use evaluator::{
    CompatibilityEvaluator, DirectPlayVerdict, IncompatibilityReason, RuleEvaluator, StreamPlan,
    TranscodeTarget,
};
pub use rules::CompatibilityRules;

/// Delivery protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryProtocol {
    Download,
    Dash,
    Hls,
}

impl DeliveryProtocol {
    /// Selection priority, highest first
    pub const PRIORITY: [DeliveryProtocol; 3] = [
        DeliveryProtocol::Download,
        DeliveryProtocol::Dash,
        DeliveryProtocol::Hls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryProtocol::Download => "DOWNLOAD",
            DeliveryProtocol::Dash => "DASH",
            DeliveryProtocol::Hls => "HLS",
        }
    }
}

impl std::fmt::Display for DeliveryProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules a client supports for one protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    #[serde(rename = "type")]
    pub protocol: DeliveryProtocol,
    #[serde(default)]
    pub rules: CompatibilityRules,
}

impl CompatibilityEntry {
    pub fn new(protocol: DeliveryProtocol, rules: CompatibilityRules) -> Self {
        Self { protocol, rules }
    }
}

/// Client compatibility map; at most one entry per protocol is expected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityMap {
    entries: Vec<CompatibilityEntry>,
}

impl CompatibilityMap {
    pub fn new(entries: Vec<CompatibilityEntry>) -> Self {
        Self { entries }
    }

    /// Entry for a protocol; with duplicates the first one wins
    pub fn entry(&self, protocol: DeliveryProtocol) -> Option<&CompatibilityEntry> {
        let mut matching = self.entries.iter().filter(|e| e.protocol == protocol);
        let first = matching.next();
        if first.is_some() && matching.next().is_some() {
            tracing::warn!(
                "Compatibility map has duplicate {} entries, using the first",
                protocol
            );
        }
        first
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
