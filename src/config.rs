//! Server configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::ladder::LadderConfig;

/// Media prober configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Path to the ffprobe binary
    pub ffprobe_path: String,

    /// Maximum time for one probe in seconds (0 disables the limit)
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProbeConfig {
    /// Probe timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Prober configuration
    pub probe: ProbeConfig,

    /// Quality tier table
    pub ladder: LadderConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Registered sources idle for longer than this are dropped
    pub source_idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            probe: ProbeConfig::default(),
            ladder: LadderConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            source_idle_timeout_secs: 600,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.probe.ffprobe_path.trim().is_empty() {
            return Err(PlannerError::Config("probe.ffprobe_path is empty".to_string()));
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(PlannerError::Config(format!(
                "unknown log format: {}",
                self.log_format
            )));
        }
        self.ladder.validate()
    }
}
