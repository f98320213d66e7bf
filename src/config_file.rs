//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{ProbeConfig, ServerConfig};
use crate::error::{PlannerError, Result};
use crate::ladder::{LadderConfig, QualityTier};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Prober settings
    pub probe: Option<ProbeSettings>,
    /// Quality ladder settings
    pub ladder: Option<LadderSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
    /// Idle timeout for registered sources in seconds
    pub source_idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Path to the ffprobe binary
    pub ffprobe_path: Option<String>,
    /// Probe timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderSettings {
    /// Tier table version
    pub version: u32,
    /// Quality tiers
    pub tiers: Vec<QualityTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| PlannerError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let ladder = LadderConfig::default();
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_enabled: Some(true),
                source_idle_timeout_secs: Some(600),
            },
            probe: Some(ProbeSettings {
                ffprobe_path: Some("ffprobe".to_string()),
                timeout_secs: Some(30),
            }),
            ladder: Some(LadderSettings {
                version: ladder.version,
                tiers: ladder.tiers,
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let probe_defaults = ProbeConfig::default();

        let probe = match self.probe {
            Some(p) => ProbeConfig {
                ffprobe_path: p.ffprobe_path.unwrap_or(probe_defaults.ffprobe_path),
                timeout_secs: p.timeout_secs.unwrap_or(probe_defaults.timeout_secs),
            },
            None => probe_defaults,
        };

        let ladder = self
            .ladder
            .map(|l| LadderConfig {
                version: l.version,
                tiers: l.tiers,
            })
            .unwrap_or_default();

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            probe,
            ladder,
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level,
            log_format,
            source_idle_timeout_secs: self
                .server
                .source_idle_timeout_secs
                .unwrap_or(defaults.source_idle_timeout_secs),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigFile::default_config().to_file(path)
}
