//! Configuration loading and validation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Default number of blacklist entries accepted before truncation.
pub const DEFAULT_MAX_ENTRIES: usize = 128;

/// Main configuration for the tollgate packet filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Network interface to capture on. If None, auto-detect.
    pub interface: Option<String>,

    /// Interface accepted traffic is re-emitted on.
    /// If None, the capture interface is used.
    pub egress_interface: Option<String>,

    /// Path to the blacklist file, one dotted-decimal IPv4 address per line.
    #[serde(default = "default_blacklist_path")]
    pub blacklist_path: PathBuf,

    /// Maximum number of blacklist entries loaded; further lines are ignored.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Prometheus metrics exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics exporter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable the Prometheus scrape endpoint.
    #[serde(default)]
    pub enabled: bool,

    /// Address the scrape endpoint listens on.
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_metrics_listen(),
        }
    }
}

fn default_blacklist_path() -> PathBuf {
    PathBuf::from("/etc/tollgate/blacklist.conf")
}

const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_metrics_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9100))
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(ConfigError::Validation("max_entries must be > 0".into()).into());
        }

        if self.blacklist_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("blacklist_path must not be empty".into()).into());
        }

        if let Some(name) = &self.interface
            && name.is_empty()
        {
            return Err(ConfigError::Validation("interface must not be empty".into()).into());
        }

        if let Some(name) = &self.egress_interface
            && name.is_empty()
        {
            return Err(
                ConfigError::Validation("egress_interface must not be empty".into()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
            interface = "eth0"
            blacklist_path = "/etc/tollgate/blacklist.conf"
            max_entries = 64
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.interface.as_deref(), Some("eth0"));
        assert_eq!(
            config.blacklist_path,
            PathBuf::from("/etc/tollgate/blacklist.conf")
        );
        assert_eq!(config.max_entries, 64);
        assert!(config.egress_interface.is_none());
    }

    #[test]
    fn test_default_values() {
        let config = Config::parse("").unwrap();
        assert!(config.interface.is_none());
        assert!(config.egress_interface.is_none());
        assert_eq!(
            config.blacklist_path,
            PathBuf::from("/etc/tollgate/blacklist.conf")
        );
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_metrics_config() {
        let toml = r#"
            [metrics]
            enabled = true
            listen = "0.0.0.0:9101"
        "#;

        let config = Config::parse(toml).unwrap();
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.listen.to_string(), "0.0.0.0:9101");
    }

    #[test]
    fn test_metrics_defaults() {
        let config = Config::parse("").unwrap();
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.listen.to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn test_separate_egress_interface() {
        let toml = r#"
            interface = "eth0"
            egress_interface = "eth1"
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.egress_interface.as_deref(), Some("eth1"));
    }

    #[test]
    fn test_zero_max_entries_rejected() {
        let toml = "max_entries = 0";
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_empty_blacklist_path_rejected() {
        let toml = r#"blacklist_path = """#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_empty_interface_rejected() {
        let toml = r#"interface = """#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"unknown_field = "value""#;
        assert!(Config::parse(toml).is_err());
    }
}
