//! Configuration for trip settlement

use serde::{Deserialize, Serialize};

/// Trip settlement configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Log filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,

    /// Report output configuration
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "trip-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_filter: "info".to_string(),
            log_json: false,
            report: ReportConfig::default(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimal places shown for amounts
    pub display_dp: u32,

    /// Compute the minimal transfer plan
    pub include_transfer_plan: bool,

    /// Pretty print JSON output
    pub pretty: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            display_dp: 2,
            include_transfer_plan: true,
            pretty: true,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML content
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup on top of the defaults
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(filter) = lookup("TRIP_SETTLEMENT_LOG") {
            config.log_filter = filter;
        }

        if let Some(flag) = lookup("TRIP_SETTLEMENT_LOG_JSON") {
            config.log_json = parse_flag("TRIP_SETTLEMENT_LOG_JSON", &flag)?;
        }

        if let Some(dp) = lookup("TRIP_SETTLEMENT_DISPLAY_DP") {
            config.report.display_dp = dp.trim().parse().map_err(|_| {
                crate::Error::Config(format!("TRIP_SETTLEMENT_DISPLAY_DP is not a number: {}", dp))
            })?;
        }

        if let Some(flag) = lookup("TRIP_SETTLEMENT_TRANSFER_PLAN") {
            config.report.include_transfer_plan =
                parse_flag("TRIP_SETTLEMENT_TRANSFER_PLAN", &flag)?;
        }

        if let Some(flag) = lookup("TRIP_SETTLEMENT_PRETTY") {
            config.report.pretty = parse_flag("TRIP_SETTLEMENT_PRETTY", &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the report cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        // Decimal supports at most 28 fractional digits
        if self.report.display_dp > 28 {
            return Err(crate::Error::Config(format!(
                "display_dp {} exceeds 28",
                self.report.display_dp
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(crate::Error::Config(format!("{} is not a boolean: {}", key, other))),
    }
}
