use std::env;
use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// Environment variable holding the `EnvFilter` directive.
pub const LEVEL_ENV: &str = "PACER_LOG";
/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "PACER_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `pacer_core=trace,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Defaults overridden by `PACER_LOG` and `PACER_LOG_FORMAT` when set.
    pub fn from_env() -> Result<Self, LoggerError> {
        let mut cfg = Self::default();
        if let Ok(level) = env::var(LEVEL_ENV)
            && !level.trim().is_empty()
        {
            cfg.level = level;
        }
        if let Ok(format) = env::var(FORMAT_ENV) {
            cfg.format = format.parse()?;
        }
        Ok(cfg)
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_helpers_override_defaults() {
        let cfg = LoggerConfig::default()
            .with_level("pacer_core=trace")
            .with_format(LoggerFormat::Json);
        assert_eq!(cfg.level, "pacer_core=trace");
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert!(cfg.with_targets);
    }

    #[test]
    fn deserialises_partial_config() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{ "format": "json", "useColor": false }"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, "info");
        assert!(!cfg.use_color);
    }
}
