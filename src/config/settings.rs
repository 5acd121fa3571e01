use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::error::ModbusError;

/// Connection and output defaults, loadable from a TOML file. Command-line
/// arguments always override file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub device_address: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Plain,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModbusError> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ModbusError::ConfigError(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let settings: Settings = toml::from_str(&content)?;

        debug!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModbusError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ModbusError::ConfigError(format!("cannot create dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ModbusError::ConfigError(format!("cannot serialize settings: {}", e)))?;
        std::fs::write(&path, content).map_err(|e| {
            ModbusError::ConfigError(format!(
                "cannot write {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Load from `path` when given, otherwise fall back to defaults. A
    /// missing or unreadable file is downgraded to defaults with a warning so
    /// the command line alone stays sufficient.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Settings::from_file(path).unwrap_or_else(|e| {
                warn!("{}; using built-in defaults", e);
                Settings::default()
            }),
            None => Settings::default(),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ModbusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "plain" => Ok(OutputFormat::Plain),
            other => Err(ModbusError::InvalidArgument(format!(
                "unknown output format '{}' (expected console, json or plain)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_settings_file() {
        let settings: Settings = toml::from_str(
            r#"
            [connection]
            host = "10.0.0.30"
            port = 4660

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.connection.host.as_deref(), Some("10.0.0.30"));
        assert_eq!(settings.connection.port, Some(4660));
        assert_eq!(settings.connection.device_address, None);
        assert_eq!(settings.output.format, OutputFormat::Json);
    }

    #[test]
    fn defaults_when_no_path_given() {
        let settings = Settings::load_or_default(None);
        assert_eq!(settings.output.format, OutputFormat::Console);
        assert!(settings.connection.host.is_none());
    }

    #[test]
    fn format_parses_from_cli_strings() {
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
