use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::command::BitOrderArg;
use fs9721::structs::fields::BitOrder;

/// Settings read from the YAML file given with `--config`.
///
/// ```yaml
/// bit_order: reversed
/// strict: false
/// csv: readings.csv
/// auto_reopen: true
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bit_order: Option<BitOrderArg>,
    pub strict: bool,
    pub csv: Option<PathBuf>,
    pub auto_reopen: bool,
}

impl Config {
    /// Loads the file at `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn bit_order(&self, arg: Option<BitOrderArg>) -> BitOrder {
        arg.or(self.bit_order).map(BitOrder::from).unwrap_or_default()
    }

    pub fn fail_level(&self, strict_arg: bool) -> log::Level {
        if strict_arg || self.strict {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }

    pub fn csv_path(&self, arg: Option<&Path>) -> Option<PathBuf> {
        arg.map(Path::to_path_buf).or_else(|| self.csv.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml() -> Result<()> {
        let config = Config::from_yaml("bit_order: reversed\nstrict: true\ncsv: log.csv\n")?;

        assert_eq!(config.bit_order, Some(BitOrderArg::Reversed));
        assert!(config.strict);
        assert_eq!(config.csv, Some(PathBuf::from("log.csv")));
        assert!(!config.auto_reopen);
        Ok(())
    }

    #[test]
    fn empty_file_is_default() -> Result<()> {
        assert_eq!(Config::from_yaml("")?, Config::default());
        assert_eq!(Config::load(None)?, Config::default());
        Ok(())
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::from_yaml("bitorder: reversed\n").is_err());
    }

    #[test]
    fn arguments_override_file() -> Result<()> {
        let config = Config::from_yaml("bit_order: reversed\ncsv: file.csv\n")?;

        assert_eq!(config.bit_order(None), BitOrder::Reversed);
        assert_eq!(
            config.bit_order(Some(BitOrderArg::AsDelivered)),
            BitOrder::AsDelivered
        );
        assert_eq!(
            config.csv_path(Some(Path::new("arg.csv"))),
            Some(PathBuf::from("arg.csv"))
        );
        assert_eq!(config.csv_path(None), Some(PathBuf::from("file.csv")));
        assert_eq!(config.fail_level(false), log::Level::Error);
        assert_eq!(config.fail_level(true), log::Level::Warn);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/fs9721d.yaml"))).is_err());
    }
}
