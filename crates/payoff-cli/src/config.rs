use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::OutputFormat;

/// Optional defaults read from a YAML file (`--config` or `PAYOFF_CONFIG`).
///
/// ```yaml
/// output: table
/// log_level: info
/// start_date: 2026-04-01
/// baseline_buffer: "75"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub output: Option<OutputFormat>,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Used when neither the input nor `--start-date` gives one
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Added to monthly interest to form the advisor's baseline payment
    #[serde(default)]
    pub baseline_buffer: Option<Decimal>,
}

impl CliConfig {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let p = Path::new(path);
        if !p.is_file() {
            return Err(format!("Config file not found: {}", p.display()).into());
        }
        let contents = fs::read_to_string(p)
            .map_err(|e| format!("Failed to read '{}': {}", p.display(), e))?;
        Self::from_yaml(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", p.display(), e).into())
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_full_config() {
        let cfg = CliConfig::from_yaml(
            "output: csv\nlog_level: debug\nstart_date: 2026-04-01\nbaseline_buffer: 75\n",
        )
        .unwrap();
        assert!(matches!(cfg.output, Some(OutputFormat::Csv)));
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2026, 4, 1));
        assert_eq!(cfg.baseline_buffer, Some(dec!(75)));
    }

    #[test]
    fn test_empty_config_is_default() {
        let cfg = CliConfig::from_yaml("\n").unwrap();
        assert!(cfg.output.is_none());
        assert!(cfg.start_date.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CliConfig::from_yaml("colour: red\n").is_err());
    }
}
