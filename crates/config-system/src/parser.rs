//! Configuration file parser for multiple formats

use crate::{ChartConfig, ConfigError, ConfigValidator, Result};
use std::fs;
use std::path::Path;

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse configuration from a file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<ChartConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = Self::detect_format(path)?;
        Self::parse_string(&content, format)
    }

    /// Parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<ChartConfig> {
        let path = path.as_ref();
        let config = Self::parse_file(path)?;
        ConfigValidator::validate(&config)?;
        log::info!("Loaded chart configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a string
    pub fn parse_string(content: &str, format: ConfigFormat) -> Result<ChartConfig> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("YAML parse error: {e}"))),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {e}"))),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {e}"))),
        }
    }

    /// Detect configuration format from file extension
    pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ConfigError::Parse("Cannot determine config format from file extension".to_string())
        })?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::Parse(format!("Unsupported config format: {ext}"))),
        }
    }
}

/// Configuration serializer
pub struct ConfigSerializer;

impl ConfigSerializer {
    /// Serialize configuration to a file, picking the format from the extension
    pub fn serialize_file(config: &ChartConfig, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ConfigParser::detect_format(path)?;
        let content = Self::serialize_string(config, format)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn serialize_string(config: &ChartConfig, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Yaml => serde_yaml::to_string(config)
                .map_err(|e| ConfigError::Parse(format!("YAML serialize error: {e}"))),
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| ConfigError::Parse(format!("JSON serialize error: {e}"))),
            ConfigFormat::Toml => toml::to_string_pretty(config)
                .map_err(|e| ConfigError::Parse(format!("TOML serialize error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_charts_shared::Interval;
    use std::io::Write;

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
loading:
  load_more_threshold: 8
  throttle_ms: 2000
hysteresis:
  1h:
    lower_days: 4.0
    upper_days: 120.0
indicators:
  ma20: true
  bollinger: true
"#;

        let config = ConfigParser::parse_string(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.loading.load_more_threshold, 8);
        assert_eq!(config.loading.throttle_ms, 2000);
        assert_eq!(config.loading.debounce_ms, 500);
        assert_eq!(
            config.hysteresis.band(Interval::Hour1).and_then(|b| b.upper_days),
            Some(120.0)
        );
        assert!(config.indicators.ma20);
        assert!(!config.indicators.ma50);
    }

    #[test]
    fn test_toml_parsing() {
        let toml = r#"
[loading]
fetch_padding_multiplier = 0.25
auto_interval_switch = false

[cache]
capacity = 16

[hysteresis."1wk"]
lower_days = 200.0
"#;

        let config = ConfigParser::parse_string(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.loading.fetch_padding_multiplier, 0.25);
        assert!(!config.loading.auto_interval_switch);
        assert_eq!(config.cache.capacity, 16);
        assert_eq!(config.cache.ttl_secs, 300);

        let weekly = config.hysteresis.band(Interval::Week1).unwrap();
        assert_eq!(weekly.lower_days, Some(200.0));
        assert_eq!(weekly.upper_days, None);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigParser::detect_format(Path::new("chart.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigParser::detect_format(Path::new("chart.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigParser::detect_format(Path::new("chart.ini")).is_err());
        assert!(ConfigParser::detect_format(Path::new("chart")).is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"loading": {{"min_candles_fetch": 40}}}}"#).unwrap();

        let config = ConfigParser::load(file.path()).unwrap();
        assert_eq!(config.loading.min_candles_fetch, 40);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "loading:\n  min_candles_fetch: 0").unwrap();

        let err = ConfigParser::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ConfigParser::parse_file("/nonexistent/chart.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_serialized_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.toml");

        ConfigSerializer::serialize_file(&ChartConfig::default(), &path).unwrap();
        let loaded = ConfigParser::load(&path).unwrap();
        assert_eq!(loaded, ChartConfig::default());
    }
}
