//! Loading configuration files in every supported format

use candle_charts_config::{ChartConfig, ConfigFormat, ConfigParser, ConfigSerializer};
use candle_charts_shared::Interval;
use std::fs;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_same_settings_in_every_format() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    let mut expected = ChartConfig::default();
    expected.loading.throttle_ms = 1500;
    expected.indicators.ema20 = true;

    for (name, format) in [
        ("chart.yaml", ConfigFormat::Yaml),
        ("chart.json", ConfigFormat::Json),
        ("chart.toml", ConfigFormat::Toml),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, ConfigSerializer::serialize_string(&expected, format).unwrap()).unwrap();

        let loaded = ConfigParser::load(&path).unwrap();
        assert_eq!(loaded, expected, "{name}");
    }
}

#[test]
fn test_partial_file_keeps_defaults() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.yml");
    fs::write(&path, "indicators:\n  trendlines: true\n").unwrap();

    let config = ConfigParser::load(&path).unwrap();
    assert!(config.indicators.trendlines);
    assert_eq!(config.loading, ChartConfig::default().loading);
    assert_eq!(
        config.hysteresis.band(Interval::Month1).and_then(|b| b.lower_days),
        Some(1500.0)
    );
}

#[test]
fn test_malformed_file_is_parse_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigParser::load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Parse error"));
}
