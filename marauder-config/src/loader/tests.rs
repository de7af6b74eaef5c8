use std::fs;

use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use serial_test::serial;

use super::layers::ConfigLayerSource;
use super::{ConfigManager, ConfigPaths, MarauderConfig, PartialConfig};
use crate::error::ConfigError;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn sample_config() -> MarauderConfig {
    MarauderConfig {
        base_url: "http://localhost:1234/v1".into(),
        api_key: "sk-file".into(),
        model: "file-model".into(),
        context_limit: 64_000,
    }
}

#[test]
fn missing_file_leaves_config_incomplete() -> TestResult {
    let home = TempDir::new()?;
    let manager = ConfigManager::load_with(
        ConfigPaths::new(home.path()),
        PartialConfig::default(),
        PartialConfig::default(),
    )?;

    assert!(manager.saved().is_none());
    let err = manager.resolve().err().ok_or("expected an incomplete config")?;
    match err {
        ConfigError::Incomplete { missing } => assert_eq!(missing, vec!["api_key", "model"]),
        other => return Err(format!("unexpected error: {other}").into()),
    }
    Ok(())
}

#[test]
fn layers_apply_in_precedence_order() -> TestResult {
    let home = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    fs::write(
        paths.default_config_file(),
        serde_json::to_string(&sample_config())?,
    )?;

    let environment = PartialConfig {
        model: Some("env-model".into()),
        ..PartialConfig::default()
    };
    let runtime = PartialConfig {
        api_key: Some("sk-flag".into()),
        ..PartialConfig::default()
    };
    let manager = ConfigManager::load_with(paths, environment, runtime)?;
    let config = manager.resolve()?;

    assert_eq!(config.base_url, "http://localhost:1234/v1");
    assert_eq!(config.api_key, "sk-flag");
    assert_eq!(config.model, "env-model");
    assert_eq!(config.context_limit, 64_000);
    assert_eq!(
        manager.layer_stack().model_source(),
        Some(&ConfigLayerSource::Environment)
    );
    Ok(())
}

#[test]
fn context_limit_defaults_when_absent_from_file() -> TestResult {
    let home = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    fs::write(
        paths.default_config_file(),
        r#"{"base_url": "http://x/v1", "api_key": "k", "model": "m"}"#,
    )?;

    let manager =
        ConfigManager::load_with(paths, PartialConfig::default(), PartialConfig::default())?;
    assert_eq!(manager.resolve()?.context_limit, 128_000);
    Ok(())
}

#[test]
fn pointer_file_redirects_config_location() -> TestResult {
    let home = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    let target = elsewhere.path().join("marauder_config.json");
    paths.remember_config_file(&target)?;

    assert_eq!(paths.config_file(), target);
    Ok(())
}

#[test]
fn stale_pointer_falls_back_to_default() -> TestResult {
    let home = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    fs::write(paths.pointer_file(), "/definitely/not/here/config.json")?;

    assert_eq!(paths.config_file(), paths.default_config_file());
    Ok(())
}

#[test]
fn save_to_custom_location_round_trips() -> TestResult {
    let home = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    let location = paths.save_location(&elsewhere.path().to_string_lossy(), home.path());
    assert_eq!(location, elsewhere.path().join("marauder_config.json"));

    let mut manager =
        ConfigManager::load_with(paths.clone(), PartialConfig::default(), PartialConfig::default())?;
    let saved_to = manager.save(&sample_config(), Some(&location))?;
    assert_eq!(saved_to, location);

    let reloaded =
        ConfigManager::load_with(paths, PartialConfig::default(), PartialConfig::default())?;
    assert_eq!(reloaded.config_file(), location.as_path());
    assert_eq!(reloaded.saved(), Some(&sample_config()));
    Ok(())
}

#[test]
fn save_location_expands_home() {
    let paths = ConfigPaths::new("/home/mar");
    assert_eq!(
        paths.save_location("~/cfg/marauder.json", std::path::Path::new("/tmp")),
        std::path::PathBuf::from("/home/mar/cfg/marauder.json")
    );
    assert_eq!(
        paths.save_location("cfg.json", std::path::Path::new("/tmp")),
        std::path::PathBuf::from("/tmp/cfg.json")
    );
}

#[test]
fn malformed_file_is_a_parse_error() -> TestResult {
    let home = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    fs::write(paths.default_config_file(), "{ not json")?;

    let result =
        ConfigManager::load_with(paths, PartialConfig::default(), PartialConfig::default());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    Ok(())
}

#[test]
fn debug_output_hides_api_key() {
    let rendered = format!("{:?}", sample_config());
    assert!(!rendered.contains("sk-file"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
#[serial]
fn process_environment_overrides_file() -> TestResult {
    let home = TempDir::new()?;
    let paths = ConfigPaths::new(home.path());
    fs::write(
        paths.default_config_file(),
        serde_json::to_string(&sample_config())?,
    )?;

    // SAFETY: serialized with every other test that touches the environment.
    unsafe { std::env::set_var("MARAUDER_CONTEXT_LIMIT", "8000") };
    let loaded = ConfigManager::load(paths, PartialConfig::default());
    unsafe { std::env::remove_var("MARAUDER_CONTEXT_LIMIT") };

    assert_eq!(loaded?.resolve()?.context_limit, 8_000);
    Ok(())
}
