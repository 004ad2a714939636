use std::env;
use std::path::PathBuf;

use clipboard_whitelist::config::{load_config_with_options, LoadOptions};
use clipboard_whitelist::{load_config, ConfigError, GuardConfig};
use serial_test::serial;

fn clear_env() {
    for (key, _) in env::vars() {
        if key.starts_with("CLIPBOARD_WHITELIST__") {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn defaults_without_file_or_env() {
    clear_env();
    let config = load_config(None).unwrap();
    assert_eq!(config, GuardConfig::default());
    assert_eq!(config.audit.channel_capacity, 128);
    assert_eq!(config.logging.level, "info");
    assert!(config.whitelist.path.is_none());
}

#[test]
#[serial]
fn missing_file_is_tolerated() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(dir.path().join("absent.yaml").as_path())).unwrap();
    assert_eq!(config, GuardConfig::default());
}

#[test]
#[serial]
fn yaml_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("guard.yaml");
    std::fs::write(
        &file,
        "whitelist:\n  path: /data/prefs/whitelist.json\naudit:\n  channel_capacity: 16\nlogging:\n  level: debug\n",
    )
    .unwrap();

    let config = load_config(Some(file.as_path())).unwrap();
    assert_eq!(
        config.whitelist.path,
        Some(PathBuf::from("/data/prefs/whitelist.json"))
    );
    assert_eq!(config.audit.channel_capacity, 16);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.whitelist_path().unwrap(),
        PathBuf::from("/data/prefs/whitelist.json")
    );
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("guard.yaml");
    std::fs::write(&file, "audit:\n  channel_capacity: 16\n").unwrap();
    env::set_var("CLIPBOARD_WHITELIST__AUDIT__CHANNEL_CAPACITY", "32");
    env::set_var("CLIPBOARD_WHITELIST__WHITELIST__PATH", "/tmp/wl.json");
    env::set_var("CLIPBOARD_WHITELIST__LOGGING__DEBUG", "true");

    let config = load_config_with_options(&LoadOptions::with_path(&file));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.audit.channel_capacity, 32);
    assert_eq!(config.whitelist.path, Some(PathBuf::from("/tmp/wl.json")));
    assert!(config.logging.debug);
}

#[test]
#[serial]
fn unknown_keys_are_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("guard.yaml");
    std::fs::write(&file, "whitelist:\n  reload_interval_ms: 10\n").unwrap();

    let err = load_config(Some(file.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedKey(key) if key == "whitelist.reload_interval_ms"));
}

#[test]
#[serial]
fn wrong_value_types_are_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("guard.yaml");
    std::fs::write(&file, "logging:\n  debug: sometimes\n").unwrap();

    let err = load_config(Some(file.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
}
