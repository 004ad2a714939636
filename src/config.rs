//! Guard configuration: built-in defaults, an optional YAML/JSON file, then
//! `CLIPBOARD_WHITELIST__*` environment overlays.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigError;

const ENV_PREFIX: &str = "CLIPBOARD_WHITELIST__";
const APP_DIR: &str = "clipboard-whitelist";
const DEFAULT_WHITELIST_FILE: &str = "whitelist.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GuardConfig {
    pub whitelist: WhitelistSettings,
    pub audit: AuditSettings,
    pub logging: LoggingSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WhitelistSettings {
    /// Preferences file written by the settings surface.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    pub channel_capacity: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            channel_capacity: clipboard_access_policy::DEFAULT_AUDIT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub debug: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
        }
    }
}

impl GuardConfig {
    /// Configured whitelist path, falling back to the platform config dir.
    pub fn whitelist_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.whitelist.path {
            return Ok(path.clone());
        }
        let mut path = dirs::config_dir().ok_or_else(|| {
            ConfigError::Invalid("no whitelist path configured and no config dir".into())
        })?;
        path.push(APP_DIR);
        path.push(DEFAULT_WHITELIST_FILE);
        Ok(path)
    }
}

/// Layers applied on top of the built-in defaults, files first, then the
/// environment.
#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
}

impl LoadOptions {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            include_env: true,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<GuardConfig, ConfigError> {
    let options = LoadOptions {
        paths: path.map(Path::to_path_buf).into_iter().collect(),
        include_env: true,
    };
    load_config_with_options(&options)
}

pub fn load_config_with_options(options: &LoadOptions) -> Result<GuardConfig, ConfigError> {
    let mut config = GuardConfig::default();

    for path in options.paths.iter().filter(|path| path.exists()) {
        for (key, value) in file_layer(path)? {
            apply_override(&mut config, &key, &value)?;
        }
    }

    if options.include_env {
        for (key, value) in env_layer(env::vars()) {
            apply_override(&mut config, &key, &value)?;
        }
    }

    Ok(config)
}

fn apply_override(config: &mut GuardConfig, path: &str, value: &Value) -> Result<(), ConfigError> {
    match path {
        "whitelist.path" => config.whitelist.path = to_optional_path(value)?,
        "audit.channel_capacity" => config.audit.channel_capacity = to_capacity(value)?,
        "logging.level" => config.logging.level = to_string(value)?,
        "logging.debug" => config.logging.debug = to_bool(value)?,
        other => return Err(ConfigError::UnsupportedKey(other.to_string())),
    }
    Ok(())
}

fn file_layer(path: &Path) -> Result<Vec<(String, Value)>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: Value =
        serde_yaml::from_str(&content).map_err(|err| ConfigError::Invalid(err.to_string()))?;
    let mut leaves = Vec::new();
    collect_leaves(&document, "", &mut leaves);
    Ok(leaves)
}

/// Dotted lowercase key for every scalar under a mapping.
fn collect_leaves(value: &Value, path: &str, leaves: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.trim().to_ascii_lowercase();
                let child_path = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                collect_leaves(child, &child_path, leaves);
            }
        }
        leaf if !path.is_empty() => leaves.push((path.to_string(), leaf.clone())),
        _ => {}
    }
}

/// `CLIPBOARD_WHITELIST__AUDIT__CHANNEL_CAPACITY=32` → `audit.channel_capacity = 32`.
fn env_layer(vars: impl Iterator<Item = (String, String)>) -> Vec<(String, Value)> {
    let mut layer: Vec<(String, Value)> = vars
        .filter_map(|(key, raw)| {
            let path = key
                .strip_prefix(ENV_PREFIX)?
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(str::to_ascii_lowercase)
                .collect::<Vec<_>>()
                .join(".");
            (!path.is_empty()).then(|| (path, env_value(&raw)))
        })
        .collect();
    layer.sort_by(|a, b| a.0.cmp(&b.0));
    layer
}

fn env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn to_optional_path(value: &Value) -> Result<Option<PathBuf>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) if raw.trim().is_empty() => Ok(None),
        Value::String(raw) => Ok(Some(PathBuf::from(raw))),
        other => Err(ConfigError::InvalidValue(format!("expected path, got {other}"))),
    }
}

fn to_capacity(value: &Value) -> Result<usize, ConfigError> {
    match value.as_u64() {
        Some(0) => Err(ConfigError::InvalidValue(
            "audit.channel_capacity must be positive".into(),
        )),
        Some(v) => usize::try_from(v)
            .map_err(|_| ConfigError::InvalidValue(format!("value {v} exceeds usize"))),
        None => Err(ConfigError::InvalidValue(format!(
            "expected integer, got {value}"
        ))),
    }
}

fn to_string(value: &Value) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidValue(format!("expected string, got {value}")))
}

fn to_bool(value: &Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::InvalidValue(format!("expected bool, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_use_dotted_lowercase_keys() {
        let value = serde_json::json!({"Whitelist": {"path": "/tmp/w.json"}, "audit": {"channel_capacity": 4}});
        let mut leaves = Vec::new();
        collect_leaves(&value, "", &mut leaves);
        leaves.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(leaves[0], ("audit.channel_capacity".to_string(), serde_json::json!(4)));
        assert_eq!(leaves[1].0, "whitelist.path");
    }

    #[test]
    fn env_layer_keeps_prefixed_keys_only() {
        let vars = vec![
            ("CLIPBOARD_WHITELIST__LOGGING__DEBUG".to_string(), "true".to_string()),
            ("CLIPBOARD_WHITELIST__".to_string(), "ignored".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let layer = env_layer(vars.into_iter());
        assert_eq!(layer, vec![("logging.debug".to_string(), Value::Bool(true))]);
    }

    #[test]
    fn env_values_parse_as_json_first() {
        assert_eq!(env_value("true"), Value::Bool(true));
        assert_eq!(env_value("16"), serde_json::json!(16));
        assert_eq!(
            env_value("/data/whitelist.json"),
            Value::String("/data/whitelist.json".into())
        );
        assert_eq!(env_value(""), Value::Null);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = GuardConfig::default();
        let err = apply_override(&mut config, "audit.channel_capacity", &serde_json::json!(0))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
