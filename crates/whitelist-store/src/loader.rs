//! Parsing of persisted whitelist documents.
//!
//! Two shapes are accepted, as JSON or YAML:
//!
//! ```yaml
//! com.example.notes: true
//! com.example.games: false
//! ```
//!
//! ```yaml
//! entries:
//!   - package: com.example.notes
//!     enabled: true
//! ```

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::errors::SourceError;
use crate::model::{WhitelistEntry, WhitelistMap};
use crate::LOG_TARGET;

#[derive(Deserialize)]
#[serde(untagged)]
enum WhitelistDocument {
    Entries { entries: Vec<WhitelistEntry> },
    Map(WhitelistMap),
}

pub fn parse_whitelist_str(raw: &str) -> Result<WhitelistMap, SourceError> {
    if raw.trim().is_empty() {
        return Ok(WhitelistMap::new());
    }

    let document = match serde_json::from_str::<WhitelistDocument>(raw) {
        Ok(document) => document,
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            SourceError::Parse(format!("json error: {}; yaml error: {}", json_err, yaml_err))
        })?,
    };

    Ok(normalize(document))
}

pub fn load_whitelist_from_reader<R: Read>(mut reader: R) -> Result<WhitelistMap, SourceError> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| SourceError::Io {
            path: "<reader>".into(),
            message: err.to_string(),
        })?;
    parse_whitelist_str(&buf)
}

/// Reads a whitelist file. A file that does not exist yet is an empty whitelist.
pub fn load_whitelist_from_path(path: impl AsRef<Path>) -> Result<WhitelistMap, SourceError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(raw) => parse_whitelist_str(&raw),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(WhitelistMap::new()),
        Err(err) => Err(SourceError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }),
    }
}

fn normalize(document: WhitelistDocument) -> WhitelistMap {
    let pairs: Vec<(String, bool)> = match document {
        WhitelistDocument::Entries { entries } => entries
            .into_iter()
            .map(|entry| (entry.package, entry.enabled))
            .collect(),
        WhitelistDocument::Map(map) => map.into_iter().collect(),
    };

    let mut map = WhitelistMap::with_capacity(pairs.len());
    for (package, enabled) in pairs {
        if package.trim().is_empty() {
            warn!(target: LOG_TARGET, "dropping whitelist entry with blank package name");
            continue;
        }
        map.insert(package, enabled);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_map() {
        let map = parse_whitelist_str(r#"{"com.a": true, "com.b": false}"#).unwrap();
        assert_eq!(map.get("com.a"), Some(&true));
        assert_eq!(map.get("com.b"), Some(&false));
    }

    #[test]
    fn parses_yaml_entries() {
        let raw = "entries:\n  - package: com.a\n    enabled: true\n  - packageName: com.b\n    enabled: false\n";
        let map = parse_whitelist_str(raw).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("com.a"), Some(&true));
        assert_eq!(map.get("com.b"), Some(&false));
    }

    #[test]
    fn later_entry_overwrites_earlier() {
        let raw = r#"{"entries": [
            {"package": "com.a", "enabled": true},
            {"package": "com.a", "enabled": false}
        ]}"#;
        let map = parse_whitelist_str(raw).unwrap();
        assert_eq!(map.get("com.a"), Some(&false));
    }

    #[test]
    fn blank_document_is_empty() {
        assert!(parse_whitelist_str("  \n").unwrap().is_empty());
    }

    #[test]
    fn blank_keys_are_dropped() {
        let map = parse_whitelist_str(r#"{" ": true, "com.a": true}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("com.a"));
    }

    #[test]
    fn rejects_non_boolean_values() {
        let err = parse_whitelist_str("com.a: [1, 2]").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_whitelist_from_path(dir.path().join("absent.json")).unwrap();
        assert!(map.is_empty());
    }
}
