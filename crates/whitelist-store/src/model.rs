use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw package → enabled mapping as read from a source.
pub type WhitelistMap = HashMap<String, bool>;

/// A single persisted toggle for one package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    #[serde(alias = "package_name", alias = "packageName")]
    pub package: String,
    pub enabled: bool,
}

impl WhitelistEntry {
    pub fn new(package: impl Into<String>, enabled: bool) -> Self {
        Self {
            package: package.into(),
            enabled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotOrigin {
    /// Nothing has been loaded yet.
    Empty,
    /// Built from a successful source read.
    Source,
}

/// Immutable view of the whitelist produced by one reload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WhitelistSnapshot {
    pub rev: u64,
    pub origin: SnapshotOrigin,
    /// Ticket of the source read this snapshot reflects.
    #[serde(default)]
    read_ticket: u64,
    entries: WhitelistMap,
}

impl PartialEq for WhitelistSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for WhitelistSnapshot {}

impl Default for WhitelistSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl WhitelistSnapshot {
    pub fn empty() -> Self {
        Self {
            rev: 0,
            origin: SnapshotOrigin::Empty,
            read_ticket: 0,
            entries: WhitelistMap::new(),
        }
    }

    /// Builds a snapshot from entries; a later entry for the same package wins.
    pub fn from_entries(rev: u64, entries: impl IntoIterator<Item = WhitelistEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.package, entry.enabled))
            .collect();
        Self::from_read(rev, 0, entries)
    }

    pub(crate) fn from_read(rev: u64, read_ticket: u64, entries: WhitelistMap) -> Self {
        Self {
            rev,
            origin: SnapshotOrigin::Source,
            read_ticket,
            entries,
        }
    }

    /// Same content and revision, confirmed by a later read.
    pub(crate) fn confirmed_by(&self, read_ticket: u64) -> Self {
        Self {
            read_ticket,
            ..self.clone()
        }
    }

    pub(crate) fn read_ticket(&self) -> u64 {
        self.read_ticket
    }

    /// Deny-by-default lookup.
    pub fn is_enabled(&self, package: &str) -> bool {
        self.entries.get(package).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Packages whose toggle is on, sorted for stable output.
    pub fn enabled_packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(package, _)| package.as_str())
            .collect();
        packages.sort_unstable();
        packages
    }

    pub fn entries(&self) -> impl Iterator<Item = WhitelistEntry> + '_ {
        self.entries
            .iter()
            .map(|(package, enabled)| WhitelistEntry::new(package.clone(), *enabled))
    }

    pub(crate) fn same_entries(&self, other: &WhitelistMap) -> bool {
        &self.entries == other
    }
}
