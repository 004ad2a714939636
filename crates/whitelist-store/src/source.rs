use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::SourceError;
use crate::loader::load_whitelist_from_path;
use crate::model::WhitelistMap;

/// Externally writable backing store for the whitelist.
///
/// Implementations are read on every access decision, so a read should cost
/// no more than parsing the persisted entries.
pub trait WhitelistSource: Send + Sync {
    fn read_entries(&self) -> Result<WhitelistMap, SourceError>;

    fn describe(&self) -> String {
        "whitelist source".to_string()
    }
}

impl<T: WhitelistSource + ?Sized> WhitelistSource for Arc<T> {
    fn read_entries(&self) -> Result<WhitelistMap, SourceError> {
        (**self).read_entries()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Preferences file written by the settings surface.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WhitelistSource for FileSource {
    fn read_entries(&self) -> Result<WhitelistMap, SourceError> {
        load_whitelist_from_path(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process source shared between the embedding host and the store.
///
/// Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: Arc<RwLock<WhitelistMap>>,
    failures_pending: Arc<AtomicU32>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let source = Self::new();
        source.replace_all(entries);
        source
    }

    pub fn set(&self, package: impl Into<String>, enabled: bool) {
        self.entries.write().insert(package.into(), enabled);
    }

    pub fn remove(&self, package: &str) -> bool {
        self.entries.write().remove(package).is_some()
    }

    pub fn replace_all<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(package, enabled)| (package.into(), enabled))
            .collect();
        *self.entries.write() = map;
    }

    /// Makes the next `count` reads fail as if the backing store were unreadable.
    pub fn fail_next_reads(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    pub fn entries(&self) -> WhitelistMap {
        self.entries.read().clone()
    }
}

impl WhitelistSource for MemorySource {
    fn read_entries(&self) -> Result<WhitelistMap, SourceError> {
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            })
            .is_ok();
        if injected {
            return Err(SourceError::Unavailable("injected read failure".into()));
        }
        Ok(self.entries.read().clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
