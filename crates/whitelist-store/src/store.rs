use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::SourceError;
use crate::model::{SnapshotOrigin, WhitelistMap, WhitelistSnapshot};
use crate::source::WhitelistSource;
use crate::LOG_TARGET;

/// Result of a single [`WhitelistStore::reload`]. Safe to ignore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot with different content was installed.
    Updated { rev: u64 },
    /// The source matched the current snapshot; the revision is unchanged.
    Unchanged { rev: u64 },
    /// A reload that read the source later already installed its result;
    /// this read was discarded.
    Superseded { rev: u64 },
    /// The source could not be read; the previous snapshot stays in place.
    Retained { rev: u64, error: SourceError },
}

impl ReloadOutcome {
    pub fn rev(&self) -> u64 {
        match self {
            Self::Updated { rev }
            | Self::Unchanged { rev }
            | Self::Superseded { rev }
            | Self::Retained { rev, .. } => *rev,
        }
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, Self::Retained { .. })
    }
}

enum InstallStep {
    Superseded,
    Confirmed,
    Replaced(Arc<WhitelistSnapshot>),
}

/// Holds the current whitelist snapshot and refreshes it from a source.
///
/// Lookups load the snapshot pointer without locking; reloads build a whole
/// new snapshot off to the side and swap it in, so readers only ever see a
/// complete snapshot. Every source read takes a ticket first, and a snapshot
/// is only replaced by one built from a later read, so a slow reload can
/// never roll back the result of a reload that finished before it.
pub struct WhitelistStore {
    source: Arc<dyn WhitelistSource>,
    current: ArcSwap<WhitelistSnapshot>,
    last_error: ArcSwapOption<SourceError>,
    read_tickets: AtomicU64,
    rev_counter: AtomicU64,
    watch_tx: watch::Sender<Arc<WhitelistSnapshot>>,
}

impl WhitelistStore {
    /// Creates a store holding the empty snapshot. Nothing is read until the
    /// first [`reload`](Self::reload).
    pub fn new(source: Arc<dyn WhitelistSource>) -> Self {
        let initial = Arc::new(WhitelistSnapshot::empty());
        let (watch_tx, _watch_rx) = watch::channel(Arc::clone(&initial));
        Self {
            source,
            current: ArcSwap::from(initial),
            last_error: ArcSwapOption::empty(),
            read_tickets: AtomicU64::new(0),
            rev_counter: AtomicU64::new(0),
            watch_tx,
        }
    }

    /// Creates a store and performs the initial reload.
    pub fn open(source: Arc<dyn WhitelistSource>) -> Self {
        let store = Self::new(source);
        store.reload();
        store
    }

    /// Re-reads the backing source. Read faults are logged and leave the
    /// previous snapshot in place.
    pub fn reload(&self) -> ReloadOutcome {
        let ticket = self.read_tickets.fetch_add(1, Ordering::SeqCst) + 1;
        match self.source.read_entries() {
            Ok(entries) => {
                self.last_error.store(None);
                self.install(ticket, entries)
            }
            Err(error) => {
                let rev = self.current.load().rev;
                warn!(
                    target: LOG_TARGET,
                    source = %self.source.describe(),
                    %error,
                    rev,
                    "whitelist reload failed; keeping last good snapshot"
                );
                self.last_error.store(Some(Arc::new(error.clone())));
                ReloadOutcome::Retained { rev, error }
            }
        }
    }

    fn install(&self, ticket: u64, entries: WhitelistMap) -> ReloadOutcome {
        let mut step = InstallStep::Superseded;
        let previous = self.current.rcu(|current| {
            if current.read_ticket() > ticket {
                step = InstallStep::Superseded;
                return Arc::clone(current);
            }
            if current.origin == SnapshotOrigin::Source && current.same_entries(&entries) {
                step = InstallStep::Confirmed;
                return Arc::new(current.confirmed_by(ticket));
            }
            let rev = self.rev_counter.fetch_add(1, Ordering::SeqCst) + 1;
            let next = Arc::new(WhitelistSnapshot::from_read(rev, ticket, entries.clone()));
            step = InstallStep::Replaced(Arc::clone(&next));
            next
        });

        let next = match step {
            InstallStep::Superseded => {
                debug!(
                    target: LOG_TARGET,
                    ticket,
                    current_ticket = previous.read_ticket(),
                    "discarding whitelist read overtaken by a later reload"
                );
                return ReloadOutcome::Superseded { rev: previous.rev };
            }
            InstallStep::Confirmed => return ReloadOutcome::Unchanged { rev: previous.rev },
            InstallStep::Replaced(next) => next,
        };

        debug!(
            target: LOG_TARGET,
            rev = next.rev,
            previous_rev = previous.rev,
            entries = next.len(),
            "whitelist snapshot replaced"
        );
        let rev = next.rev;
        self.watch_tx.send_if_modified(|published| {
            if next.rev > published.rev {
                *published = next;
                true
            } else {
                false
            }
        });
        ReloadOutcome::Updated { rev }
    }

    /// Deny-by-default lookup against the most recently installed snapshot.
    pub fn is_enabled(&self, package: &str) -> bool {
        self.current.load().is_enabled(package)
    }

    pub fn snapshot(&self) -> Arc<WhitelistSnapshot> {
        self.current.load_full()
    }

    pub fn revision(&self) -> u64 {
        self.current.load().rev
    }

    /// Error from the latest reload, cleared by the next successful one.
    pub fn last_error(&self) -> Option<SourceError> {
        self.last_error.load_full().map(|error| (*error).clone())
    }

    /// Receives every snapshot whose content differs from its predecessor.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WhitelistSnapshot>> {
        self.watch_tx.subscribe()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}
