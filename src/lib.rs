//! Clipboard whitelist
//!
//! Decides whether a clipboard access should bypass the host's confirmation
//! step, and whether the host's access notification should be suppressed,
//! from a package whitelist edited outside the process.

pub mod config;
pub mod errors;
pub mod guard;
pub mod logging;

pub use clipboard_access_policy::{
    AccessDecision, AccessPolicy, AccessRequest, AuditEvent, ClipboardGate, DecisionReason,
    EntryPoint, Evaluation, IdentityError, IdentityVerifier, UidRegistry,
};
pub use clipboard_whitelist_store::{
    FileSource, MemorySource, ReloadOutcome, SourceError, WhitelistEntry, WhitelistSnapshot,
    WhitelistSource, WhitelistStore, LOG_TARGET,
};
pub use config::{load_config, GuardConfig};
pub use errors::{ConfigError, GuardError};
pub use guard::{
    clipboard_access_allowed, global, install, should_suppress_notification, ClipboardGuard,
};
pub use logging::init_logging;
