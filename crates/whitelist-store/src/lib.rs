pub mod errors;
pub mod loader;
pub mod model;
pub mod source;
pub mod store;

pub use errors::SourceError;
pub use loader::{load_whitelist_from_path, parse_whitelist_str};
pub use model::{SnapshotOrigin, WhitelistEntry, WhitelistMap, WhitelistSnapshot};
pub use source::{FileSource, MemorySource, WhitelistSource};
pub use store::{ReloadOutcome, WhitelistStore};

/// Tracing target shared by every crate in the workspace.
pub const LOG_TARGET: &str = "clipboard-whitelist";
