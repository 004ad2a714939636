use thiserror::Error;

/// Failures raised while reading the backing whitelist source.
///
/// These never reach the decision path: the store logs them and keeps the
/// last good snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse whitelist: {0}")]
    Parse(String),
    #[error("whitelist source unavailable: {0}")]
    Unavailable(String),
}
