use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unsupported config key: {0}")]
    UnsupportedKey(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("a clipboard guard is already installed for this process")]
    AlreadyInstalled,
}
