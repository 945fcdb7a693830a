use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the khal-conf library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid config file: {0}")]
    Config(#[from] ConfigError),
}
