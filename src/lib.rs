pub mod config;
mod error;

pub use config::{Command, Config, ConfigError, Configuration};
pub use error::Error;
