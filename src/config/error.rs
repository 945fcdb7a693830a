use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::ini::SyntaxError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot find any config file")]
    NoConfigFile,

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: SyntaxError,
    },

    #[error("invalid configuration: {0}")]
    Invalid(Diagnostics),

    #[error("{0} is not a valid calendar")]
    InvalidCalendarReference(String),
}

/// A problem that fails the load, collected across the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("missing required option '{option}' in section '{section}'")]
    MissingOption { section: String, option: String },

    #[error("invalid value for option '{option}' in section '{section}': {reason}")]
    Coercion {
        section: String,
        option: String,
        reason: String,
    },

    #[error("missing required section '{0}'")]
    MissingSection(String),

    #[error("duplicate section '{0}'")]
    DuplicateSection(String),
}

/// A problem that is logged and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("found unknown section '{0}' in config file")]
    UnknownSection(String),

    #[error("ignoring unknown option '{option}' in section '{section}'")]
    UnknownOption { section: String, option: String },
}

/// Every diagnostic gathered by a failed assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no diagnostics"),
            [only] => only.fmt(f),
            all => {
                write!(f, "{} problems", all.len())?;
                for diagnostic in all {
                    write!(f, "\n  - {diagnostic}")?;
                }
                Ok(())
            }
        }
    }
}
