//! Loading and validating khal configuration files.
//!
//! A file is read into raw sections, each section is matched against a fixed
//! set of section kinds and coerced field by field, and the results are
//! assembled into a [`Configuration`] and cross-checked.

mod assemble;
mod builder;
mod coerce;
mod error;
mod expand;
mod ini;
mod model;
mod paths;
mod schema;
mod validate;

pub use assemble::{assemble, Assembly};
pub use builder::Config;
pub use error::{ConfigError, Diagnostic, Diagnostics, Warning};
pub use expand::{expand_path, expand_path_with};
pub use ini::{read_str, RawSection, SyntaxError};
pub use model::{
    CalendarSection, Command, Configuration, DefaultSection, LocaleSection, SqliteSection,
};
pub use paths::{cache_home, default_database_path, find_config_file};
pub use schema::{ParsedSection, SchemaDefaults, SectionKind, SectionMatch, SectionOutcome};
pub use validate::validate;
