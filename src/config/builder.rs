use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::assemble::assemble;
use super::ini::read_str;
use super::model::Configuration;
use super::paths::{cache_home, default_database_path, find_config_file};
use super::schema::SchemaDefaults;
use super::validate::validate;
use super::ConfigError;

/// Builder for loading a khal configuration file.
///
/// Loading reads the file once, matches every section against the known
/// section kinds, fills in defaults and finally checks that
/// `default_calendar` names a configured calendar. Unknown sections and
/// options are logged as warnings; every other problem fails the load, and
/// all of them are reported together.
///
/// ## Example
///
/// ```no_run
/// use khal_conf::Config;
///
/// let config = Config::builder()
///     .with_file("/home/user/.config/khal/khal.conf")
///     .build()?;
///
/// for calendar in &config.calendars {
///     println!("{} -> {}", calendar.name, calendar.path.display());
/// }
/// # Ok::<(), khal_conf::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    path: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the file to load. The file is required to exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the cache directory the default `[sqlite]` path is built from.
    ///
    /// Defaults to `$XDG_CACHE_HOME` or `~/.cache`.
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Loads, assembles and validates the configuration.
    ///
    /// Without a file set, the standard locations are searched.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let path = match self.path {
            Some(path) => path,
            None => find_config_file().ok_or(ConfigError::NoConfigFile)?,
        };
        debug!(path = %path.display(), "loading configuration");

        let contents = read_config_file(&path)?;
        parse(&contents, &path, &schema_defaults(self.cache_dir))
    }

    /// Parses configuration text directly, without touching the filesystem.
    pub fn parse_str(self, text: &str) -> Result<Configuration, ConfigError> {
        parse(text, Path::new("<string>"), &schema_defaults(self.cache_dir))
    }
}

fn schema_defaults(cache_dir: Option<PathBuf>) -> SchemaDefaults {
    let cache_dir = cache_dir.unwrap_or_else(cache_home);
    SchemaDefaults {
        sqlite_path: default_database_path(&cache_dir),
    }
}

fn parse(
    text: &str,
    origin: &Path,
    defaults: &SchemaDefaults,
) -> Result<Configuration, ConfigError> {
    let sections = read_str(text).map_err(|source| {
        error!(path = %origin.display(), "could not parse config file: {source}");
        ConfigError::ParseError {
            path: origin.to_path_buf(),
            source,
        }
    })?;

    let configuration = assemble(&sections, defaults).into_result()?;
    validate(configuration)
}

/// Reads the whole file; any failure here aborts the load.
fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(path = %path.display(), "cannot read config file");
            Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            error!(path = %path.display(), "cannot read config file: {e}");
            Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}
