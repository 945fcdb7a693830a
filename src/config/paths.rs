//! Where the config file and the cache live by default.
//!
//! Follows the XDG base directory conventions. Both lookups take the
//! environment as a function so callers (and tests) can supply their own.

use std::path::{Path, PathBuf};

const PRODUCT: &str = "khal";

fn config_file_name() -> String {
    format!("{PRODUCT}.conf")
}

/// Returns the first existing config file from the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_config_file_with(|name| std::env::var(name).ok())
}

/// Search order: `$XDG_CONFIG_HOME`, each of `$XDG_CONFIG_DIRS`, then
/// `~/.khal/khal.conf` and finally `khal.conf` in the working directory.
pub fn find_config_file_with<F>(env: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    candidates(&env).into_iter().find(|path| path.exists())
}

fn candidates<F>(env: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let resource = Path::new(PRODUCT).join(config_file_name());
    let home = home_dir(env);

    let mut dirs = Vec::new();
    if let Some(config_home) = non_empty(env("XDG_CONFIG_HOME"))
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|home| home.join(".config")))
    {
        dirs.push(config_home);
    }
    let config_dirs = non_empty(env("XDG_CONFIG_DIRS")).unwrap_or_else(|| "/etc/xdg".to_owned());
    dirs.extend(
        config_dirs
            .split(':')
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from),
    );

    let mut paths: Vec<PathBuf> = dirs.into_iter().map(|dir| dir.join(&resource)).collect();
    if let Some(home) = &home {
        paths.push(home.join(format!(".{PRODUCT}")).join(config_file_name()));
    }
    paths.push(PathBuf::from(config_file_name()));
    paths
}

/// `$XDG_CACHE_HOME`, falling back to `~/.cache`.
pub fn cache_home() -> PathBuf {
    cache_home_with(|name| std::env::var(name).ok())
}

pub fn cache_home_with<F>(env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(env("XDG_CACHE_HOME"))
        .map(PathBuf::from)
        .or_else(|| home_dir(&env).map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

/// Default location of the event database.
pub fn default_database_path(cache_home: &Path) -> PathBuf {
    cache_home.join(PRODUCT).join(format!("{PRODUCT}.db"))
}

fn home_dir<F>(env: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(env("HOME")).map(PathBuf::from)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_candidate_order() {
        let env = lookup(&[
            ("HOME", "/home/user".into()),
            ("XDG_CONFIG_DIRS", "/etc/xdg:/opt/xdg".into()),
        ]);
        assert_eq!(
            candidates(&env),
            [
                PathBuf::from("/home/user/.config/khal/khal.conf"),
                PathBuf::from("/etc/xdg/khal/khal.conf"),
                PathBuf::from("/opt/xdg/khal/khal.conf"),
                PathBuf::from("/home/user/.khal/khal.conf"),
                PathBuf::from("khal.conf"),
            ]
        );
    }

    #[test]
    fn test_finds_first_existing() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let system = dir.path().join("system");
        fs::create_dir_all(home.join(".khal")).unwrap();
        fs::create_dir_all(system.join("khal")).unwrap();
        fs::write(home.join(".khal/khal.conf"), "").unwrap();
        fs::write(system.join("khal/khal.conf"), "").unwrap();

        let env = lookup(&[
            ("HOME", home.display().to_string()),
            ("XDG_CONFIG_HOME", dir.path().join("nothing").display().to_string()),
            ("XDG_CONFIG_DIRS", system.display().to_string()),
        ]);
        assert_eq!(
            find_config_file_with(env),
            Some(system.join("khal/khal.conf"))
        );
    }

    #[test]
    fn test_cache_home() {
        let env = lookup(&[("HOME", "/home/user".into())]);
        assert_eq!(cache_home_with(env), PathBuf::from("/home/user/.cache"));

        let env = lookup(&[
            ("HOME", "/home/user".into()),
            ("XDG_CACHE_HOME", "/var/cache/user".into()),
        ]);
        assert_eq!(cache_home_with(env), PathBuf::from("/var/cache/user"));
    }

    #[test]
    fn test_default_database_path() {
        assert_eq!(
            default_database_path(Path::new("/home/user/.cache")),
            PathBuf::from("/home/user/.cache/khal/khal.db")
        );
    }
}
