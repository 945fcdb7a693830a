//! Conversions from raw option strings to typed values.
//!
//! Every coercion returns the reason as a plain string on failure; the caller
//! attaches the section and option names.

use std::path::PathBuf;

use chrono_tz::Tz;

use super::expand::expand_path;
use super::model::Command;

/// Lenient boolean: `true`, `yes` and `1` (any case) are true, anything else false.
pub fn boolean(value: &str) -> Result<bool, String> {
    let value = value.trim().to_lowercase();
    Ok(matches!(value.as_str(), "true" | "yes" | "1"))
}

pub fn command(value: &str) -> Result<Command, String> {
    Command::from_name(value).ok_or_else(|| {
        format!(
            "'{value}' is not one of {}",
            Command::ALL.map(Command::as_str).join(", ")
        )
    })
}

pub fn timezone(value: &str) -> Result<Tz, String> {
    Tz::from_str_insensitive(value).map_err(|_| format!("unknown timezone '{value}'"))
}

pub fn integer(value: &str) -> Result<i64, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("'{value}' is not an integer: {e}"))
}

pub fn path(value: &str) -> Result<PathBuf, String> {
    Ok(expand_path(value))
}

pub fn string(value: &str) -> Result<String, String> {
    Ok(value.to_owned())
}

/// A calendar reference; absence is represented by the field's `None` default.
pub fn calendar_name(value: &str) -> Result<Option<String>, String> {
    Ok(Some(value.to_owned()))
}
