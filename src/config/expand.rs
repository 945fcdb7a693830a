//! Environment and home-directory expansion for path values.
//!
//! Supports `$NAME` and `${NAME}` references; references to unset variables are
//! kept literally. A leading `~` or `~/` is replaced by `HOME` afterwards.

use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

/// Expands `value` using the process environment.
pub fn expand_path(value: &str) -> PathBuf {
    expand_path_with(value, |name| std::env::var(name).ok())
}

/// Expands `value`, resolving variables through `lookup`.
pub fn expand_path_with<F>(value: &str, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = expand_vars(value, &lookup);
    PathBuf::from(expand_user(&expanded, &lookup))
}

fn expand_vars<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('{') => {
                chars.next();
                match consume_braced(&mut chars) {
                    Ok(name) => match lookup(&name) {
                        Some(resolved) => result.push_str(&resolved),
                        None => {
                            result.push_str("${");
                            result.push_str(&name);
                            result.push('}');
                        }
                    },
                    Err(partial) => {
                        result.push_str("${");
                        result.push_str(&partial);
                    }
                }
            }
            Some(&next) if is_name_char(next) => {
                let name = consume_name(&mut chars);
                match lookup(&name) {
                    Some(resolved) => result.push_str(&resolved),
                    None => {
                        result.push('$');
                        result.push_str(&name);
                    }
                }
            }
            _ => result.push('$'),
        }
    }

    result
}

fn expand_user<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let Some(rest) = value.strip_prefix('~') else {
        return value.to_owned();
    };
    // `~user` forms are left untouched.
    if !(rest.is_empty() || rest.starts_with('/')) {
        return value.to_owned();
    }
    let Some(home) = lookup("HOME") else {
        return value.to_owned();
    };

    let home = home.trim_end_matches('/');
    if home.is_empty() && rest.is_empty() {
        return "/".to_owned();
    }
    format!("{home}{rest}")
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn consume_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(&ch) = chars.peek() {
        if !is_name_char(ch) {
            break;
        }
        name.push(ch);
        chars.next();
    }
    name
}

/// Consumes up to the closing `}`, or returns what was read if it never comes.
fn consume_braced(chars: &mut Peekable<Chars>) -> Result<String, String> {
    let mut name = String::new();
    for ch in chars.by_ref() {
        if ch == '}' {
            return Ok(name);
        }
        name.push(ch);
    }
    Err(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/user".into()),
            "CALDIR" => Some("/srv/calendars".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn test_plain_path_unchanged() {
        assert_eq!(expand_path_with("/tmp/cal", env), PathBuf::from("/tmp/cal"));
    }

    #[test]
    fn test_tilde() {
        assert_eq!(
            expand_path_with("~/.calendars/home", env),
            PathBuf::from("/home/user/.calendars/home")
        );
        assert_eq!(expand_path_with("~", env), PathBuf::from("/home/user"));
    }

    #[test]
    fn test_tilde_user_left_alone() {
        assert_eq!(expand_path_with("~bob/cal", env), PathBuf::from("~bob/cal"));
    }

    #[test]
    fn test_tilde_in_middle_left_alone() {
        assert_eq!(expand_path_with("/a/~/b", env), PathBuf::from("/a/~/b"));
    }

    #[test]
    fn test_bare_and_braced_variables() {
        assert_eq!(
            expand_path_with("$CALDIR/home", env),
            PathBuf::from("/srv/calendars/home")
        );
        assert_eq!(
            expand_path_with("${CALDIR}_old", env),
            PathBuf::from("/srv/calendars_old")
        );
    }

    #[test]
    fn test_unknown_variable_kept() {
        assert_eq!(
            expand_path_with("$NOPE/${ALSO_NOPE}/x", env),
            PathBuf::from("$NOPE/${ALSO_NOPE}/x")
        );
    }

    #[test]
    fn test_lone_dollar_and_unclosed_brace() {
        assert_eq!(expand_path_with("/a$/b", env), PathBuf::from("/a$/b"));
        assert_eq!(expand_path_with("/a/${CALDIR", env), PathBuf::from("/a/${CALDIR"));
    }

    #[test]
    fn test_variable_then_tilde() {
        let lookup = |name: &str| match name {
            "CAL" => Some("~/cal".to_owned()),
            other => env(other),
        };
        assert_eq!(
            expand_path_with("$CAL", lookup),
            PathBuf::from("/home/user/cal")
        );
    }

    #[test]
    fn test_empty_variable_expands_to_nothing() {
        assert_eq!(expand_path_with("/a$EMPTY/b", env), PathBuf::from("/a/b"));
    }
}
