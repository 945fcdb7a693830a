//! Section kinds and the fields each one declares.
//!
//! The set of kinds is closed. A raw section belongs to the first kind in
//! [`REGISTRY`] whose matcher accepts its name; its options are then read
//! field by field, collecting every failure before the section is given up.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use super::coerce;
use super::error::Diagnostic;
use super::ini::RawSection;
use super::model::{CalendarSection, Command, DefaultSection, LocaleSection, SqliteSection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Default,
    Locale,
    Sqlite,
    Calendar,
}

/// Kinds in matching priority order.
pub const REGISTRY: [SectionKind; 4] = [
    SectionKind::Default,
    SectionKind::Locale,
    SectionKind::Sqlite,
    SectionKind::Calendar,
];

/// Kinds that must appear at least once.
pub const REQUIRED: [SectionKind; 3] = [
    SectionKind::Default,
    SectionKind::Locale,
    SectionKind::Calendar,
];

fn calendar_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^calendar (?P<name>.+)$").expect("valid regex"))
}

impl SectionKind {
    /// Name of the group this kind fills in the configuration.
    pub fn group(self) -> &'static str {
        match self {
            SectionKind::Default => "default",
            SectionKind::Locale => "locale",
            SectionKind::Sqlite => "sqlite",
            SectionKind::Calendar => "calendars",
        }
    }

    /// Whether every matching section adds an entry instead of filling one slot.
    pub fn is_collection(self) -> bool {
        matches!(self, SectionKind::Calendar)
    }

    /// Tests `name` against this kind only.
    pub fn matches(self, name: &str) -> Option<SectionMatch> {
        match self {
            SectionKind::Calendar => calendar_pattern().captures(name).map(|captures| {
                SectionMatch {
                    kind: self,
                    calendar: Some(captures["name"].to_owned()),
                }
            }),
            _ if name.to_lowercase() == self.group() => Some(SectionMatch {
                kind: self,
                calendar: None,
            }),
            _ => None,
        }
    }

    /// Finds the owning kind for a section name, first match wins.
    pub fn lookup(name: &str) -> Option<SectionMatch> {
        REGISTRY.into_iter().find_map(|kind| kind.matches(name))
    }
}

/// A section name accepted by a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMatch {
    pub kind: SectionKind,
    /// The identifier captured from `[calendar <name>]`.
    pub calendar: Option<String>,
}

/// Values that are not known until runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefaults {
    pub sqlite_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSection {
    Default(DefaultSection),
    Locale(LocaleSection),
    Sqlite(SqliteSection),
    Calendar(CalendarSection),
}

/// Result of reading one raw section against its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutcome {
    /// `Some` only if `diagnostics` is empty.
    pub parsed: Option<ParsedSection>,
    pub diagnostics: Vec<Diagnostic>,
    /// Every option name looked up, found or not.
    pub consumed: BTreeSet<String>,
}

impl SectionMatch {
    pub fn parse(&self, raw: &RawSection, defaults: &SchemaDefaults) -> SectionOutcome {
        let mut reader = FieldReader::new(raw);
        let parsed = match self.kind {
            SectionKind::Default => parse_default(&mut reader).map(ParsedSection::Default),
            SectionKind::Locale => parse_locale(&mut reader).map(ParsedSection::Locale),
            SectionKind::Sqlite => parse_sqlite(&mut reader, defaults).map(ParsedSection::Sqlite),
            SectionKind::Calendar => {
                let name = self.calendar.clone().unwrap_or_default();
                parse_calendar(&mut reader, name).map(ParsedSection::Calendar)
            }
        };
        reader.finish(parsed)
    }
}

fn parse_default(r: &mut FieldReader) -> Option<DefaultSection> {
    let debug = r.read(FieldSpec::optional("debug", false, coerce::boolean));
    let default_command = r.read(FieldSpec::optional(
        "default_command",
        Command::Calendar,
        coerce::command,
    ));
    let default_calendar = r.read(FieldSpec::optional(
        "default_calendar",
        None,
        coerce::calendar_name,
    ));

    Some(DefaultSection {
        debug: debug?,
        default_command: default_command?,
        default_calendar: default_calendar?,
    })
}

fn parse_locale(r: &mut FieldReader) -> Option<LocaleSection> {
    let local_timezone = r.read(FieldSpec::required("local_timezone", coerce::timezone));
    let default_timezone = r.read(FieldSpec::required("default_timezone", coerce::timezone));
    let timeformat = r.read(FieldSpec::required("timeformat", coerce::string));
    let dateformat = r.read(FieldSpec::required("dateformat", coerce::string));
    let longdateformat = r.read(FieldSpec::required("longdateformat", coerce::string));
    let datetimeformat = r.read(FieldSpec::required("datetimeformat", coerce::string));
    let longdatetimeformat = r.read(FieldSpec::required("longdatetimeformat", coerce::string));
    let firstweekday = r.read(FieldSpec::optional("firstweekday", 0, coerce::integer));
    let encoding = r.read(FieldSpec::optional(
        "encoding",
        "utf-8".to_owned(),
        coerce::string,
    ));
    let unicode_symbols = r.read(FieldSpec::optional("unicode_symbols", true, coerce::boolean));

    Some(LocaleSection {
        local_timezone: local_timezone?,
        default_timezone: default_timezone?,
        timeformat: timeformat?,
        dateformat: dateformat?,
        longdateformat: longdateformat?,
        datetimeformat: datetimeformat?,
        longdatetimeformat: longdatetimeformat?,
        firstweekday: firstweekday?,
        encoding: encoding?,
        unicode_symbols: unicode_symbols?,
    })
}

fn parse_sqlite(r: &mut FieldReader, defaults: &SchemaDefaults) -> Option<SqliteSection> {
    let path = r.read(FieldSpec::optional(
        "path",
        defaults.sqlite_path.clone(),
        coerce::path,
    ));

    Some(SqliteSection { path: path? })
}

fn parse_calendar(r: &mut FieldReader, name: String) -> Option<CalendarSection> {
    let path = r.read(FieldSpec::required("path", coerce::path));
    let readonly = r.read(FieldSpec::optional("readonly", false, coerce::boolean));
    let color = r.read(FieldSpec::optional("color", String::new(), coerce::string));

    Some(CalendarSection {
        name,
        path: path?,
        readonly: readonly?,
        color: color?,
    })
}

/// One declared option: its name, what to use when absent, and how to convert it.
pub(crate) struct FieldSpec<T> {
    option: &'static str,
    /// `None` marks the option as required.
    fallback: Option<T>,
    coerce: fn(&str) -> Result<T, String>,
}

impl<T> FieldSpec<T> {
    pub(crate) fn required(option: &'static str, coerce: fn(&str) -> Result<T, String>) -> Self {
        Self {
            option,
            fallback: None,
            coerce,
        }
    }

    pub(crate) fn optional(
        option: &'static str,
        default: T,
        coerce: fn(&str) -> Result<T, String>,
    ) -> Self {
        Self {
            option,
            fallback: Some(default),
            coerce,
        }
    }
}

/// Reads fields out of a raw section, keeping track of what was consumed and
/// what went wrong.
pub(crate) struct FieldReader<'a> {
    raw: &'a RawSection,
    consumed: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(raw: &'a RawSection) -> Self {
        Self {
            raw,
            consumed: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Returns the field's value, or `None` after recording why it has none.
    pub(crate) fn read<T>(&mut self, field: FieldSpec<T>) -> Option<T> {
        self.consumed.insert(field.option.to_owned());

        let Some(value) = self.raw.get(field.option) else {
            if field.fallback.is_none() {
                self.diagnostics.push(Diagnostic::MissingOption {
                    section: self.raw.name().to_owned(),
                    option: field.option.to_owned(),
                });
            }
            return field.fallback;
        };

        match (field.coerce)(value) {
            Ok(value) => Some(value),
            Err(reason) => {
                self.diagnostics.push(Diagnostic::Coercion {
                    section: self.raw.name().to_owned(),
                    option: field.option.to_owned(),
                    reason,
                });
                None
            }
        }
    }

    pub(crate) fn finish(self, parsed: Option<ParsedSection>) -> SectionOutcome {
        let parsed = if self.diagnostics.is_empty() {
            parsed
        } else {
            None
        };
        SectionOutcome {
            parsed,
            diagnostics: self.diagnostics,
            consumed: self.consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ini::read_str;
    use chrono_tz::Tz;

    fn raw(text: &str) -> RawSection {
        read_str(text).unwrap().remove(0)
    }

    fn defaults() -> SchemaDefaults {
        SchemaDefaults {
            sqlite_path: PathBuf::from("/cache/khal/khal.db"),
        }
    }

    fn parse(text: &str) -> SectionOutcome {
        let raw = raw(text);
        let matched = SectionKind::lookup(raw.name()).unwrap();
        matched.parse(&raw, &defaults())
    }

    #[test]
    fn test_exact_names_match_case_insensitively() {
        assert_eq!(SectionKind::lookup("Default").unwrap().kind, SectionKind::Default);
        assert_eq!(SectionKind::lookup("LOCALE").unwrap().kind, SectionKind::Locale);
        assert_eq!(SectionKind::lookup("sqlite").unwrap().kind, SectionKind::Sqlite);
        assert_eq!(SectionKind::lookup("defaults"), None);
        assert_eq!(SectionKind::lookup("calendars"), None);
    }

    #[test]
    fn test_calendar_captures_name() {
        let matched = SectionKind::lookup("Calendar My Stuff").unwrap();
        assert_eq!(matched.kind, SectionKind::Calendar);
        assert_eq!(matched.calendar.as_deref(), Some("My Stuff"));
        assert!(SectionKind::Calendar.is_collection());
        assert_eq!(SectionKind::lookup("calendar"), None);
    }

    #[test]
    fn test_default_section_fills_defaults() {
        let outcome = parse("[default]\n");
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(
            outcome.parsed,
            Some(ParsedSection::Default(DefaultSection {
                debug: false,
                default_command: Command::Calendar,
                default_calendar: None,
            }))
        );
        assert_eq!(
            outcome.consumed.into_iter().collect::<Vec<_>>(),
            ["debug", "default_calendar", "default_command"]
        );
    }

    #[test]
    fn test_bad_command_fails_section() {
        let outcome = parse("[default]\ndefault_command = list\n");
        assert_eq!(outcome.parsed, None);
        assert!(matches!(
            outcome.diagnostics.as_slice(),
            [Diagnostic::Coercion { option, .. }] if option == "default_command"
        ));
    }

    #[test]
    fn test_locale_collects_every_failure() {
        let outcome = parse("[locale]\nlocal_timezone = Nowhere/Land\nfirstweekday = monday\n");
        assert_eq!(outcome.parsed, None);

        let options: Vec<&str> = outcome
            .diagnostics
            .iter()
            .map(|diagnostic| match diagnostic {
                Diagnostic::MissingOption { option, .. } | Diagnostic::Coercion { option, .. } => {
                    option.as_str()
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            options,
            [
                "local_timezone",
                "default_timezone",
                "timeformat",
                "dateformat",
                "longdateformat",
                "datetimeformat",
                "longdatetimeformat",
                "firstweekday",
            ]
        );
    }

    #[test]
    fn test_locale_complete() {
        let outcome = parse(
            "[locale]
local_timezone = Europe/Berlin
default_timezone = America/New_York
timeformat = %H:%M
dateformat = %d.%m.
longdateformat = %d.%m.%Y
datetimeformat = %d.%m. %H:%M
longdatetimeformat = %d.%m.%Y %H:%M
firstweekday = 6
unicode_symbols = no
",
        );
        let Some(ParsedSection::Locale(locale)) = outcome.parsed else {
            panic!("expected locale, got {:?}", outcome.diagnostics);
        };
        assert_eq!(locale.local_timezone, Tz::Europe__Berlin);
        assert_eq!(locale.default_timezone, Tz::America__New_York);
        assert_eq!(locale.firstweekday, 6);
        assert_eq!(locale.encoding, "utf-8");
        assert!(!locale.unicode_symbols);
    }

    #[test]
    fn test_sqlite_default_path() {
        let outcome = parse("[sqlite]\n");
        assert_eq!(
            outcome.parsed,
            Some(ParsedSection::Sqlite(SqliteSection {
                path: PathBuf::from("/cache/khal/khal.db"),
            }))
        );
    }

    #[test]
    fn test_calendar_requires_path() {
        let outcome = parse("[calendar home]\ncolor = red\n");
        assert_eq!(outcome.parsed, None);
        assert_eq!(
            outcome.diagnostics,
            [Diagnostic::MissingOption {
                section: "calendar home".into(),
                option: "path".into(),
            }]
        );
        assert!(outcome.consumed.contains("color"));
    }

    #[test]
    fn test_calendar_parsed() {
        let outcome = parse("[calendar home]\npath = /tmp/cal\nreadonly = YES\ncolor = dark red\n");
        assert_eq!(
            outcome.parsed,
            Some(ParsedSection::Calendar(CalendarSection {
                name: "home".into(),
                path: PathBuf::from("/tmp/cal"),
                readonly: true,
                color: "dark red".into(),
            }))
        );
    }

    #[test]
    fn test_unknown_options_are_not_consumed() {
        let outcome = parse("[calendar home]\npath = /tmp/cal\nurl = http://example.com\n");
        assert!(outcome.parsed.is_some());
        assert!(!outcome.consumed.contains("url"));
    }
}
