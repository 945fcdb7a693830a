//! Turns raw sections into a [`Configuration`].
//!
//! Every section is visited even after a failure so that one run reports all
//! problems in the file. Nothing is returned unless the whole file is valid.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, error, warn, Level};

use super::error::{ConfigError, Diagnostic, Diagnostics, Warning};
use super::ini::RawSection;
use super::model::{CalendarSection, Configuration, DefaultSection, LocaleSection, SqliteSection};
use super::schema::{ParsedSection, SchemaDefaults, SectionKind, REQUIRED};

/// Everything learned from one pass over the raw sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// Present only when `errors` is empty.
    pub configuration: Option<Configuration>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Warning>,
}

impl Assembly {
    pub fn into_result(self) -> Result<Configuration, ConfigError> {
        match self.configuration {
            Some(configuration) if self.errors.is_empty() => Ok(configuration),
            _ => Err(ConfigError::Invalid(Diagnostics(self.errors))),
        }
    }
}

/// Groups collected so far; non-collection groups hold at most one value.
#[derive(Debug, Default, Serialize)]
struct Groups {
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<DefaultSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<LocaleSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sqlite: Option<SqliteSection>,
    calendars: Vec<CalendarSection>,
}

impl Groups {
    fn has(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Default => self.default.is_some(),
            SectionKind::Locale => self.locale.is_some(),
            SectionKind::Sqlite => self.sqlite.is_some(),
            SectionKind::Calendar => !self.calendars.is_empty(),
        }
    }

    fn store(&mut self, parsed: ParsedSection) {
        match parsed {
            ParsedSection::Default(section) => self.default = Some(section),
            ParsedSection::Locale(section) => self.locale = Some(section),
            ParsedSection::Sqlite(section) => self.sqlite = Some(section),
            ParsedSection::Calendar(section) => self.calendars.push(section),
        }
    }
}

pub fn assemble(sections: &[RawSection], defaults: &SchemaDefaults) -> Assembly {
    let mut groups = Groups::default();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut consumed: Vec<BTreeSet<String>> = Vec::with_capacity(sections.len());
    let mut seen = HashSet::new();

    for raw in sections {
        let Some(matched) = SectionKind::lookup(raw.name()) else {
            let warning = Warning::UnknownSection(raw.name().to_owned());
            warn!(line = raw.line(), "{warning}");
            warnings.push(warning);
            consumed.push(BTreeSet::new());
            continue;
        };

        let outcome = matched.parse(raw, defaults);
        consumed.push(outcome.consumed);

        // Calendars are keyed by name, other kinds by group.
        let key = match &matched.calendar {
            Some(name) => format!("calendar {name}"),
            None => matched.kind.group().to_owned(),
        };
        let duplicate = !seen.insert(key);
        if duplicate {
            let diagnostic = Diagnostic::DuplicateSection(raw.name().to_owned());
            error!(line = raw.line(), "{diagnostic}");
            errors.push(diagnostic);
        }

        for diagnostic in outcome.diagnostics {
            error!(line = raw.line(), "{diagnostic}");
            errors.push(diagnostic);
        }

        if let Some(parsed) = outcome.parsed {
            if !duplicate {
                groups.store(parsed);
            }
        }
    }

    for kind in REQUIRED {
        if !groups.has(kind) {
            let diagnostic = Diagnostic::MissingSection(kind.group().to_owned());
            error!("{diagnostic}");
            errors.push(diagnostic);
        }
    }

    for (raw, consumed) in sections.iter().zip(&consumed) {
        for (option, _) in raw.options() {
            if !consumed.contains(option) {
                let warning = Warning::UnknownOption {
                    section: raw.name().to_owned(),
                    option: option.clone(),
                };
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    dump(&groups);

    let configuration = match groups {
        Groups {
            default: Some(default),
            locale: Some(locale),
            sqlite,
            calendars,
        } if errors.is_empty() => Some(Configuration {
            default,
            locale,
            sqlite: sqlite.unwrap_or_else(|| SqliteSection {
                path: defaults.sqlite_path.clone(),
            }),
            calendars,
        }),
        _ => None,
    };

    Assembly {
        configuration,
        errors,
        warnings,
    }
}

/// Logs the values exactly as the program will see them.
fn dump(groups: &Groups) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match toml::to_string_pretty(groups) {
        Ok(rendered) => debug!("Using configuration:\n{rendered}"),
        Err(e) => debug!("Using configuration: {groups:?} ({e})"),
    }
}
