//! The validated configuration handed to the rest of the application.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Serialize;

/// The commands `default_command` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Agenda,
    Calendar,
    New,
    Interactive,
    PrintCalendars,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Agenda,
        Command::Calendar,
        Command::New,
        Command::Interactive,
        Command::PrintCalendars,
    ];

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Agenda => "agenda",
            Command::Calendar => "calendar",
            Command::New => "new",
            Command::Interactive => "interactive",
            Command::PrintCalendars => "printcalendars",
        }
    }
}

/// The `[default]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultSection {
    pub debug: bool,
    pub default_command: Command,
    /// `None` until validation fills in the first calendar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_calendar: Option<String>,
}

/// The `[locale]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleSection {
    pub local_timezone: Tz,
    pub default_timezone: Tz,
    pub timeformat: String,
    pub dateformat: String,
    pub longdateformat: String,
    pub datetimeformat: String,
    pub longdatetimeformat: String,
    pub firstweekday: i64,
    pub encoding: String,
    pub unicode_symbols: bool,
}

/// The optional `[sqlite]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqliteSection {
    pub path: PathBuf,
}

/// One `[calendar <name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSection {
    pub name: String,
    pub path: PathBuf,
    pub readonly: bool,
    pub color: String,
}

/// A fully assembled configuration.
///
/// Only produced once every required section is present and every field
/// coerced, so downstream code can read it without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub default: DefaultSection,
    pub locale: LocaleSection,
    pub sqlite: SqliteSection,
    pub calendars: Vec<CalendarSection>,
}

impl Configuration {
    /// Name of the calendar new events go to.
    ///
    /// Falls back to the first calendar if validation has not run yet.
    pub fn default_calendar(&self) -> Option<&str> {
        self.default
            .default_calendar
            .as_deref()
            .or_else(|| self.calendars.first().map(|calendar| calendar.name.as_str()))
    }

    pub fn calendar(&self, name: &str) -> Option<&CalendarSection> {
        self.calendars.iter().find(|calendar| calendar.name == name)
    }

    /// Calendars picked by include (`-a`) and exclude (`-d`) lists.
    ///
    /// With both lists empty every calendar is selected. The lists are not meant
    /// to be combined; if both are given nothing is selected.
    pub fn selected_calendars<'a, S>(
        &'a self,
        include: &'a [S],
        exclude: &'a [S],
    ) -> impl Iterator<Item = &'a CalendarSection> + 'a
    where
        S: AsRef<str>,
    {
        let listed = |list: &[S], name: &str| {
            list.iter()
                .any(|entry| AsRef::<str>::as_ref(entry) == name)
        };

        self.calendars.iter().filter(move |calendar| {
            let name = calendar.name.as_str();
            (listed(include, name) && exclude.is_empty())
                || (!listed(exclude, name) && include.is_empty())
        })
    }

    /// Renders the resolved values, as seen by the program, for logging.
    pub fn render(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
