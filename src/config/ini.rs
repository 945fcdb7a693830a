//! Line-oriented reader for `[section]` / `key = value` files.
//!
//! This is deliberately small: comments start a line with `#` or `;`, option
//! names are folded to lowercase, values are trimmed, and an indented line
//! directly below an option continues its value.

use thiserror::Error;

/// One `[header]` block of the file, in the order it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    name: String,
    line: usize,
    options: Vec<(String, String)>,
}

impl RawSection {
    #[must_use]
    pub(crate) fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line of the section header, 1-based.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Looks up an option, ignoring the case of `option`.
    #[must_use]
    pub fn get(&self, option: &str) -> Option<&str> {
        let option = option.to_lowercase();
        self.options
            .iter()
            .find(|(key, _)| *key == option)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn push(&mut self, option: String, value: String) {
        self.options.push((option, value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("line {line}: option found before any section header")]
    MissingSectionHeader { line: usize },

    #[error("line {line}: unterminated section header")]
    UnterminatedHeader { line: usize },

    #[error("line {line}: section name cannot be empty")]
    EmptySectionName { line: usize },

    #[error("line {line}: unexpected text after section header")]
    TrailingText { line: usize },

    #[error("line {line}: expected 'key = value'")]
    MissingDelimiter { line: usize },

    #[error("line {line}: option name cannot be empty")]
    EmptyOptionName { line: usize },

    #[error("line {line}: option '{option}' already set in section '{section}'")]
    DuplicateOption {
        line: usize,
        section: String,
        option: String,
    },
}

/// Reads every section of `text`, in file order.
pub fn read_str(text: &str) -> Result<Vec<RawSection>, SyntaxError> {
    Reader::default().read(text.strip_prefix('\u{feff}').unwrap_or(text))
}

#[derive(Debug, Default)]
struct Reader {
    sections: Vec<RawSection>,
    // Whether the previous line was an option, so indented lines continue it.
    continuing: bool,
}

impl Reader {
    fn read(mut self, text: &str) -> Result<Vec<RawSection>, SyntaxError> {
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                self.continuing = false;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            if self.continuing && raw.starts_with(char::is_whitespace) {
                self.continue_value(trimmed);
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = parse_header(header, line)?;
                self.sections.push(RawSection::new(name, line));
                self.continuing = false;
            } else {
                self.parse_option(trimmed, line)?;
                self.continuing = true;
            }
        }

        Ok(self.sections)
    }

    fn parse_option(&mut self, text: &str, line: usize) -> Result<(), SyntaxError> {
        let section = self
            .sections
            .last_mut()
            .ok_or(SyntaxError::MissingSectionHeader { line })?;

        let split = text
            .find(|c: char| c == '=' || c == ':')
            .ok_or(SyntaxError::MissingDelimiter { line })?;
        let option = text[..split].trim().to_lowercase();
        let value = text[split + 1..].trim().to_owned();

        if option.is_empty() {
            return Err(SyntaxError::EmptyOptionName { line });
        }
        if section.options.iter().any(|(key, _)| *key == option) {
            return Err(SyntaxError::DuplicateOption {
                line,
                section: section.name.clone(),
                option,
            });
        }

        section.push(option, value);
        Ok(())
    }

    fn continue_value(&mut self, text: &str) {
        if let Some((_, value)) = self
            .sections
            .last_mut()
            .and_then(|section| section.options.last_mut())
        {
            value.push('\n');
            value.push_str(text);
        }
    }
}

/// Parses the remainder of a header line after its opening `[`.
fn parse_header(header: &str, line: usize) -> Result<String, SyntaxError> {
    let close = header
        .rfind(']')
        .ok_or(SyntaxError::UnterminatedHeader { line })?;

    let trailing = header[close + 1..].trim_start();
    if !(trailing.is_empty() || trailing.starts_with('#') || trailing.starts_with(';')) {
        return Err(SyntaxError::TrailingText { line });
    }

    let name = header[..close].trim();
    if name.is_empty() {
        return Err(SyntaxError::EmptySectionName { line });
    }

    Ok(name.to_owned())
}
