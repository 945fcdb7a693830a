use tracing::error;

use super::model::Configuration;
use super::ConfigError;

/// Resolves `default.default_calendar` against the assembled calendars.
///
/// An unset value becomes the first calendar's name; a set value must name
/// one of the calendars.
pub fn validate(mut config: Configuration) -> Result<Configuration, ConfigError> {
    match config.default.default_calendar.as_deref() {
        None => {
            config.default.default_calendar =
                config.calendars.first().map(|calendar| calendar.name.clone());
        }
        Some(name) if config.calendar(name).is_some() => {}
        Some(name) => {
            let err = ConfigError::InvalidCalendarReference(name.to_owned());
            error!("{err}");
            return Err(err);
        }
    }

    Ok(config)
}
