use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Construction parameters of a [`TimeMachine`].
///
/// Every field is optional when deserializing; missing fields take their [`Default`] values.
///
/// ```
/// use sima::TimeMachineConfig;
///
/// let config: TimeMachineConfig = "speed = 2.5\ncycle_time_ms = 1".parse().unwrap();
/// assert_eq!(2.5, config.speed);
/// assert_eq!(100, config.event_capacity);
/// assert_eq!(1, config.cycle_time_ms);
/// ```
///
/// [`TimeMachine`]: crate::TimeMachine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeMachineConfig {
    /// Ratio of simulation time to real time. Defaults to `1.0`.
    pub speed: f64,
    /// Capacity of the event submission channel. Defaults to `100`.
    pub event_capacity: usize,
    /// Real time between two cycles of the driver loop, in ms. Defaults to `10`.
    pub cycle_time_ms: u64,
}

impl TimeMachineConfig {
    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and [`ConfigError::Parse`] if its contents are not a
    /// valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }
}

impl Default for TimeMachineConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            event_capacity: 100,
            cycle_time_ms: 10,
        }
    }
}

impl FromStr for TimeMachineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// Failure to load a [`TimeMachineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read time machine config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid TOML or has unexpected fields or types.
    #[error("invalid time machine config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: TimeMachineConfig = "".parse().unwrap();
        assert_eq!(TimeMachineConfig::default(), config);
    }

    #[test]
    fn all_fields_parse() {
        let config: TimeMachineConfig = "speed = 0.5\nevent_capacity = 8\ncycle_time_ms = 2".parse().unwrap();
        assert_eq!(
            TimeMachineConfig {
                speed: 0.5,
                event_capacity: 8,
                cycle_time_ms: 2,
            },
            config
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = "speed = 1.0\ntick = 3".parse::<TimeMachineConfig>();
        assert!(matches!(result, Err(ConfigError::Parse(_))), "unexpected result {result:?}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = TimeMachineConfig::load("/nonexistent/sima/config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))), "unexpected result {result:?}");
    }
}
