use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::logging::parse_level;

/// A struct containing configuration values derived from environment variables.
///
/// `envy` matches variables case-insensitively against the renamed fields, so `LEVEL`
/// and `BASE_PATH` are the variables read.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ambient log verbosity, as a level name or a number on the 10–50 scale.
    #[serde(rename = "level")]
    pub log_level: Option<String>,
    /// Path prefix stripped from edge request URIs.
    pub base_path: Option<String>,
}

impl Config {
    /// Attempts to read configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    /// The level that applies outside of any per-invocation override. Defaults to debug.
    pub fn ambient_level(&self) -> LevelFilter {
        self.log_level
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(LevelFilter::DEBUG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_level_and_base_path() {
        let config: Config =
            envy::from_iter(vars(&[("LEVEL", "20"), ("BASE_PATH", "/app"), ("HOME", "/root")]))
                .unwrap();
        assert_eq!(config.log_level.as_deref(), Some("20"));
        assert_eq!(config.base_path.as_deref(), Some("/app"));
        assert_eq!(config.ambient_level(), LevelFilter::INFO);
    }

    #[test]
    fn everything_is_optional() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ambient_level(), LevelFilter::DEBUG);
    }
}
