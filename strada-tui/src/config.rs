use std::path::PathBuf;

use anyhow::{Result, bail};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use strada_core::{DEFAULT_MAX_DISTANCE_METERS, DEFAULT_WARNING_DAYS, ExclusionRule};
use strada_provider_florence::DatasetSource;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Settings {
    #[serde(default)]
    pub dataset: DatasetConfig,
    pub matching: MatchingConfig,
    pub reminders: ReminderConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DatasetConfig {
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

impl DatasetConfig {
    /// A local file wins over a URL when both are configured.
    pub(crate) fn source(&self) -> Result<DatasetSource> {
        match (&self.path, &self.url) {
            (Some(path), _) => Ok(DatasetSource::File(path.clone())),
            (None, Some(url)) => Ok(DatasetSource::Url(url.clone())),
            (None, None) => bail!("no dataset configured: set dataset.url or dataset.path"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MatchingConfig {
    pub max_distance_meters: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReminderConfig {
    pub warning_days_advance: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

impl Settings {
    /// Builder pre-filled with the default of every optional setting.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("matching.max_distance_meters", DEFAULT_MAX_DISTANCE_METERS)?
            .set_default("reminders.warning_days_advance", DEFAULT_WARNING_DAYS)?
            .set_default("logging.level", "info")?
            .set_default("logging.file", "strada.log")
    }

    /// Loads `strada.toml` (optional) and `STRADA_*` environment variables.
    /// Environment variables take precedence over the file.
    pub(crate) fn load() -> Result<Self> {
        Ok(Self::defaults()?
            .add_source(File::with_name("strada").required(false))
            .add_source(
                Environment::with_prefix("STRADA")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// Loads configuration from `.env`, the config file and the environment.
pub(crate) fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use config::FileFormat;

    use super::*;

    #[test]
    fn local_file_takes_precedence_over_url() {
        let dataset = DatasetConfig {
            url: Some("https://example.org/pulizia.kml".to_owned()),
            path: Some(PathBuf::from("pulizia.kml")),
        };

        assert_eq!(
            dataset.source().expect("dataset configured"),
            DatasetSource::File(PathBuf::from("pulizia.kml"))
        );
    }

    #[test]
    fn missing_dataset_is_an_error() {
        assert!(DatasetConfig::default().source().is_err());
    }

    fn from_toml(document: &str) -> Settings {
        Settings::defaults()
            .expect("defaults")
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()
            .and_then(|config| config.try_deserialize::<Settings>())
            .expect("valid settings")
    }

    #[test]
    fn toml_settings_with_defaults() {
        let settings = from_toml(
            r#"
            favorites = ["via dei servi"]

            [dataset]
            url = "https://example.org/pulizia.kml"

            [[exclusions]]
            street_name = "VIA TORNABUONI"
            weekday = "Mon"
            "#,
        );

        assert_eq!(settings.favorites, vec!["via dei servi".to_owned()]);
        assert_eq!(settings.reminders.warning_days_advance, DEFAULT_WARNING_DAYS);
        assert!(
            (settings.matching.max_distance_meters - DEFAULT_MAX_DISTANCE_METERS).abs()
                < f64::EPSILON
        );
        assert_eq!(settings.logging.file, PathBuf::from("strada.log"));
        assert_eq!(settings.exclusions.len(), 1);
        assert_eq!(
            settings.exclusions.first().map(|rule| rule.weekday),
            Some(Weekday::Mon)
        );
    }

    #[test]
    fn configured_values_override_defaults() {
        let settings = from_toml(
            r#"
            [matching]
            max_distance_meters = 35.5

            [reminders]
            warning_days_advance = 4
            "#,
        );

        assert_eq!(settings.reminders.warning_days_advance, 4);
        assert!((settings.matching.max_distance_meters - 35.5).abs() < f64::EPSILON);
    }

    #[test]
    fn exclusions_accept_dataset_day_codes() {
        let settings = from_toml(
            r#"
            [[exclusions]]
            street_name = "VIA DEI SERVI"
            day_code = "GI"
            reason = "moved to the other side"
            "#,
        );

        assert_eq!(
            settings.exclusions.first().map(|rule| rule.weekday),
            Some(Weekday::Thu)
        );
    }
}
