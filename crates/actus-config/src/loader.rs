//! Layered loading of [`ActusConfig`].
//!
//! A preset is replaced wholesale by a config file, if any; prefixed
//! environment variables then override single fields.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{ActusConfig, ConfigError, LogFormat};

/// Builds an [`ActusConfig`] from a preset, a file and the environment.
///
/// Environment overrides are applied in [`load`](Self::load), after every
/// other layer, so call order only matters between presets and files.
///
/// # Example
///
/// ```no_run
/// use actus_config::ConfigLoader;
///
/// # fn main() -> Result<(), actus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("actus.toml")?
///     .with_env_prefix("ACTUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ActusConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader holding the default config and no env prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ActusConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Resets to [`ActusConfig::default`].
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ActusConfig::default();
        self
    }

    /// Resets to [`ActusConfig::development`].
    ///
    /// # Example
    ///
    /// ```
    /// use actus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ActusConfig::development();
        self
    }

    /// Resets to [`ActusConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ActusConfig::production();
        self
    }

    /// Replaces the config with the contents of `path`.
    ///
    /// `.toml` and `.json` are accepted; sections missing from the file take
    /// their defaults, not the values of an earlier preset.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Read`, `UnsupportedFormat`, or a `Toml`/`Json` error for
    /// malformed content and unknown keys.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        self.file_loaded = true;

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Same as `with_file` once the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use actus_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [actions]
    ///     log_validation_failures = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.actions.log_validation_failures);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Reads `PREFIX__SECTION__KEY` variables in [`load`](Self::load).
    ///
    /// With prefix `ACTUS`:
    /// - `ACTUS__LOGGING__LEVEL=debug`
    /// - `ACTUS__FORMS__MAX_DEPTH=8`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory, if present.
    ///
    /// # Errors
    ///
    /// Never fails today; a missing file is ignored.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Whether a configuration file was loaded.
    #[must_use]
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Applies environment overrides, then validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<ActusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Returns the current layers as-is, skipping env and validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ActusConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<ActusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_var(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["LOGGING", "ENABLED"] => self.config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = LogFormat::parse(value).ok_or_else(|| {
                    ConfigError::env_var(key, "expected 'json' or 'pretty'")
                })?;
            }
            ["LOGGING", "SPAN_EVENTS"] => {
                self.config.logging.span_events = parse_flag(key, value)?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_flag(key, value)?;
            }

            ["METRICS", "ENABLED"] => self.config.metrics.enabled = parse_flag(key, value)?,
            ["METRICS", "DURATION_BUCKETS"] => {
                self.config.metrics.duration_buckets = value
                    .split(',')
                    .map(|b| parse_number(key, b.trim(), "expected comma-separated floats"))
                    .collect::<Result<_, _>>()?;
            }

            ["ACTIONS", "LOG_VALIDATION_FAILURES"] => {
                self.config.actions.log_validation_failures = parse_flag(key, value)?;
            }
            ["ACTIONS", "RECORD_METRICS"] => {
                self.config.actions.record_metrics = parse_flag(key, value)?;
            }

            ["FORMS", "MAX_DEPTH"] => {
                self.config.forms.max_depth = parse_number(key, value, "expected integer")?;
            }
            ["FORMS", "MAX_INDEX"] => {
                self.config.forms.max_index = parse_number(key, value, "expected integer")?;
            }

            // Unknown keys are left for other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_var(key, "expected boolean"))
}

fn parse_number<T: FromStr>(key: &str, value: &str, reason: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_var(key, reason))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
