use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::DiagnosticLevel;

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["cabinguard.toml", "config/cabinguard.toml"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Resolve cabins through the bulk RBD-by-cabin answer table instead of
    /// per booking code lookups.
    pub rbd_by_cabin_enabled: bool,
    pub diagnostic_level: DiagnosticLevel,
    pub cabin_table_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub rbd_by_cabin_enabled: Option<bool>,
    pub diagnostic_level: Option<DiagnosticLevel>,
    pub cabin_table_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig {
                rbd_by_cabin_enabled: false,
                diagnostic_level: DiagnosticLevel::Off,
                cabin_table_path: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch, path.parent().unwrap_or_else(|| Path::new("")));
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Relative paths in the file resolve against `base`, the file's directory.
    fn apply_patch(&mut self, patch: ConfigPatch, base: &Path) {
        if let Some(validation) = patch.validation {
            if let Some(enabled) = validation.rbd_by_cabin_enabled {
                self.validation.rbd_by_cabin_enabled = enabled;
            }
            if let Some(level) = validation.diagnostic_level {
                self.validation.diagnostic_level = level;
            }
            if let Some(path) = validation.cabin_table_path {
                self.validation.cabin_table_path =
                    Some(if path.is_relative() { base.join(path) } else { path });
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CABINGUARD_VALIDATION_RBD_BY_CABIN_ENABLED") {
            self.validation.rbd_by_cabin_enabled =
                parse_bool("CABINGUARD_VALIDATION_RBD_BY_CABIN_ENABLED", &value)?;
        }
        if let Some(value) = read_env("CABINGUARD_VALIDATION_DIAGNOSTIC_LEVEL") {
            self.validation.diagnostic_level = value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "CABINGUARD_VALIDATION_DIAGNOSTIC_LEVEL".to_string(),
                    value: value.clone(),
                }
            })?;
        }
        if let Some(value) = read_env("CABINGUARD_VALIDATION_CABIN_TABLE_PATH") {
            self.validation.cabin_table_path = Some(PathBuf::from(value));
        }

        let log_level =
            read_env("CABINGUARD_LOGGING_LEVEL").or_else(|| read_env("CABINGUARD_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CABINGUARD_LOGGING_FORMAT").or_else(|| read_env("CABINGUARD_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(enabled) = overrides.rbd_by_cabin_enabled {
            self.validation.rbd_by_cabin_enabled = enabled;
        }
        if let Some(level) = overrides.diagnostic_level {
            self.validation.diagnostic_level = level;
        }
        if let Some(path) = overrides.cabin_table_path {
            self.validation.cabin_table_path = Some(path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_validation(&self.validation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file, either the explicit path or one of the
/// default locations.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_validation(validation: &ValidationConfig) -> Result<(), ConfigError> {
    if let Some(path) = &validation.cabin_table_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "validation.cabin_table_path must not be empty when set".to_string(),
            ));
        }
        let is_toml = path.extension().is_some_and(|extension| extension == "toml");
        if !is_toml {
            return Err(ConfigError::Validation(format!(
                "validation.cabin_table_path must point to a .toml file, got `{}`",
                path.display()
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    validation: Option<ValidationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationPatch {
    rbd_by_cabin_enabled: Option<bool>,
    diagnostic_level: Option<DiagnosticLevel>,
    cabin_table_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
