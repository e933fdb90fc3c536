use std::path::{Path, PathBuf};

use serde::Deserialize;
use sseditor_core::operation::DEFAULT_MAX_UNDO;
use sseditor_core::wrapper::DEFAULT_MODEL_OFFSET;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "sseditor.toml";

/// Editor configuration loaded from `sseditor.toml`.
///
/// Every section and field is optional; missing values take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub session: SessionConfig,
    pub render: RenderConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the demo document.
    pub document: String,
    /// Minimum number of render frames before the session ends.
    pub frames: u64,
    /// Seconds to wait for edits to come back from the render thread.
    pub settle_timeout_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            document: "demo".into(),
            frames: 0,
            settle_timeout_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Render ticks per second.
    pub tick_rate: f64,
    /// Distance past the near plane at which gizmo models are drawn.
    pub model_offset: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            model_offset: DEFAULT_MODEL_OFFSET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub filter: String,
    /// How many warnings and errors to keep for the session summary.
    pub capture: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            capture: 1000,
        }
    }
}

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl EditorConfig {
    /// Parses and validates a TOML document. `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads `explicit` if given. Otherwise loads [`DEFAULT_CONFIG_FILE`]
    /// if it exists, or falls back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok((Self::default(), ConfigSource::Defaults));
                }
                default
            }
        };
        let config = Self::load(&path)?;
        Ok((config, ConfigSource::File(path)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render.tick_rate.is_finite() && self.render.tick_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "render.tick_rate must be positive, got {}",
                self.render.tick_rate
            )));
        }
        if !(self.session.settle_timeout_secs.is_finite() && self.session.settle_timeout_secs > 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "session.settle_timeout_secs must be positive, got {}",
                self.session.settle_timeout_secs
            )));
        }
        if self.render.model_offset < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "render.model_offset must not be negative, got {}",
                self.render.model_offset
            )));
        }
        if self.history.max_undo == 0 {
            return Err(ConfigError::Invalid("history.max_undo must be at least 1".into()));
        }
        Ok(())
    }
}
