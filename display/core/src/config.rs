//! Configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! overrides.
//!
//! ```toml
//! [timer]
//! tick_interval_ms = 1000
//!
//! [log]
//! max_nodes = 500
//!
//! [books]
//! page_size = 5
//! ```
//!
//! File location: `$AGENT_DISPLAY_CONFIG`, else
//! `$XDG_CONFIG_HOME/agent-display/config.toml`.
//!
//! Environment overrides:
//! - `AGENT_DISPLAY_TICK_MS`: countdown tick interval in ms
//! - `AGENT_DISPLAY_MAX_LOG_NODES`: conversation log cap (0 = unlimited)
//! - `AGENT_DISPLAY_BOOK_PAGE_SIZE`: assumed book page size

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::widgets::DEFAULT_BOOK_PAGE_SIZE;

/// Resolved display configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    /// How often a running countdown is advanced
    pub tick_interval: Duration,
    /// Conversation log cap (0 = unlimited)
    pub max_log_nodes: usize,
    /// Page size assumed for book lists that do not state one
    pub book_page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            max_log_nodes: 0,
            book_page_size: DEFAULT_BOOK_PAGE_SIZE,
        }
    }
}

/// On-disk configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayToml {
    /// `[timer]` table
    pub timer: TimerSection,
    /// `[log]` table
    pub log: LogSection,
    /// `[books]` table
    pub books: BooksSection,
}

/// `[timer]` table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerSection {
    /// Tick interval in milliseconds
    pub tick_interval_ms: Option<u64>,
}

/// `[log]` table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Conversation log cap
    pub max_nodes: Option<usize>,
}

/// `[books]` table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BooksSection {
    /// Book page size
    pub page_size: Option<usize>,
}

impl DisplayToml {
    /// Layer this file over `config`
    pub fn apply(&self, config: &mut DisplayConfig) {
        if let Some(ms) = self.timer.tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(max) = self.log.max_nodes {
            config.max_log_nodes = log_cap(max);
        }
        if let Some(size) = self.books.page_size {
            config.book_page_size = size.max(1);
        }
    }
}

/// Smallest non-zero log cap: one whole turn
pub const MIN_LOG_NODES: usize = 2;

/// Clamp a log cap so a turn never evicts its own user entry (0 = unlimited)
#[must_use]
pub fn log_cap(max: usize) -> usize {
    if max == 0 {
        0
    } else {
        max.max(MIN_LOG_NODES)
    }
}

/// Environment-provided overrides
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `AGENT_DISPLAY_TICK_MS`
    pub tick_interval_ms: Option<u64>,
    /// `AGENT_DISPLAY_MAX_LOG_NODES`
    pub max_log_nodes: Option<usize>,
    /// `AGENT_DISPLAY_BOOK_PAGE_SIZE`
    pub book_page_size: Option<usize>,
}

impl ConfigOverrides {
    /// Read overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for non-numeric values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for non-numeric values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            var: &'static str,
        ) -> Result<Option<T>, ConfigError> {
            match lookup(var) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidEnv { var, value }),
            }
        }

        Ok(Self {
            tick_interval_ms: parse(&lookup, "AGENT_DISPLAY_TICK_MS")?,
            max_log_nodes: parse(&lookup, "AGENT_DISPLAY_MAX_LOG_NODES")?,
            book_page_size: parse(&lookup, "AGENT_DISPLAY_BOOK_PAGE_SIZE")?,
        })
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Layer these overrides over `config`
    pub fn apply(&self, config: &mut DisplayConfig) {
        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(max) = self.max_log_nodes {
            config.max_log_nodes = log_cap(max);
        }
        if let Some(size) = self.book_page_size {
            config.book_page_size = size.max(1);
        }
    }
}

/// Where the resolved configuration came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults only
    Defaults,
    /// A config file (possibly with environment overrides on top)
    File(PathBuf),
    /// Defaults with environment overrides
    Environment,
}

/// Default config file path
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AGENT_DISPLAY_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("agent-display").join("config.toml"))
}

/// Load configuration from a specific file (no environment overrides)
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_from_path(path: &Path) -> Result<DisplayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: DisplayToml = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    let mut config = DisplayConfig::default();
    file.apply(&mut config);
    Ok(config)
}

/// Load configuration from the default file (if present) and environment
///
/// # Errors
///
/// Returns [`ConfigError`] for an unreadable or invalid file, or an invalid
/// environment override. A missing file is not an error.
pub fn load_config() -> Result<(DisplayConfig, ConfigSource), ConfigError> {
    let (mut config, mut source) = match default_config_path() {
        Some(path) if path.exists() => {
            let config = load_config_from_path(&path)?;
            tracing::info!(path = %path.display(), "Loaded display config");
            (config, ConfigSource::File(path))
        }
        _ => (DisplayConfig::default(), ConfigSource::Defaults),
    };

    let overrides = ConfigOverrides::from_env()?;
    if !overrides.is_empty() {
        overrides.apply(&mut config);
        if source == ConfigSource::Defaults {
            source = ConfigSource::Environment;
        }
    }
    Ok((config, source))
}
