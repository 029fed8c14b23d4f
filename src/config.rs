//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `DIRDEDUPE_*` environment variables
//! 4. CLI flags (applied by the caller through [`Config::apply_overrides`])

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{ClassifyStrategy, FinderConfig, RecordOrder, DEFAULT_WORKERS};
use crate::scanner::DEFAULT_BUFFER_SIZE;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DIRDEDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub workers: usize,
    /// Record order used to pick the original of each duplicate class.
    pub order: RecordOrder,
    /// Classification algorithm.
    pub strategy: ClassifyStrategy,
    /// Read buffer size for hashing, in bytes.
    pub buffer_size: usize,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            order: RecordOrder::Completion,
            strategy: ClassifyStrategy::Pairwise,
            buffer_size: DEFAULT_BUFFER_SIZE,
            progress: true,
        }
    }
}

/// CLI values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workers: Option<usize>,
    pub order: Option<RecordOrder>,
    pub strategy: Option<ClassifyStrategy>,
    pub no_progress: bool,
}

impl Config {
    /// Load the configuration.
    ///
    /// `explicit` must exist when given; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any layer fails
    /// to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(ref path) = file {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Config = figment
            .extract()
            .with_context(|| match file {
                Some(ref p) => format!("Invalid configuration in {}", p.display()),
                None => "Invalid configuration".to_string(),
            })?;
        Ok(config.normalized())
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dirdedupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply CLI overrides.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(order) = overrides.order {
            self.order = order;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if overrides.no_progress {
            self.progress = false;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.workers == 0 {
            log::warn!("workers = 0 is not allowed, using 1");
            self.workers = 1;
        }
        self.buffer_size = self.buffer_size.max(1);
        self
    }

    /// Build the finder configuration (without a progress callback).
    #[must_use]
    pub fn to_finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_order(self.order)
            .with_strategy(self.strategy)
            .with_buffer_size(self.buffer_size)
    }
}
