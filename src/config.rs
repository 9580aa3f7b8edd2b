//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file: `--config <FILE>` if given (it must exist), otherwise
//!    `config.toml` in the platform config directory if present
//! 3. environment variables prefixed with `DUPSWEEP_` (e.g. `DUPSWEEP_IO_THREADS=8`)
//! 4. command-line flags, applied with [`Config::apply_cli`]
//!
//! ```toml
//! io_threads = 2
//! algorithm = "blake3"
//! on_read_error = "skip"
//! report_file = "/tmp/dupes.txt"
//! trash = true
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::actions::{RemovalMode, DEFAULT_REPORT_FILE};
use crate::cli::Cli;
use crate::duplicates::ReadErrorPolicy;
use crate::scanner::HashAlgorithm;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Digest algorithm.
    pub algorithm: HashAlgorithm,
    /// What to do with unreadable files.
    pub on_read_error: ReadErrorPolicy,
    /// Report file for the `file` action.
    pub report_file: PathBuf,
    /// Fixed destination folder name for the `move` action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_folder: Option<String>,
    /// Delete to the system trash instead of permanently.
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            algorithm: HashAlgorithm::default(),
            on_read_error: ReadErrorPolicy::default(),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            move_folder: None,
            trash: false,
        }
    }
}

impl Config {
    /// Load defaults, the TOML file, and the environment.
    ///
    /// # Errors
    ///
    /// Fails if `explicit` is given but missing, or if any layer holds a
    /// value of the wrong type.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(explicit)?
            .extract()
            .context("Invalid configuration")?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The layered figment behind [`Config::load`].
    ///
    /// # Errors
    ///
    /// Fails if `explicit` is given but does not exist.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                log::debug!("Using config file {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Ok(path) = Self::config_path() {
                    if path.is_file() {
                        log::debug!("Using config file {}", path.display());
                        figment = figment.merge(Toml::file(path));
                    }
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Override settings with the flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(policy) = cli.on_read_error {
            self.on_read_error = policy;
        }
        if let Some(ref path) = cli.report_file {
            self.report_file = path.clone();
        }
        if let Some(ref name) = cli.move_folder {
            self.move_folder = Some(name.clone());
        }
        if cli.trash {
            self.trash = true;
        }
    }

    /// Removal mode implied by [`Config::trash`].
    #[must_use]
    pub fn removal_mode(&self) -> RemovalMode {
        if self.trash {
            RemovalMode::Trash
        } else {
            RemovalMode::Permanent
        }
    }

    /// Save the configuration as TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Fails if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupsweep", "dupsweep")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
