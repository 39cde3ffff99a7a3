//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::file::ConfigFile;
use crate::{Config, ConfigError, ConfigResult, MachineConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "pm0.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.pm0/config.toml) - lowest priority
/// 2. Project config (./pm0.toml) - overrides global
/// 3. Environment variables (PM0_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads the global config from `path` instead of the home directory
    pub fn with_global_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find pm0.toml, then merges it over the
    /// global config if one exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_file) = self.find_project_config(start_dir)?;
        let global_file = self.load_global_config().unwrap_or_default();

        Ok(Config {
            machine: self.resolve(&global_file, &project_file),
            project_root,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_file = ConfigFile::load_from_file(config_path)?;
        let global_file = self.load_global_config().unwrap_or_default();

        Ok(Config {
            machine: self.resolve(&global_file, &project_file),
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    fn resolve(&self, global: &ConfigFile, project: &ConfigFile) -> MachineConfig {
        let mut machine = MachineConfig::default();
        for file in [global, project] {
            if let Some(section) = &file.machine {
                machine.merge(section);
            }
        }
        apply_env_overrides(&mut machine);
        machine
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(&self, start_dir: &Path) -> ConfigResult<(Option<PathBuf>, ConfigFile)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let config = ConfigFile::load_from_file(&config_path)?;
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ConfigFile::default())),
            }
        }
    }

    /// Load global configuration from ~/.pm0/config.toml
    fn load_global_config(&mut self) -> ConfigResult<ConfigFile> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = Self::global_config_dir()?.join("config.toml");
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        ConfigFile::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.pm0)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".pm0"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply PM0_* environment variable overrides
///
/// `1`, `true` and `yes` (any case) enable a switch; any other value disables it.
fn apply_env_overrides(machine: &mut MachineConfig) {
    if let Some(trace) = env_flag("PM0_TRACE") {
        machine.trace = trace;
    }
    if let Some(strict) = env_flag("PM0_STRICT_BOUNDS") {
        machine.strict_bounds = strict;
    }
    if let Some(check) = env_flag("PM0_CHECK_INVARIANTS") {
        machine.check_invariants = check;
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
}
