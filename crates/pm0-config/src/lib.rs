//! PM/0 Configuration System
//!
//! Resolves the settings a machine run is created with:
//! - Stack and program capacities
//! - Initial tracing state
//! - Opt-in hardening (strict bounds, per-step invariant checks)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.pm0/config.toml)
//! 2. Project config (./pm0.toml, searched upwards)
//! 3. Environment variables (PM0_*)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use pm0_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! assert!(config.machine.stack_capacity > 0);
//! ```

pub mod file;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Default stack capacity in words
pub const DEFAULT_STACK_CAPACITY: usize = 2048;

/// Default program capacity in instructions
pub const DEFAULT_CODE_CAPACITY: usize = 512;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fully resolved machine settings
///
/// Every field has a concrete value; optional file sections have already been
/// merged over [`MachineConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Number of stack slots
    pub stack_capacity: usize,
    /// Maximum number of instructions a program may hold
    pub code_capacity: usize,
    /// Whether tracing is on when the run starts
    pub trace: bool,
    /// Turn stack overrun and running past the program into fatal errors
    pub strict_bounds: bool,
    /// Run the register consistency check after every step
    pub check_invariants: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            code_capacity: DEFAULT_CODE_CAPACITY,
            trace: true,
            strict_bounds: false,
            check_invariants: false,
        }
    }
}

impl MachineConfig {
    /// Overlay the fields set in a config file section
    pub fn merge(&mut self, section: &file::MachineSection) {
        if let Some(capacity) = section.stack_capacity {
            self.stack_capacity = capacity;
        }
        if let Some(capacity) = section.code_capacity {
            self.code_capacity = capacity;
        }
        if let Some(trace) = section.trace {
            self.trace = trace;
        }
        if let Some(strict) = section.strict_bounds {
            self.strict_bounds = strict;
        }
        if let Some(check) = section.check_invariants {
            self.check_invariants = check;
        }
    }
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Resolved machine settings
    pub machine: MachineConfig,

    /// Directory where pm0.toml was found
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Check if a project config file was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

// Re-export main types
pub use file::{ConfigFile, MachineSection};
pub use loader::ConfigLoader;
