//! Configuration files (pm0.toml, ~/.pm0/config.toml)
//!
//! Both files share one schema: a single optional `[machine]` table.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Contents of a pm0 configuration file
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Machine settings
    pub machine: Option<MachineSection>,
}

/// `[machine]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MachineSection {
    /// Stack capacity in words (default: 2048)
    pub stack_capacity: Option<usize>,

    /// Program capacity in instructions (default: 512)
    pub code_capacity: Option<usize>,

    /// Start with tracing enabled (default: true)
    pub trace: Option<bool>,

    /// Fatal stack overrun and program-end guard (default: false)
    pub strict_bounds: Option<bool>,

    /// Check register invariants after every step (default: false)
    pub check_invariants: Option<bool>,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        let Some(machine) = &self.machine else {
            return Ok(());
        };

        if machine.stack_capacity == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "machine.stack_capacity".to_string(),
                reason: "capacity must be at least 1".to_string(),
            });
        }

        // Capacity 1 could never hold a program: loading stops with an error at
        // the first accepted instruction.
        if matches!(machine.code_capacity, Some(0) | Some(1)) {
            return Err(ConfigError::InvalidValue {
                field: "machine.code_capacity".to_string(),
                reason: "capacity must be at least 2".to_string(),
            });
        }

        Ok(())
    }
}
