//! Machine settings for one invocation
//!
//! Resolution order, lowest first: built-in defaults, `~/.pm0/config.toml`,
//! the project `pm0.toml` (or `--config`), `PM0_*` environment variables,
//! command-line flags.

use anyhow::{Context, Result};
use pm0_config::{ConfigLoader, MachineConfig};
use std::env;
use std::path::Path;
use tracing::debug;

/// Switches given on the command line
///
/// Flags only ever turn a behavior on (or tracing off); an absent flag keeps
/// whatever the configuration chose.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub no_trace: bool,
    pub strict_bounds: bool,
    pub check_invariants: bool,
}

impl Overrides {
    pub fn apply(&self, machine: &mut MachineConfig) {
        if self.no_trace {
            machine.trace = false;
        }
        if self.strict_bounds {
            machine.strict_bounds = true;
        }
        if self.check_invariants {
            machine.check_invariants = true;
        }
    }
}

/// Load configuration files and apply command-line overrides
pub fn resolve(explicit: Option<&Path>, overrides: &Overrides) -> Result<MachineConfig> {
    let mut loader = ConfigLoader::new();

    let config = match explicit {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let cwd = env::current_dir().context("Failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load project configuration")?
        }
    };

    if let Some(root) = &config.project_root {
        debug!(project_root = %root.display(), "using project configuration");
    }

    let mut machine = config.machine;
    overrides.apply(&mut machine);
    Ok(machine)
}
