//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the environment variable which points at the root of the software
/// installation.
pub const SW_ROOT_ENV_VAR: &str = "GRIP_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software installation.
///
/// The `params` and `sessions` directories are resolved relative to this
/// root.
pub fn get_grip_sw_root() -> Result<PathBuf, env::VarError> {
    Ok(PathBuf::from(env::var(SW_ROOT_ENV_VAR)?))
}
