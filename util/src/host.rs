//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software installation.
///
/// The root is read from the `STRIDE_SW_ROOT` environment variable, which
/// must point at the checkout containing the `params` and `sessions`
/// directories.
pub fn get_stride_sw_root() -> Result<PathBuf, env::VarError> {
    env::var("STRIDE_SW_ROOT").map(PathBuf::from)
}
