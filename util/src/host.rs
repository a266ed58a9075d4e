//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "OVR_SW_ROOT";

/// Get the software root directory.
///
/// This is the value of `OVR_SW_ROOT`, or the current working directory if the variable is not
/// set.
pub fn get_ovr_sw_root() -> std::io::Result<PathBuf> {
    match env::var_os(SW_ROOT_ENV_VAR) {
        Some(root) => Ok(PathBuf::from(root)),
        None => env::current_dir()
    }
}
