//! Config file location.

use std::path::PathBuf;

use anyhow::Result;
use marquee_db::{AppDir, resolve_app_file};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves the config file path: `{dir}/config.toml` when `dir` is given,
/// otherwise `config.toml` under the XDG config directory
/// (`~/.config/marquee/` by default).
///
/// # Errors
///
/// Returns an error if no config directory can be determined.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_app_file(dir, AppDir::Config, CONFIG_FILE_NAME)
}
