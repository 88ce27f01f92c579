//! Per-user file locations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Application directory name under the XDG base directories.
const APP_DIR_NAME: &str = "marquee";

/// Which XDG base directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
    Config,
    /// `$XDG_DATA_HOME`, falling back to `~/.local/share`.
    Data,
}

impl AppDir {
    const fn env_var(self) -> &'static str {
        match self {
            Self::Config => "XDG_CONFIG_HOME",
            Self::Data => "XDG_DATA_HOME",
        }
    }

    fn home_fallback(self, home: &Path) -> PathBuf {
        match self {
            Self::Config => home.join(".config"),
            Self::Data => home.join(".local").join("share"),
        }
    }
}

/// Resolves `file_name` inside the user's marquee directory.
///
/// - If `dir` is `Some`, returns `{dir}/{file_name}` for every kind of file.
/// - Otherwise returns `{base}/marquee/{file_name}`, where `base` comes from
///   the XDG variable for `kind` when set to an absolute path, else from `HOME`.
///
/// # Errors
///
/// Returns an error if neither `dir`, the XDG variable, nor `HOME` is usable.
pub fn resolve_app_file(dir: Option<&PathBuf>, kind: AppDir, file_name: &str) -> Result<PathBuf> {
    resolve_with(dir, kind, file_name, |name| std::env::var_os(name))
}

fn resolve_with(
    dir: Option<&PathBuf>,
    kind: AppDir,
    file_name: &str,
    lookup: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(file_name));
    }

    let xdg = lookup(kind.env_var())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute());
    let base = match xdg {
        Some(base) => base,
        None => {
            let home = lookup("HOME").context("HOME environment variable is not set")?;
            kind.home_fallback(Path::new(&home))
        }
    };
    Ok(base.join(APP_DIR_NAME).join(file_name))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect();
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| OsString::from(v))
        }
    }

    #[test]
    fn test_dir_override_wins() {
        // Arrange
        let dir = PathBuf::from("/tmp/marquee-profile");

        // Act
        let config = resolve_with(Some(&dir), AppDir::Config, "config.toml", env(&[])).unwrap();
        let data = resolve_with(Some(&dir), AppDir::Data, "marquee.db", env(&[])).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/tmp/marquee-profile/config.toml"));
        assert_eq!(data, PathBuf::from("/tmp/marquee-profile/marquee.db"));
    }

    #[test]
    fn test_home_fallbacks() {
        // Arrange
        let lookup = env(&[("HOME", "/home/ana")]);

        // Act
        let config = resolve_with(None, AppDir::Config, "config.toml", &lookup).unwrap();
        let data = resolve_with(None, AppDir::Data, "marquee.db", &lookup).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/home/ana/.config/marquee/config.toml"));
        assert_eq!(data, PathBuf::from("/home/ana/.local/share/marquee/marquee.db"));
    }

    #[test]
    fn test_xdg_base_overrides_home() {
        // Arrange
        let lookup = env(&[("HOME", "/home/ana"), ("XDG_DATA_HOME", "/srv/data")]);

        // Act
        let data = resolve_with(None, AppDir::Data, "marquee.db", &lookup).unwrap();
        let config = resolve_with(None, AppDir::Config, "config.toml", &lookup).unwrap();

        // Assert
        assert_eq!(data, PathBuf::from("/srv/data/marquee/marquee.db"));
        assert_eq!(config, PathBuf::from("/home/ana/.config/marquee/config.toml"));
    }

    #[test]
    fn test_relative_xdg_base_is_ignored() {
        // Arrange
        let lookup = env(&[("HOME", "/home/ana"), ("XDG_CONFIG_HOME", "relative/cfg")]);

        // Act
        let config = resolve_with(None, AppDir::Config, "config.toml", lookup).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/home/ana/.config/marquee/config.toml"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        // Arrange & Act
        let result = resolve_with(None, AppDir::Data, "marquee.db", env(&[]));

        // Assert
        assert!(result.is_err());
    }
}
