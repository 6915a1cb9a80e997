//! Catalog path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → built-in preset.

use std::path::{Path, PathBuf};

/// Where the active catalog came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/vet-triage/.
    SystemConfig,

    /// Using a built-in preset.
    #[default]
    BuiltinPreset,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::CliArgument => write!(f, "CLI argument"),
            CatalogSource::Environment => write!(f, "environment variable"),
            CatalogSource::XdgConfig => write!(f, "XDG config"),
            CatalogSource::SystemConfig => write!(f, "system config"),
            CatalogSource::BuiltinPreset => write!(f, "builtin preset"),
        }
    }
}

/// Result of catalog path discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPath {
    /// Path to catalog.json, or None when the built-in preset applies.
    pub path: Option<PathBuf>,
    pub source: CatalogSource,
}

/// Environment variable names.
pub const ENV_CATALOG_PATH: &str = "VET_TRIAGE_CATALOG";
pub const ENV_CONFIG_DIR: &str = "VET_TRIAGE_CONFIG_DIR";

/// Standard catalog file name.
pub const CATALOG_FILENAME: &str = "catalog.json";

/// Application name for XDG directories.
const APP_NAME: &str = "vet-triage";

/// Resolve the catalog path using the standard resolution order.
///
/// 1. Explicit CLI path (always taken, so a missing file surfaces as a load error)
/// 2. `VET_TRIAGE_CATALOG`
/// 3. `VET_TRIAGE_CONFIG_DIR` + `catalog.json`
/// 4. XDG config directory (`~/.config/vet-triage/`)
/// 5. System config (`/etc/vet-triage/`)
/// 6. Built-in preset (None)
pub fn resolve_catalog(cli_path: Option<&Path>) -> CatalogPath {
    resolve_catalog_with(
        cli_path,
        |name| std::env::var(name).ok(),
        xdg_config_dir(),
        system_config_dir(),
    )
}

fn resolve_catalog_with(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    xdg_dir: Option<PathBuf>,
    system_dir: PathBuf,
) -> CatalogPath {
    if let Some(path) = cli_path {
        return CatalogPath {
            path: Some(path.to_path_buf()),
            source: CatalogSource::CliArgument,
        };
    }

    if let Some(env_path) = env(ENV_CATALOG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return CatalogPath {
                path: Some(path),
                source: CatalogSource::Environment,
            };
        }
    }

    if let Some(config_dir) = env(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CATALOG_FILENAME);
        if path.exists() {
            return CatalogPath {
                path: Some(path),
                source: CatalogSource::Environment,
            };
        }
    }

    if let Some(xdg) = xdg_dir {
        let path = xdg.join(CATALOG_FILENAME);
        if path.exists() {
            return CatalogPath {
                path: Some(path),
                source: CatalogSource::XdgConfig,
            };
        }
    }

    let system_path = system_dir.join(CATALOG_FILENAME);
    if system_path.exists() {
        return CatalogPath {
            path: Some(system_path),
            source: CatalogSource::SystemConfig,
        };
    }

    CatalogPath::default()
}

/// Get the XDG config directory for vet-triage.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
