//! Catalog loading for vt-core.
//!
//! This module handles:
//! - Catalog resolution order (CLI > env > XDG > /etc > preset)
//! - Parsing and semantic validation with the offending path attached
//! - Authoring lints, surfaced as warnings
//! - Catalog snapshots for log correlation

pub use vt_config::preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use vt_config::validate::ValidationError;
pub use vt_config::{Catalog, CatalogDocument, CatalogLint, CatalogSnapshot, CatalogSource};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use vt_config::resolve::{resolve_catalog, CatalogPath};
use vt_config::validate::lint_catalog;

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Catalog file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Catalog {path} failed validation: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to snapshot catalog: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl ConfigError {
    /// Whether the failure is an I/O problem rather than bad catalog content.
    pub fn is_io(&self) -> bool {
        matches!(self, ConfigError::IoError { .. })
    }

    /// Bad catalog content as the unified error, keeping the validation code.
    ///
    /// `None` when the file is missing or unreadable.
    pub fn catalog_error(&self) -> Option<vt_common::Error> {
        match self {
            ConfigError::Invalid { path, source } => Some(vt_common::Error::InvalidCatalog {
                code: source.code(),
                message: format!("{}: {}", path.display(), source),
            }),
            _ => None,
        }
    }
}

/// Catalog resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit catalog file path (highest priority).
    pub catalog_path: Option<PathBuf>,
    /// Explicit preset; skips file discovery when no path is given.
    pub preset: Option<PresetName>,
}

/// A loaded catalog with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedCatalog {
    pub catalog: Arc<Catalog>,
    pub origin: CatalogPath,
    /// Preset used when no file was loaded.
    pub preset: Option<PresetName>,
    pub lints: Vec<CatalogLint>,
    pub snapshot: CatalogSnapshot,
}

/// Load the active catalog with the standard resolution order.
///
/// 1. `options.catalog_path`
/// 2. `options.preset` (no file discovery)
/// 3. Environment, XDG and system catalog files
/// 4. The dog preset
pub fn load_catalog(options: &ConfigOptions) -> Result<ResolvedCatalog, ConfigError> {
    let origin = match (&options.catalog_path, options.preset) {
        (Some(path), _) => resolve_catalog(Some(path)),
        (None, Some(_)) => CatalogPath::default(),
        (None, None) => resolve_catalog(None),
    };

    let (catalog, preset) = match &origin.path {
        Some(path) => (load_catalog_file(path)?, None),
        None => {
            let name = options.preset.unwrap_or(PresetName::Dog);
            (get_preset(name), Some(name))
        }
    };

    let lints = lint_catalog(&catalog);
    let snapshot = CatalogSnapshot::new(&catalog, &origin)?;

    Ok(ResolvedCatalog {
        catalog: Arc::new(catalog),
        origin,
        preset,
        lints,
        snapshot,
    })
}

/// Read, parse and validate a single catalog file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    Catalog::from_json(&content).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })
}
