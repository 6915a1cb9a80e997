//! Vet triage catalog loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for catalog.json
//! - Built-in species presets
//! - Catalog resolution (CLI → env → XDG → preset)
//! - Semantic validation and authoring lints
//! - Catalog snapshots for log correlation

pub mod catalog;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use catalog::{AnswerOption, Catalog, CatalogDocument, Category, Ceiling, RiskBand};
pub use preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use resolve::{resolve_catalog, CatalogPath, CatalogSource};
pub use snapshot::{CatalogSnapshot, CatalogSummary};
pub use validate::{lint_catalog, validate_catalog, CatalogLint, ValidationError, ValidationResult};

/// Schema version for catalog files.
pub const CATALOG_SCHEMA_VERSION: &str = "1.0.0";
