//! Catalog snapshots for log correlation.
//!
//! A snapshot records which catalog a session ran against so that a logged
//! result can be tied back to the exact rule set. Nothing about the
//! assessment itself is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::Catalog;
use crate::resolve::CatalogPath;

/// A frozen description of the active catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    /// Path the catalog was loaded from, if any.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the catalog.
    pub source: String,

    /// SHA-256 of the canonical catalog JSON.
    pub content_hash: String,

    pub summary: CatalogSummary,
}

/// Key catalog facts for quick reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    pub category_count: usize,
    pub band_count: usize,
    pub band_ids: Vec<String>,
    pub max_score: u32,
    #[serde(default)]
    pub referral_band: Option<String>,
}

impl CatalogSummary {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        CatalogSummary {
            name: catalog.name().to_string(),
            species: catalog.species().map(str::to_string),
            category_count: catalog.category_count(),
            band_count: catalog.band_count(),
            band_ids: catalog.bands().map(|b| b.id.to_string()).collect(),
            max_score: catalog.max_score(),
            referral_band: catalog.referral_band().map(|b| b.id.to_string()),
        }
    }
}

impl CatalogSnapshot {
    /// Snapshot a loaded catalog.
    ///
    /// The hash covers the re-serialized catalog, so two files that differ
    /// only in whitespace share a hash.
    pub fn new(catalog: &Catalog, origin: &CatalogPath) -> serde_json::Result<Self> {
        let canonical = serde_json::to_string(catalog)?;
        Ok(CatalogSnapshot {
            timestamp: Utc::now(),
            schema_version: catalog.schema_version().to_string(),
            path: origin.path.as_ref().map(|p| p.display().to_string()),
            source: origin.source.to_string(),
            content_hash: hash_content(&canonical),
            summary: CatalogSummary::from_catalog(catalog),
        })
    }

    /// Short identifier (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.content_hash[..12.min(self.content_hash.len())]
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
