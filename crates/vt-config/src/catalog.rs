//! Triage catalog: the immutable rule set an assessment runs against.
//!
//! A catalog is an ordered list of categories (one question each), every
//! category holding an ordered list of answer options with integer severity
//! weights, plus an ordered table of risk bands with inclusive score ceilings.
//!
//! Catalogs are only ever constructed in a validated state. Deserialization
//! goes through [`CatalogDocument`] and [`crate::validate::validate_catalog`],
//! and the unbounded final band is stored apart from the finite ones, so
//! [`Catalog::classify`] is total by construction.

use serde::{Deserialize, Serialize};
use vt_common::{BandId, CategoryId, OptionId};

use crate::validate::{validate_catalog, ValidationError, ValidationResult};

/// Inclusive upper bound on the total score admitted by a risk band.
///
/// Serialized as an integer, or `null` for the unbounded final band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Ceiling {
    /// Scores `<=` this value belong to the band.
    Finite(u32),
    /// Every score belongs to the band.
    Unbounded,
}

impl Ceiling {
    /// Whether `score` falls at or below this ceiling.
    pub fn admits(&self, score: u32) -> bool {
        match self {
            Ceiling::Finite(limit) => score <= *limit,
            Ceiling::Unbounded => true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ceiling::Unbounded)
    }
}

impl From<Option<u32>> for Ceiling {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(limit) => Ceiling::Finite(limit),
            None => Ceiling::Unbounded,
        }
    }
}

impl From<Ceiling> for Option<u32> {
    fn from(value: Ceiling) -> Self {
        match value {
            Ceiling::Finite(limit) => Some(limit),
            Ceiling::Unbounded => None,
        }
    }
}

impl std::fmt::Display for Ceiling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ceiling::Finite(limit) => write!(f, "{}", limit),
            Ceiling::Unbounded => write!(f, "∞"),
        }
    }
}

/// One selectable answer within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub label: String,
    /// Weight contributed to the total score. Zero means no concern.
    pub severity: u32,
}

/// One health dimension assessed by a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,

    /// Question text shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    pub options: Vec<AnswerOption>,
}

impl Category {
    /// Look up an option by id.
    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Highest severity any option of this category contributes.
    pub fn max_severity(&self) -> u32 {
        self.options.iter().map(|o| o.severity).max().unwrap_or(0)
    }

    /// Lowest severity any option of this category contributes.
    pub fn min_severity(&self) -> u32 {
        self.options.iter().map(|o| o.severity).min().unwrap_or(0)
    }
}

/// A named classification tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBand {
    pub id: BandId,
    pub label: String,
    pub ceiling: Ceiling,

    /// Ordered follow-up steps for the owner.
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Single summary directive.
    pub action: String,
}

/// On-disk catalog document, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub schema_version: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Question order. Reordering changes the user's path, never a score.
    pub categories: Vec<Category>,

    /// Bands in strictly increasing ceiling order, unbounded band last.
    pub bands: Vec<RiskBand>,

    /// Lowest band at which an in-person vet visit is offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_band: Option<BandId>,
}

/// A validated triage catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument", into = "CatalogDocument")]
pub struct Catalog {
    pub(crate) schema_version: String,
    pub(crate) name: String,
    pub(crate) species: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) categories: Vec<Category>,
    pub(crate) finite_bands: Vec<RiskBand>,
    pub(crate) terminal_band: RiskBand,
    pub(crate) referral_band: Option<BandId>,
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = ValidationError;

    fn try_from(doc: CatalogDocument) -> Result<Self, Self::Error> {
        validate_catalog(&doc)?;

        let mut finite_bands = doc.bands;
        let terminal_band = finite_bands
            .pop()
            .ok_or_else(|| ValidationError::MissingField("bands".to_string()))?;

        Ok(Catalog {
            schema_version: doc.schema_version,
            name: doc.name,
            species: doc.species,
            description: doc.description,
            categories: doc.categories,
            finite_bands,
            terminal_band,
            referral_band: doc.referral_band,
        })
    }
}

impl From<Catalog> for CatalogDocument {
    fn from(catalog: Catalog) -> Self {
        let mut bands = catalog.finite_bands;
        bands.push(catalog.terminal_band);
        CatalogDocument {
            schema_version: catalog.schema_version,
            name: catalog.name,
            species: catalog.species,
            description: catalog.description,
            categories: catalog.categories,
            bands,
            referral_band: catalog.referral_band,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        crate::preset::dog_catalog()
    }
}

impl Catalog {
    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))?;
        Catalog::try_from(doc)
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Categories in question order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories, i.e. the number of questions in a session.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Category at `index` in question order.
    pub fn category_at(&self, index: usize) -> vt_common::Result<&Category> {
        self.categories
            .get(index)
            .ok_or(vt_common::Error::OutOfRange {
                index,
                count: self.categories.len(),
            })
    }

    /// Look up a category by id.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Bands in ascending ceiling order, unbounded band last.
    pub fn bands(&self) -> impl Iterator<Item = &RiskBand> + '_ {
        self.finite_bands
            .iter()
            .chain(std::iter::once(&self.terminal_band))
    }

    pub fn band_count(&self) -> usize {
        self.finite_bands.len() + 1
    }

    /// Look up a band by id.
    pub fn band(&self, id: &str) -> Option<&RiskBand> {
        self.bands().find(|b| b.id == id)
    }

    /// Position of a band in ascending severity order (0 = mildest).
    pub fn band_rank(&self, id: &str) -> Option<usize> {
        self.bands().position(|b| b.id == id)
    }

    /// Band at or above which a vet visit is offered, if configured.
    pub fn referral_band(&self) -> Option<&RiskBand> {
        self.referral_band.as_ref().and_then(|id| self.band(id.as_str()))
    }

    /// Classify a total score into a risk band.
    ///
    /// Scans bands in ascending ceiling order and returns the first whose
    /// ceiling is `>= score`. A score equal to a ceiling belongs to that
    /// band, not the next one. Scores above every finite ceiling land in the
    /// unbounded final band.
    pub fn classify(&self, score: u32) -> &RiskBand {
        self.finite_bands
            .iter()
            .find(|band| band.ceiling.admits(score))
            .unwrap_or(&self.terminal_band)
    }

    /// Highest reachable total score.
    pub fn max_score(&self) -> u32 {
        self.categories
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.max_severity()))
    }
}
