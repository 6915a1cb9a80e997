//! Catalog validation errors and semantic validation.
//!
//! Hard rules live in [`validate_catalog`] and are enforced before a
//! [`crate::Catalog`] can exist. Authoring conventions that do not break
//! scoring are reported by [`lint_catalog`] as warnings.

use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogDocument, Category, Ceiling, RiskBand};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Catalog validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Duplicate id '{id}' in {field}")]
    DuplicateId { field: String, id: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    ///
    /// Validation codes occupy 40-49, disjoint from the `vt_common::Error`
    /// ranges, so they can ride along as `InvalidCatalog { code, .. }`.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::ParseError(_) => 41,
            ValidationError::SemanticError(_) => 43,
            ValidationError::MissingField(_) => 44,
            ValidationError::InvalidValue { .. } => 45,
            ValidationError::DuplicateId { .. } => 46,
            ValidationError::VersionMismatch { .. } => 47,
        }
    }
}


/// Validate a catalog document semantically.
pub fn validate_catalog(doc: &CatalogDocument) -> ValidationResult<()> {
    if doc.schema_version != crate::CATALOG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CATALOG_SCHEMA_VERSION.to_string(),
            actual: doc.schema_version.clone(),
        });
    }

    if doc.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()));
    }

    validate_categories(&doc.categories)?;
    validate_bands(&doc.bands)?;

    if let Some(ref referral) = doc.referral_band {
        if !doc.bands.iter().any(|b| &b.id == referral) {
            return Err(ValidationError::InvalidValue {
                field: "referral_band".to_string(),
                message: format!("'{}' does not name a band", referral),
            });
        }
    }

    Ok(())
}

/// Validate the category list and each category's options.
fn validate_categories(categories: &[Category]) -> ValidationResult<()> {
    if categories.is_empty() {
        return Err(ValidationError::SemanticError(
            "catalog must define at least one category".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, category) in categories.iter().enumerate() {
        if category.id.as_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("categories[{}].id", idx),
                message: "must not be empty".to_string(),
            });
        }
        if !seen.insert(category.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                field: "categories".to_string(),
                id: category.id.to_string(),
            });
        }
        validate_options(category)?;
    }

    Ok(())
}

/// Validate a single category's option set.
fn validate_options(category: &Category) -> ValidationResult<()> {
    if category.options.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("categories.{}.options", category.id),
            message: "must contain at least one option".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (idx, option) in category.options.iter().enumerate() {
        if option.id.as_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("categories.{}.options[{}].id", category.id, idx),
                message: "must not be empty".to_string(),
            });
        }
        if !seen.insert(option.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                field: format!("categories.{}.options", category.id),
                id: option.id.to_string(),
            });
        }
    }

    Ok(())
}

/// Validate the band table: unique ids, strictly increasing finite
/// ceilings, and exactly one unbounded band in last position.
fn validate_bands(bands: &[RiskBand]) -> ValidationResult<()> {
    let Some((last, finite)) = bands.split_last() else {
        return Err(ValidationError::SemanticError(
            "catalog must define at least one risk band".to_string(),
        ));
    };

    let mut seen = HashSet::new();
    for band in bands {
        if band.id.as_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "bands.id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !seen.insert(band.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                field: "bands".to_string(),
                id: band.id.to_string(),
            });
        }
    }

    let mut previous: Option<u32> = None;
    for (idx, band) in finite.iter().enumerate() {
        let limit = match band.ceiling {
            Ceiling::Finite(limit) => limit,
            Ceiling::Unbounded => {
                return Err(ValidationError::InvalidValue {
                    field: format!("bands[{}].ceiling", idx),
                    message: format!(
                        "only the last band may be unbounded, '{}' is at position {}",
                        band.id, idx
                    ),
                });
            }
        };
        if let Some(prev) = previous {
            if limit <= prev {
                return Err(ValidationError::InvalidValue {
                    field: format!("bands[{}].ceiling", idx),
                    message: format!(
                        "ceilings must strictly increase, got {} after {}",
                        limit, prev
                    ),
                });
            }
        }
        previous = Some(limit);
    }

    if !last.ceiling.is_unbounded() {
        return Err(ValidationError::InvalidValue {
            field: format!("bands[{}].ceiling", finite.len()),
            message: format!("last band '{}' must be unbounded (null)", last.id),
        });
    }

    Ok(())
}

/// A non-fatal catalog authoring issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLint {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for CatalogLint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Report authoring-convention violations that do not affect scoring.
///
/// Every category is expected to offer exactly one "no symptom" option
/// carrying the category's minimum severity, conventionally zero.
pub fn lint_catalog(catalog: &Catalog) -> Vec<CatalogLint> {
    let mut lints = Vec::new();

    for category in catalog.categories() {
        let min = category.min_severity();
        if min != 0 {
            lints.push(CatalogLint {
                field: format!("categories.{}", category.id),
                message: format!("no zero-severity option (minimum is {})", min),
            });
        }

        let at_min = category
            .options
            .iter()
            .filter(|o| o.severity == min)
            .count();
        if at_min > 1 {
            lints.push(CatalogLint {
                field: format!("categories.{}", category.id),
                message: format!("{} options share the minimum severity {}", at_min, min),
            });
        }
    }

    lints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AnswerOption;

    fn band(id: &str, ceiling: Option<u32>) -> RiskBand {
        RiskBand {
            id: id.into(),
            label: id.to_string(),
            ceiling: ceiling.into(),
            recommendations: Vec::new(),
            action: format!("{} action", id),
        }
    }

    fn category(id: &str, severities: &[u32]) -> Category {
        Category {
            id: id.into(),
            label: id.to_string(),
            prompt: None,
            options: severities
                .iter()
                .enumerate()
                .map(|(i, s)| AnswerOption {
                    id: format!("opt{}", i).into(),
                    label: format!("Option {}", i),
                    severity: *s,
                })
                .collect(),
        }
    }

    fn document() -> CatalogDocument {
        CatalogDocument {
            schema_version: crate::CATALOG_SCHEMA_VERSION.to_string(),
            name: "test".to_string(),
            species: None,
            description: None,
            categories: vec![category("a", &[0, 2]), category("b", &[0, 1, 4])],
            bands: vec![band("low", Some(3)), band("high", None)],
            referral_band: Some("high".into()),
        }
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(validate_catalog(&document()).is_ok());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut doc = document();
        doc.schema_version = "2.0.0".to_string();
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_categories() {
        let mut doc = document();
        doc.categories.clear();
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let mut doc = document();
        doc.categories.push(category("a", &[0]));
        assert_eq!(
            validate_catalog(&doc),
            Err(ValidationError::DuplicateId {
                field: "categories".to_string(),
                id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_category_without_options() {
        let mut doc = document();
        doc.categories[1].options.clear();
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_option() {
        let mut doc = document();
        let dup = doc.categories[0].options[0].clone();
        doc.categories[0].options.push(dup);
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_rejects_non_increasing_ceilings() {
        let mut doc = document();
        doc.bands = vec![band("low", Some(3)), band("mid", Some(3)), band("high", None)];
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_bounded_last_band() {
        let mut doc = document();
        doc.bands = vec![band("low", Some(3)), band("high", Some(10))];
        let err = validate_catalog(&doc).unwrap_err();
        assert!(err.to_string().contains("must be unbounded"));
    }

    #[test]
    fn test_rejects_unknown_referral_band() {
        let mut doc = document();
        doc.referral_band = Some("urgent".into());
        assert!(matches!(
            validate_catalog(&doc),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_single_unbounded_band_is_valid() {
        let mut doc = document();
        doc.bands = vec![band("only", None)];
        doc.referral_band = None;
        assert!(validate_catalog(&doc).is_ok());
    }

    #[test]
    fn test_lint_flags_missing_zero_option() {
        let mut doc = document();
        doc.categories.push(category("c", &[1, 3]));
        doc.categories.push(category("d", &[0, 0, 2]));
        let catalog = Catalog::try_from(doc).unwrap();
        let lints = lint_catalog(&catalog);
        assert_eq!(lints.len(), 2);
        assert_eq!(lints[0].field, "categories.c");
        assert!(lints[1].message.contains("share the minimum"));
    }

    #[test]
    fn test_validation_codes_do_not_collide_with_common_codes() {
        let validation = [
            ValidationError::ParseError("x".into()),
            ValidationError::SemanticError("x".into()),
            ValidationError::MissingField("x".into()),
            ValidationError::InvalidValue {
                field: "f".into(),
                message: "m".into(),
            },
            ValidationError::DuplicateId {
                field: "f".into(),
                id: "i".into(),
            },
            ValidationError::VersionMismatch {
                expected: "1".into(),
                actual: "2".into(),
            },
        ];
        let common = [
            vt_common::Error::InvalidCatalog {
                code: 0,
                message: "x".into(),
            },
            vt_common::Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x")),
            vt_common::Error::OutOfRange { index: 1, count: 1 },
        ];
        for err in &validation {
            assert!((40..50).contains(&err.code()), "{}", err);
            assert!(common.iter().all(|c| c.code() != err.code()), "{}", err);
        }
    }
}
