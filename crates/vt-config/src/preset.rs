//! Built-in triage catalogs.
//!
//! Provides species-specific catalogs that ship with the binary:
//! - Dog: the reference product configuration
//! - Cat: an independent catalog with feline-specific questions
//!
//! Severity weights and band ceilings are product-authored heuristics, not
//! validated clinical thresholds. Deployments that need different values
//! supply their own catalog file.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{AnswerOption, Catalog, Category, Ceiling, RiskBand};

/// Available catalog presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Reference canine symptom checker
    Dog,
    /// Feline symptom checker
    Cat,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[PresetName::Dog, PresetName::Cat];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Dog => "dog",
            PresetName::Cat => "cat",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "dog" | "canine" => Some(PresetName::Dog),
            "cat" | "feline" => Some(PresetName::Cat),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Dog => "Five-question canine symptom checker (reference configuration)",
            PresetName::Cat => "Five-question feline symptom checker with litter box screening",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the catalog for a preset.
pub fn get_preset(name: PresetName) -> Catalog {
    match name {
        PresetName::Dog => dog_catalog(),
        PresetName::Cat => cat_catalog(),
    }
}

fn option(id: &str, label: &str, severity: u32) -> AnswerOption {
    AnswerOption {
        id: id.into(),
        label: label.to_string(),
        severity,
    }
}

fn category(id: &str, label: &str, prompt: &str, options: Vec<AnswerOption>) -> Category {
    Category {
        id: id.into(),
        label: label.to_string(),
        prompt: Some(prompt.to_string()),
        options,
    }
}

fn band(id: &str, label: &str, ceiling: Ceiling, action: &str, recommendations: &[&str]) -> RiskBand {
    RiskBand {
        id: id.into(),
        label: label.to_string(),
        ceiling,
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        action: action.to_string(),
    }
}

/// Terminal band shared by both presets; the wording names the species.
fn emergency_band(pet: &str) -> RiskBand {
    let keep_still = format!("Keep your {} warm and move them as little as possible", pet);
    band(
        "emergency",
        "Emergency",
        Ceiling::Unbounded,
        "Seek emergency veterinary care now",
        &[
            "Go to the nearest emergency veterinary clinic immediately",
            "Call ahead so the team can prepare for your arrival",
            keep_still.as_str(),
        ],
    )
}

/// Reference canine catalog.
///
/// Bands: low ≤ 3, moderate ≤ 7, urgent ≤ 12, emergency above.
/// Per-category maximum severities 4, 5, 5, 4, 4 (max score 22).
pub(crate) fn dog_catalog() -> Catalog {
    Catalog {
        schema_version: crate::CATALOG_SCHEMA_VERSION.to_string(),
        name: "preset:dog".to_string(),
        species: Some("dog".to_string()),
        description: Some(PresetName::Dog.description().to_string()),
        categories: vec![
            category(
                "eating",
                "Eating & Drinking",
                "How is your dog eating and drinking?",
                vec![
                    option("normal", "Eating and drinking normally", 0),
                    option("reduced", "Eating less than usual", 1),
                    option("refusing_food", "Has not eaten for over 24 hours", 2),
                    option("refusing_all", "Refusing both food and water", 4),
                ],
            ),
            category(
                "energy",
                "Energy & Behavior",
                "How is your dog's energy level?",
                vec![
                    option("normal", "Normal energy and behavior", 0),
                    option("quiet", "A little quieter than usual", 1),
                    option("lethargic", "Lethargic and reluctant to move", 3),
                    option("unresponsive", "Collapsed or barely responsive", 5),
                ],
            ),
            category(
                "breathing",
                "Breathing",
                "How is your dog breathing?",
                vec![
                    option("normal", "Breathing normally", 0),
                    option("occasional_cough", "Occasional cough or sneeze", 1),
                    option("labored", "Labored or noisy breathing at rest", 3),
                    option("struggling", "Struggling to breathe, pale or blue gums", 5),
                ],
            ),
            category(
                "digestion",
                "Vomiting & Stool",
                "Any vomiting or changes in stool?",
                vec![
                    option("normal", "No vomiting, normal stool", 0),
                    option("mild", "Soft stool or a single vomit", 1),
                    option("repeated", "Repeated vomiting or diarrhea", 2),
                    option("blood", "Blood in vomit or stool", 4),
                ],
            ),
            category(
                "mobility",
                "Pain & Mobility",
                "Is your dog showing pain or trouble moving?",
                vec![
                    option("normal", "Moving comfortably", 0),
                    option("stiff", "Slight limp or stiffness", 1),
                    option("painful", "Crying out, hunched, or guarding a body part", 2),
                    option("cannot_stand", "Unable to stand, or having seizures", 4),
                ],
            ),
        ],
        finite_bands: vec![
            band(
                "low",
                "Low concern",
                Ceiling::Finite(3),
                "Monitor at home",
                &[
                    "Keep an eye on your dog over the next 24 to 48 hours",
                    "Make sure fresh water is always available",
                    "Note any change in appetite, energy or stool",
                ],
            ),
            band(
                "moderate",
                "Moderate concern",
                Ceiling::Finite(7),
                "Schedule a vet visit",
                &[
                    "Call your veterinarian and describe the symptoms",
                    "Book an appointment within the next day or two",
                    "Limit exercise until your dog has been examined",
                ],
            ),
            band(
                "urgent",
                "Urgent",
                Ceiling::Finite(12),
                "See a veterinarian today",
                &[
                    "Contact your veterinarian today for a same-day visit",
                    "Keep your dog calm, quiet and confined",
                    "Do not give human medication",
                ],
            ),
        ],
        terminal_band: emergency_band("dog"),
        referral_band: Some("urgent".into()),
    }
}

/// Feline catalog. Cats mask illness, so ceilings sit lower than the dog's.
pub(crate) fn cat_catalog() -> Catalog {
    Catalog {
        schema_version: crate::CATALOG_SCHEMA_VERSION.to_string(),
        name: "preset:cat".to_string(),
        species: Some("cat".to_string()),
        description: Some(PresetName::Cat.description().to_string()),
        categories: vec![
            category(
                "eating",
                "Eating & Drinking",
                "How is your cat eating and drinking?",
                vec![
                    option("normal", "Eating and drinking normally", 0),
                    option("picky", "Eating less or picking at food", 1),
                    option("not_eating", "Has not eaten for over 24 hours", 3),
                    option("excessive_thirst", "Drinking far more than usual", 2),
                ],
            ),
            category(
                "litter_box",
                "Litter Box",
                "Any changes in litter box habits?",
                vec![
                    option("normal", "Normal urine and stool", 0),
                    option("loose_stool", "Loose stool", 1),
                    option("straining", "Straining or frequent small urinations", 3),
                    option("no_urine", "Straining with little or no urine", 5),
                ],
            ),
            category(
                "energy",
                "Energy & Hiding",
                "How is your cat's energy and behavior?",
                vec![
                    option("normal", "Normal energy, social as usual", 0),
                    option("hiding", "Hiding more than usual", 2),
                    option("lethargic", "Lethargic, not grooming", 3),
                    option("unresponsive", "Collapsed or barely responsive", 5),
                ],
            ),
            category(
                "breathing",
                "Breathing",
                "How is your cat breathing?",
                vec![
                    option("normal", "Breathing normally", 0),
                    option("sneezing", "Sneezing or mild congestion", 1),
                    option("open_mouth", "Open-mouth breathing or panting", 5),
                ],
            ),
            category(
                "vomiting",
                "Vomiting",
                "Has your cat been vomiting?",
                vec![
                    option("none", "No vomiting", 0),
                    option("hairball", "Occasional hairball", 1),
                    option("repeated", "Vomiting several times today", 3),
                    option("blood", "Blood in vomit", 4),
                ],
            ),
        ],
        finite_bands: vec![
            band(
                "low",
                "Low concern",
                Ceiling::Finite(2),
                "Monitor at home",
                &[
                    "Watch your cat closely over the next 24 hours",
                    "Check that your cat is eating, drinking and using the litter box",
                ],
            ),
            band(
                "moderate",
                "Moderate concern",
                Ceiling::Finite(6),
                "Schedule a vet visit",
                &[
                    "Call your veterinarian and describe the symptoms",
                    "Book an appointment within the next day",
                ],
            ),
            band(
                "urgent",
                "Urgent",
                Ceiling::Finite(11),
                "See a veterinarian today",
                &[
                    "Contact your veterinarian today for a same-day visit",
                    "Keep your cat in a quiet room with water and a litter box",
                    "Never give human pain medication to a cat",
                ],
            ),
        ],
        terminal_band: emergency_band("cat"),
        referral_band: Some("urgent".into()),
    }
}

/// Summary information about a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub category_count: usize,
    pub band_ids: Vec<String>,
    pub max_score: u32,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let catalog = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            category_count: catalog.category_count(),
            band_ids: catalog.bands().map(|b| b.id.to_string()).collect(),
            max_score: catalog.max_score(),
        }
    }
}

/// List all available presets with their info.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogDocument;
    use crate::validate::{lint_catalog, validate_catalog};

    #[test]
    fn test_preset_name_parsing() {
        assert_eq!(PresetName::parse("dog"), Some(PresetName::Dog));
        assert_eq!(PresetName::parse("Canine"), Some(PresetName::Dog));
        assert_eq!(PresetName::parse("feline"), Some(PresetName::Cat));
        assert_eq!(PresetName::parse("parrot"), None);
    }

    #[test]
    fn test_preset_from_str_error_lists_available() {
        let err = "parrot".parse::<PresetName>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown preset 'parrot'. Available: dog, cat");
    }

    #[test]
    fn test_presets_pass_validation_and_lint() {
        for &name in PresetName::ALL {
            let catalog = get_preset(name);
            let doc: CatalogDocument = catalog.clone().into();
            validate_catalog(&doc).unwrap_or_else(|e| panic!("{} invalid: {}", name, e));
            assert!(lint_catalog(&catalog).is_empty(), "{} has lints", name);
        }
    }

    #[test]
    fn test_dog_preset_matches_reference_configuration() {
        let catalog = dog_catalog();
        assert_eq!(catalog.category_count(), 5);
        let maxima: Vec<u32> = catalog.categories().iter().map(|c| c.max_severity()).collect();
        assert_eq!(maxima, vec![4, 5, 5, 4, 4]);
        assert_eq!(catalog.max_score(), 22);

        let ceilings: Vec<Ceiling> = catalog.bands().map(|b| b.ceiling).collect();
        assert_eq!(
            ceilings,
            vec![
                Ceiling::Finite(3),
                Ceiling::Finite(7),
                Ceiling::Finite(12),
                Ceiling::Unbounded
            ]
        );
        assert_eq!(catalog.referral_band().map(|b| b.id.as_str()), Some("urgent"));
    }

    #[test]
    fn test_default_catalog_is_dog() {
        assert_eq!(Catalog::default(), dog_catalog());
    }

    #[test]
    fn test_list_presets() {
        let presets = list_presets();
        assert_eq!(presets.len(), 2);
        let dog = presets.iter().find(|p| p.name == "dog").unwrap();
        assert_eq!(dog.band_ids, vec!["low", "moderate", "urgent", "emergency"]);
        assert_eq!(dog.max_score, 22);
    }
}
