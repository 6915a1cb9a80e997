//! Command payload rendering for stdout.
//!
//! JSON payloads share one envelope (`schema_version`, `generated_at`);
//! the other formats are for people.

use std::fmt::Write as _;

use chrono::Utc;
use serde::Serialize;
use vt_common::{OutputFormat, Result};
use vt_config::{Catalog, CatalogSnapshot, RiskBand};

use crate::handoff::ChatHandoffRequest;
use crate::scoring::AssessmentResult;

/// Version of the JSON payloads printed by the CLI.
pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

/// Full output of one `assess` run.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub result: AssessmentResult,
    pub chat_handoff: ChatHandoffRequest,
    pub vet_finder_offered: bool,
    pub catalog: CatalogSnapshot,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    generated_at: String,
    #[serde(flatten)]
    body: &'a T,
}

fn to_json<T: Serialize>(body: &T) -> Result<String> {
    let envelope = Envelope {
        schema_version: OUTPUT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        body,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Render an assessment report.
pub fn render_report(report: &AssessmentReport, format: OutputFormat) -> Result<String> {
    let result = &report.result;
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Summary => Ok(format!(
            "[{}] {}: score {}/{} → {} ({}){}",
            result.session_id,
            result.catalog,
            result.score,
            result.max_score,
            result.band,
            result.action,
            if report.vet_finder_offered {
                " [vet advised]"
            } else {
                ""
            }
        )),
        OutputFormat::Md => {
            let mut out = String::new();
            let _ = writeln!(out, "# Symptom Check: {}", result.band_label);
            let _ = writeln!(out);
            let _ = writeln!(out, "**{}**", result.action);
            let _ = writeln!(out);
            let _ = writeln!(out, "Score: {} of {}", result.score, result.max_score);
            let _ = writeln!(out);
            let _ = writeln!(out, "| Category | Answer | Severity |");
            let _ = writeln!(out, "|----------|--------|----------|");
            for line in &result.answers {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    line.category_label, line.option_label, line.severity
                );
            }
            if !result.recommendations.is_empty() {
                let _ = writeln!(out);
                let _ = writeln!(out, "## Next steps");
                let _ = writeln!(out);
                for (i, rec) in result.recommendations.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", i + 1, rec);
                }
            }
            if report.vet_finder_offered {
                let _ = writeln!(out);
                let _ = writeln!(out, "> Find a veterinarian near you.");
            }
            Ok(out.trim_end().to_string())
        }
        OutputFormat::Prose => {
            if let Some(context) = &report.chat_handoff.context {
                return Ok(context.to_prose());
            }
            let mut out = format!(
                "Result: {} (score {} of {}). {}.",
                result.band_label, result.score, result.max_score, result.action
            );
            for rec in &result.recommendations {
                let _ = write!(out, " {}.", rec);
            }
            Ok(out)
        }
    }
}

#[derive(Serialize)]
struct BandBody<'a> {
    score: u32,
    band: &'a RiskBand,
    refer_to_vet: bool,
}

/// Render the band a raw score falls into.
pub fn render_band(score: u32, band: &RiskBand, refer_to_vet: bool, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&BandBody {
            score,
            band,
            refer_to_vet,
        }),
        OutputFormat::Summary => Ok(format!("{} → {}", score, band.id)),
        OutputFormat::Md => Ok(format!(
            "**{}** (ceiling {}): {}",
            band.label, band.ceiling, band.action
        )),
        OutputFormat::Prose => Ok(format!(
            "A score of {} is {}. {}.",
            score,
            band.label.to_lowercase(),
            band.action
        )),
    }
}

#[derive(Serialize)]
struct CatalogBody<'a> {
    catalog: &'a Catalog,
    snapshot: &'a CatalogSnapshot,
}

/// Render the active catalog.
pub fn render_catalog(catalog: &Catalog, snapshot: &CatalogSnapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&CatalogBody { catalog, snapshot }),
        OutputFormat::Summary => Ok(format!(
            "{} ({}): {} categories, bands {}, max score {}, hash {}",
            catalog.name(),
            snapshot.source,
            catalog.category_count(),
            snapshot.summary.band_ids.join("/"),
            catalog.max_score(),
            snapshot.short_id()
        )),
        OutputFormat::Md | OutputFormat::Prose => {
            let mut out = String::new();
            let _ = writeln!(out, "# Catalog: {}", catalog.name());
            if let Some(desc) = catalog.description() {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", desc);
            }
            for (i, category) in catalog.categories().iter().enumerate() {
                let _ = writeln!(out);
                let _ = writeln!(out, "## {}. {}", i + 1, category.label);
                for option in &category.options {
                    let _ = writeln!(out, "- {} ({})", option.label, option.severity);
                }
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "## Bands");
            for band in catalog.bands() {
                let _ = writeln!(out, "- {} ≤ {}: {}", band.label, band.ceiling, band.action);
            }
            Ok(out.trim_end().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::HandoffPolicy;
    use crate::scoring::assess;
    use crate::session::AssessmentSession;
    use std::sync::Arc;
    use vt_config::{get_preset, CatalogPath, PresetName};

    fn report(options: [&str; 5], share: bool) -> AssessmentReport {
        let catalog = Arc::new(get_preset(PresetName::Dog));
        let mut session = AssessmentSession::new(Arc::clone(&catalog));
        for (category, option) in catalog.categories().iter().zip(options) {
            session.answer(category.id.as_str(), option).unwrap();
        }
        let result = assess(&session).unwrap();
        let policy = HandoffPolicy {
            share_assessment_context: share,
        };
        AssessmentReport {
            vet_finder_offered: result.refer_to_vet,
            result,
            chat_handoff: ChatHandoffRequest::build(&session, policy).unwrap(),
            catalog: CatalogSnapshot::new(&catalog, &CatalogPath::default()).unwrap(),
        }
    }

    #[test]
    fn test_json_envelope() {
        let out = render_report(&report(["normal"; 5], false), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["schema_version"], OUTPUT_SCHEMA_VERSION);
        assert_eq!(value["result"]["score"], 0);
        assert_eq!(value["result"]["band"], "low");
        assert!(value["chat_handoff"].get("context").is_none());
        assert_eq!(value["vet_finder_offered"], false);
    }

    #[test]
    fn test_markdown_lists_answers_and_steps() {
        let out = render_report(
            &report(["reduced", "lethargic", "labored", "repeated", "stiff"], false),
            OutputFormat::Md,
        )
        .unwrap();
        assert!(out.starts_with("# Symptom Check: Urgent"));
        assert!(out.contains("| Breathing | Labored or noisy breathing at rest | 3 |"));
        assert!(out.contains("1. Contact your veterinarian today"));
        assert!(out.contains("Find a veterinarian"));
    }

    #[test]
    fn test_prose_uses_shared_context() {
        let out = render_report(&report(["normal"; 5], true), OutputFormat::Prose).unwrap();
        assert!(out.starts_with("I just completed a symptom check"));
        let out = render_report(&report(["normal"; 5], false), OutputFormat::Prose).unwrap();
        assert!(out.starts_with("Result: Low concern"));
    }

    #[test]
    fn test_render_band_formats() {
        let catalog = get_preset(PresetName::Dog);
        let band = catalog.classify(13);
        assert_eq!(render_band(13, band, true, OutputFormat::Summary).unwrap(), "13 → emergency");
        let json = render_band(13, band, true, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["band"]["ceiling"], serde_json::Value::Null);
        assert_eq!(value["refer_to_vet"], true);
    }

    #[test]
    fn test_render_catalog_markdown() {
        let catalog = get_preset(PresetName::Cat);
        let snapshot = CatalogSnapshot::new(&catalog, &CatalogPath::default()).unwrap();
        let out = render_catalog(&catalog, &snapshot, OutputFormat::Md).unwrap();
        assert!(out.contains("## 2. Litter Box"));
        assert!(out.contains("- Emergency ≤ ∞"));
    }
}
