//! Score aggregation and risk classification.
//!
//! Every function here is pure over the session it is given: no clock, no
//! randomness and no hidden state, so repeated calls on an unchanged session
//! return identical results.

use serde::{Deserialize, Serialize};
use vt_common::{BandId, CategoryId, Error, OptionId, Result, SessionId};
use vt_config::RiskBand;

use crate::handoff::should_offer_vet_finder;
use crate::logging::event_names;
use crate::session::AssessmentSession;

/// Total severity of a completed session.
///
/// Fails with `IncompleteSession` unless every category has been answered
/// and the session has advanced past the last one.
pub fn compute_score(session: &AssessmentSession) -> Result<u32> {
    if !session.is_complete() {
        return Err(Error::IncompleteSession {
            session_id: session.id().to_string(),
            answered: session.answers().len(),
            total: session.catalog().category_count(),
        });
    }
    Ok(partial_score(session))
}

/// Sum of severities over whatever has been answered so far.
///
/// Not a final score; never present it as one.
pub fn partial_score(session: &AssessmentSession) -> u32 {
    session
        .answers()
        .values()
        .fold(0u32, |acc, a| acc.saturating_add(a.severity))
}

/// Risk band for a completed session.
pub fn compute_risk_band(session: &AssessmentSession) -> Result<&RiskBand> {
    let score = compute_score(session)?;
    Ok(session.catalog().classify(score))
}

/// One answered question in a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerLine {
    pub category: CategoryId,
    pub category_label: String,
    pub option: OptionId,
    pub option_label: String,
    pub severity: u32,
}

/// Everything a front end needs to show the outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub session_id: SessionId,
    pub catalog: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    pub score: u32,
    pub max_score: u32,
    pub band: BandId,
    pub band_label: String,
    pub action: String,
    pub recommendations: Vec<String>,
    pub answers: Vec<AnswerLine>,
    /// Whether a vet visit should be offered.
    pub refer_to_vet: bool,
}

/// Score, classify and summarize a completed session.
pub fn assess(session: &AssessmentSession) -> Result<AssessmentResult> {
    let catalog = session.catalog();
    let score = compute_score(session)?;
    let band = catalog.classify(score);
    let refer_to_vet = should_offer_vet_finder(catalog, band);

    let answers = session
        .answers_in_order()
        .map(|(category, answer)| AnswerLine {
            category: category.id.clone(),
            category_label: category.label.clone(),
            option: answer.option.clone(),
            option_label: category
                .option(answer.option.as_str())
                .map(|o| o.label.clone())
                .unwrap_or_else(|| answer.option.to_string()),
            severity: answer.severity,
        })
        .collect();

    tracing::debug!(
        target: event_names::SCORE_COMPUTED,
        session_id = %session.id(),
        score,
        band = %band.id,
        refer_to_vet,
    );

    Ok(AssessmentResult {
        session_id: session.id().clone(),
        catalog: catalog.name().to_string(),
        species: catalog.species().map(str::to_string),
        score,
        max_score: catalog.max_score(),
        band: band.id.clone(),
        band_label: band.label.clone(),
        action: band.action.clone(),
        recommendations: band.recommendations.clone(),
        answers,
        refer_to_vet,
    })
}
