//! Hand-offs to the chat assistant and the vet finder.
//!
//! Both collaborators are external. This module only decides what to hand
//! them and when; delivery is up to the [`ChatHandoff`] and [`VetFinder`]
//! implementations supplied by the front end.

use serde::{Deserialize, Serialize};
use vt_common::{BandId, Result, SessionId};
use vt_config::{Catalog, RiskBand};

use crate::logging::{event_names, Stage};
use crate::scoring::{assess, AnswerLine};
use crate::session::AssessmentSession;

/// Structured summary of a completed assessment for the chat assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    pub answers: Vec<AnswerLine>,
    pub score: u32,
    pub band: BandId,
    pub band_label: String,
    pub action: String,
}

impl ChatContext {
    /// Build the context from a completed session.
    pub fn from_session(session: &AssessmentSession) -> Result<Self> {
        let result = assess(session)?;
        Ok(ChatContext {
            species: result.species,
            answers: result.answers,
            score: result.score,
            band: result.band,
            band_label: result.band_label,
            action: result.action,
        })
    }

    /// Plain-sentence rendering suitable as a chat preamble.
    pub fn to_prose(&self) -> String {
        let pet = self.species.as_deref().unwrap_or("pet");
        let mut out = format!("I just completed a symptom check for my {}.", pet);
        for line in &self.answers {
            out.push_str(&format!(" {}: {}.", line.category_label, line.option_label));
        }
        out.push_str(&format!(
            " The result was {} (score {}), with the advice: {}.",
            self.band_label, self.score, self.action
        ));
        out
    }
}

/// What gets shared with the chat assistant when an assessment finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoffPolicy {
    /// Attach the assessment summary to the chat hand-off. Off by default;
    /// owners opt in per run.
    pub share_assessment_context: bool,
}

/// Payload handed to the chat collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHandoffRequest {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContext>,
}

impl ChatHandoffRequest {
    /// Build a request for `session`, attaching context only if the policy allows.
    pub fn build(session: &AssessmentSession, policy: HandoffPolicy) -> Result<Self> {
        let context = if policy.share_assessment_context {
            Some(ChatContext::from_session(session)?)
        } else {
            None
        };
        tracing::debug!(
            target: event_names::HANDOFF_CHAT,
            stage = %Stage::Handoff,
            session_id = %session.id(),
            shared = context.is_some(),
        );
        Ok(ChatHandoffRequest {
            session_id: session.id().clone(),
            context,
        })
    }
}

/// Opens the free-text chat assistant.
pub trait ChatHandoff {
    fn open_chat(&mut self, request: ChatHandoffRequest) -> Result<()>;
}

/// Opens the vet finder. Carries no payload.
pub trait VetFinder {
    fn open_vet_finder(&mut self) -> Result<()>;
}

/// Whether `band` is at or above the catalog's referral band.
///
/// Catalogs without a referral band never offer the vet finder.
pub fn should_offer_vet_finder(catalog: &Catalog, band: &RiskBand) -> bool {
    let Some(referral) = catalog.referral_band() else {
        return false;
    };
    match (
        catalog.band_rank(band.id.as_str()),
        catalog.band_rank(referral.id.as_str()),
    ) {
        (Some(rank), Some(threshold)) => rank >= threshold,
        _ => false,
    }
}

/// Offer the vet finder for a completed session when its band warrants it.
///
/// Returns whether the finder was opened.
pub fn offer_vet_finder(session: &AssessmentSession, finder: &mut dyn VetFinder) -> Result<bool> {
    let band = crate::scoring::compute_risk_band(session)?;
    if !should_offer_vet_finder(session.catalog(), band) {
        return Ok(false);
    }
    tracing::debug!(
        target: event_names::HANDOFF_VET_FINDER,
        stage = %Stage::Handoff,
        session_id = %session.id(),
        band = %band.id,
    );
    finder.open_vet_finder()?;
    Ok(true)
}
