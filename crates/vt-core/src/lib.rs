//! Vet Triage core library.
//!
//! Walks a pet owner through a species catalog one question at a time,
//! sums the severity of the chosen answers and maps the total onto a risk
//! band with follow-up advice.

pub mod config;
pub mod exit_codes;
pub mod handoff;
pub mod logging;
pub mod render;
pub mod scoring;
pub mod session;

pub use handoff::{ChatContext, ChatHandoff, ChatHandoffRequest, HandoffPolicy, VetFinder};
pub use scoring::{assess, compute_risk_band, compute_score, partial_score, AssessmentResult};
pub use session::{AdvanceOutcome, AdvanceTicket, AssessmentSession, DeferredSession, Phase};
