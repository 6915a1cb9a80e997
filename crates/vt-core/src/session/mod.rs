//! Assessment session state machine.
//!
//! A session walks one user through a [`Catalog`] one category at a time.
//! States are `Asking(step)` for `step` in `[0, N)` and `Completed`.
//!
//! Selecting an answer records it immediately but does not move the step.
//! The move is a separate, ticketed transition ([`AssessmentSession::commit_advance`])
//! so that callers can defer it for UI feedback. Only one advance can be
//! pending at a time: a new selection, [`go_back`](AssessmentSession::go_back)
//! or [`reset`](AssessmentSession::reset) invalidates the previous ticket, and
//! committing an invalidated ticket does nothing. [`deferred::DeferredSession`]
//! drives the delay on a tokio timer.

pub mod deferred;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vt_common::{CategoryId, Error, OptionId, Result, SessionId};
use vt_config::{Catalog, Category};

use crate::logging::event_names;

pub use deferred::{DeferredSession, DEFAULT_ADVANCE_DELAY};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Asking,
    Completed,
}

/// A recorded answer for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub category: CategoryId,
    pub option: OptionId,
    pub severity: u32,
}

/// Handle for one pending advance. Tickets are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdvanceTicket(u64);

/// Result of committing a pending advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the given step.
    Advanced(usize),
    /// The last category was answered; the session is now complete.
    Completed,
    /// The ticket was superseded or cancelled; nothing changed.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAdvance {
    ticket: AdvanceTicket,
    from_step: usize,
}

/// Position within a session, for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Zero-based step, equal to `total` once completed.
    pub step: usize,
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.step as f64 / self.total as f64
    }
}

/// One user's run through a catalog.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    catalog: Arc<Catalog>,
    step_index: usize,
    answers: BTreeMap<CategoryId, Answer>,
    phase: Phase,
    pending: Option<PendingAdvance>,
    next_ticket: u64,
}

impl AssessmentSession {
    /// Start a session in `Asking(0)` with no answers.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_id(catalog, SessionId::new())
    }

    pub fn with_id(catalog: Arc<Catalog>, id: SessionId) -> Self {
        tracing::debug!(
            target: event_names::SESSION_STARTED,
            session_id = %id,
            catalog = catalog.name(),
            categories = catalog.category_count(),
        );
        AssessmentSession {
            id,
            catalog,
            step_index: 0,
            answers: BTreeMap::new(),
            phase: Phase::Asking,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// The category currently displayed, or `None` once completed.
    pub fn current_category(&self) -> Option<&Category> {
        match self.phase {
            Phase::Asking => self.catalog.category_at(self.step_index).ok(),
            Phase::Completed => None,
        }
    }

    /// Recorded answers keyed by category id.
    pub fn answers(&self) -> &BTreeMap<CategoryId, Answer> {
        &self.answers
    }

    /// Recorded answers in question order, paired with their categories.
    pub fn answers_in_order(&self) -> impl Iterator<Item = (&Category, &Answer)> + '_ {
        self.catalog
            .categories()
            .iter()
            .filter_map(|c| self.answers.get(&c.id).map(|a| (c, a)))
    }

    pub fn answer_for(&self, category: &str) -> Option<&Answer> {
        self.answers.get(category)
    }

    /// Ticket of the advance waiting to be committed, if any.
    pub fn pending_ticket(&self) -> Option<AdvanceTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Whether `go_back` would move the step.
    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Asking && self.step_index > 0
    }

    pub fn progress(&self) -> Progress {
        let total = self.catalog.category_count();
        Progress {
            step: match self.phase {
                Phase::Asking => self.step_index,
                Phase::Completed => total,
            },
            answered: self.answers.len(),
            total,
        }
    }

    /// Record an answer for the displayed category and schedule the advance.
    ///
    /// Overwrites any earlier answer for the category. The returned ticket
    /// supersedes every earlier pending advance.
    pub fn select_answer(&mut self, category: &str, option: &str) -> Result<AdvanceTicket> {
        if self.phase == Phase::Completed {
            return Err(Error::SessionCompleted {
                session_id: self.id.to_string(),
            });
        }

        let displayed = self.catalog.category_at(self.step_index)?;
        if displayed.id != category {
            tracing::warn!(
                target: event_names::SESSION_ANSWER_REJECTED,
                session_id = %self.id,
                expected = %displayed.id,
                requested = category,
            );
            return Err(Error::CategoryMismatch {
                expected: displayed.id.clone(),
                requested: category.into(),
            });
        }

        let Some(chosen) = displayed.option(option) else {
            tracing::warn!(
                target: event_names::SESSION_ANSWER_REJECTED,
                session_id = %self.id,
                category,
                option,
            );
            return Err(Error::InvalidOption {
                category: displayed.id.clone(),
                option: option.into(),
            });
        };

        let answer = Answer {
            category: displayed.id.clone(),
            option: chosen.id.clone(),
            severity: chosen.severity,
        };
        tracing::debug!(
            target: event_names::SESSION_ANSWER_RECORDED,
            session_id = %self.id,
            step = self.step_index,
            category,
            option,
            severity = answer.severity,
        );
        self.answers.insert(answer.category.clone(), answer);

        self.cancel_pending();
        let ticket = AdvanceTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(PendingAdvance {
            ticket,
            from_step: self.step_index,
        });
        Ok(ticket)
    }

    /// Apply the advance scheduled by `select_answer`, if `ticket` is still current.
    pub fn commit_advance(&mut self, ticket: AdvanceTicket) -> AdvanceOutcome {
        let pending = match self.pending {
            Some(p) if p.ticket == ticket => p,
            _ => {
                tracing::trace!(
                    target: event_names::SESSION_ADVANCE_STALE,
                    session_id = %self.id,
                    ticket = ticket.0,
                );
                return AdvanceOutcome::Stale;
            }
        };
        self.pending = None;

        if self.phase != Phase::Asking || self.step_index != pending.from_step {
            return AdvanceOutcome::Stale;
        }

        let total = self.catalog.category_count();
        if self.step_index + 1 < total {
            self.step_index += 1;
            tracing::debug!(
                target: event_names::SESSION_ADVANCED,
                session_id = %self.id,
                step = self.step_index,
            );
            AdvanceOutcome::Advanced(self.step_index)
        } else {
            self.phase = Phase::Completed;
            tracing::debug!(
                target: event_names::SESSION_COMPLETED,
                session_id = %self.id,
                answered = self.answers.len(),
            );
            AdvanceOutcome::Completed
        }
    }

    /// Select and advance immediately.
    pub fn answer(&mut self, category: &str, option: &str) -> Result<AdvanceOutcome> {
        let ticket = self.select_answer(category, option)?;
        Ok(self.commit_advance(ticket))
    }

    /// Step back one category, keeping recorded answers.
    ///
    /// A no-op at step 0 and once completed. Always cancels a pending advance.
    pub fn go_back(&mut self) {
        self.cancel_pending();
        if !self.can_go_back() {
            return;
        }
        self.step_index -= 1;
        tracing::debug!(
            target: event_names::SESSION_WENT_BACK,
            session_id = %self.id,
            step = self.step_index,
        );
    }

    /// Discard answers and return to `Asking(0)`.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.answers.clear();
        self.step_index = 0;
        self.phase = Phase::Asking;
        tracing::debug!(target: event_names::SESSION_RESET, session_id = %self.id);
    }

    fn cancel_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            tracing::trace!(
                target: event_names::SESSION_ADVANCE_CANCELLED,
                session_id = %self.id,
                ticket = p.ticket.0,
                step = p.from_step,
            );
        }
    }
}
