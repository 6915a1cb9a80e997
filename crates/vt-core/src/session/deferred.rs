//! Timer-driven advance for interactive front ends.
//!
//! [`DeferredSession`] owns a single task slot. Every successful mutation
//! aborts the task in the slot, and the session's ticket check turns any task
//! that already slipped past the abort into a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use vt_common::Result;

use super::{AdvanceOutcome, AdvanceTicket, AssessmentSession};

/// Pause between a selection and the step change.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(300);

/// An [`AssessmentSession`] whose advances fire after a delay.
///
/// Must be used from within a tokio runtime.
pub struct DeferredSession {
    session: Arc<Mutex<AssessmentSession>>,
    delay: Duration,
    task: Option<JoinHandle<AdvanceOutcome>>,
}

impl DeferredSession {
    pub fn new(session: AssessmentSession) -> Self {
        Self::with_delay(session, DEFAULT_ADVANCE_DELAY)
    }

    pub fn with_delay(session: AssessmentSession, delay: Duration) -> Self {
        DeferredSession {
            session: Arc::new(Mutex::new(session)),
            delay,
            task: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Shared handle to the underlying session.
    pub fn session(&self) -> Arc<Mutex<AssessmentSession>> {
        Arc::clone(&self.session)
    }

    /// Run `f` against the current session state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&AssessmentSession) -> R) -> R {
        let guard = self.session.lock().await;
        f(&guard)
    }

    /// Record an answer and schedule the advance after the configured delay.
    ///
    /// A rejected selection leaves the scheduled advance alone; an accepted
    /// one aborts it.
    pub async fn select_answer(&mut self, category: &str, option: &str) -> Result<AdvanceTicket> {
        let ticket = self.session.lock().await.select_answer(category, option)?;
        self.abort_pending();

        let session = Arc::clone(&self.session);
        let delay = self.delay;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.lock().await.commit_advance(ticket)
        }));
        Ok(ticket)
    }

    pub async fn go_back(&mut self) {
        self.abort_pending();
        self.session.lock().await.go_back();
    }

    pub async fn reset(&mut self) {
        self.abort_pending();
        self.session.lock().await.reset();
    }

    /// Wait for the scheduled advance, if any.
    ///
    /// Returns `None` when nothing was scheduled or the task was aborted.
    pub async fn settle(&mut self) -> Option<AdvanceOutcome> {
        let task = self.task.take()?;
        task.await.ok()
    }

    fn abort_pending(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DeferredSession {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
