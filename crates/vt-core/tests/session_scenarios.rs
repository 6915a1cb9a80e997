//! End-to-end assessment scenarios against the built-in catalogs.

use std::sync::Arc;

use vt_common::Error;
use vt_config::{get_preset, Catalog, PresetName};
use vt_core::scoring::{assess, compute_risk_band, compute_score, partial_score};
use vt_core::session::{AdvanceOutcome, AssessmentSession, Phase};

fn dog() -> Arc<Catalog> {
    Arc::new(get_preset(PresetName::Dog))
}

/// Answer every category of `catalog` in order.
fn run(catalog: &Arc<Catalog>, options: &[&str]) -> AssessmentSession {
    let mut session = AssessmentSession::new(Arc::clone(catalog));
    for (category, option) in catalog.categories().iter().zip(options) {
        session
            .answer(category.id.as_str(), option)
            .expect("option should exist");
    }
    session
}

fn severities(session: &AssessmentSession) -> Vec<u32> {
    session.answers_in_order().map(|(_, a)| a.severity).collect()
}

// ============================================================================
// Full runs
// ============================================================================

mod full_runs {
    use super::*;

    #[test]
    fn mild_run_is_low() {
        let session = run(&dog(), &["normal", "quiet", "normal", "mild", "normal"]);
        assert_eq!(severities(&session), vec![0, 1, 0, 1, 0]);
        assert_eq!(compute_score(&session).unwrap(), 2);
        assert_eq!(compute_risk_band(&session).unwrap().id, "low");
    }

    #[test]
    fn mixed_run_is_urgent() {
        let session = run(&dog(), &["reduced", "lethargic", "labored", "repeated", "stiff"]);
        assert_eq!(severities(&session), vec![1, 3, 3, 2, 1]);
        assert_eq!(compute_score(&session).unwrap(), 10);
        assert_eq!(compute_risk_band(&session).unwrap().id, "urgent");
    }

    #[test]
    fn worst_run_is_emergency() {
        let session = run(
            &dog(),
            &["refusing_all", "unresponsive", "struggling", "blood", "cannot_stand"],
        );
        assert_eq!(severities(&session), vec![4, 5, 5, 4, 4]);
        assert_eq!(compute_score(&session).unwrap(), 22);
        assert_eq!(compute_risk_band(&session).unwrap().id, "emergency");

        let result = assess(&session).unwrap();
        assert!(result.refer_to_vet);
        assert_eq!(result.score, result.max_score);
    }

    #[test]
    fn last_answer_completes_session() {
        let catalog = dog();
        let mut session = AssessmentSession::new(Arc::clone(&catalog));
        let options = ["normal"; 5];
        let mut outcomes = Vec::new();
        for (category, option) in catalog.categories().iter().zip(options) {
            outcomes.push(session.answer(category.id.as_str(), option).unwrap());
        }
        assert_eq!(
            outcomes,
            vec![
                AdvanceOutcome::Advanced(1),
                AdvanceOutcome::Advanced(2),
                AdvanceOutcome::Advanced(3),
                AdvanceOutcome::Advanced(4),
                AdvanceOutcome::Completed,
            ]
        );
        assert_eq!(session.phase(), Phase::Completed);
        assert!(session.current_category().is_none());
        assert_eq!(session.progress().step, 5);
    }

    #[test]
    fn cat_catalog_runs_independently() {
        let cat = Arc::new(get_preset(PresetName::Cat));
        let session = run(&cat, &["picky", "normal", "hiding", "normal", "hairball"]);
        assert_eq!(compute_score(&session).unwrap(), 4);
        assert_eq!(compute_risk_band(&session).unwrap().id, "moderate");

        let dog_session = run(&dog(), &["normal"; 5]);
        assert_eq!(compute_risk_band(&dog_session).unwrap().id, "low");
    }
}

// ============================================================================
// Navigation
// ============================================================================

mod navigation {
    use super::*;

    #[test]
    fn back_and_reanswer_replaces_severity() {
        let catalog = dog();
        let mut session = AssessmentSession::new(Arc::clone(&catalog));

        session.answer("eating", "refusing_food").unwrap();
        assert_eq!(session.step_index(), 1);
        session.go_back();
        assert_eq!(session.step_index(), 0);
        session.answer("eating", "normal").unwrap();

        for (category, option) in catalog.categories().iter().zip(["normal"; 5]).skip(1) {
            session.answer(category.id.as_str(), option).unwrap();
        }

        assert_eq!(session.answers().len(), 5);
        assert_eq!(session.answer_for("eating").unwrap().severity, 0);
        assert_eq!(compute_score(&session).unwrap(), 0);
    }

    #[test]
    fn back_at_first_step_is_noop() {
        let mut session = AssessmentSession::new(dog());
        assert!(!session.can_go_back());
        session.go_back();
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.phase(), Phase::Asking);
    }

    #[test]
    fn back_keeps_later_answers() {
        let mut session = AssessmentSession::new(dog());
        session.answer("eating", "reduced").unwrap();
        session.answer("energy", "lethargic").unwrap();
        session.go_back();
        session.go_back();
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.answers().len(), 2);
        assert_eq!(partial_score(&session), 4);
    }

    #[test]
    fn answering_another_category_is_rejected() {
        let mut session = AssessmentSession::new(dog());
        let err = session.answer("energy", "normal").unwrap_err();
        assert!(matches!(err, Error::CategoryMismatch { .. }));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut session = AssessmentSession::new(dog());
        let err = session.answer("eating", "sometimes").unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
        assert!(err.is_programming_error());
        assert_eq!(session.step_index(), 0);
    }

    #[test]
    fn completed_session_rejects_answers_and_back() {
        let mut session = run(&dog(), &["normal"; 5]);
        assert!(matches!(
            session.answer("mobility", "stiff").unwrap_err(),
            Error::SessionCompleted { .. }
        ));
        session.go_back();
        assert!(session.is_complete());
        assert_eq!(compute_score(&session).unwrap(), 0);
    }

    #[test]
    fn reset_from_completed_starts_over() {
        let mut session = run(&dog(), &["reduced", "lethargic", "labored", "repeated", "stiff"]);
        session.reset();
        assert_eq!(session.phase(), Phase::Asking);
        assert_eq!(session.step_index(), 0);
        assert!(session.answers().is_empty());
        assert!(matches!(
            compute_score(&session).unwrap_err(),
            Error::IncompleteSession { answered: 0, .. }
        ));
    }
}

// ============================================================================
// Deferred advance on the bare session
// ============================================================================

mod tickets {
    use super::*;

    #[test]
    fn reselect_supersedes_pending_advance() {
        let mut session = AssessmentSession::new(dog());
        let first = session.select_answer("eating", "refusing_all").unwrap();
        let second = session.select_answer("eating", "reduced").unwrap();
        assert_ne!(first, second);

        assert_eq!(session.commit_advance(first), AdvanceOutcome::Stale);
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.commit_advance(second), AdvanceOutcome::Advanced(1));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answer_for("eating").unwrap().severity, 1);
    }

    #[test]
    fn go_back_cancels_pending_advance() {
        let mut session = AssessmentSession::new(dog());
        session.answer("eating", "normal").unwrap();
        let ticket = session.select_answer("energy", "quiet").unwrap();
        session.go_back();
        assert!(session.pending_ticket().is_none());
        assert_eq!(session.commit_advance(ticket), AdvanceOutcome::Stale);
        assert_eq!(session.step_index(), 0);
    }

    #[test]
    fn ticket_commits_once() {
        let mut session = AssessmentSession::new(dog());
        let ticket = session.select_answer("eating", "normal").unwrap();
        assert_eq!(session.commit_advance(ticket), AdvanceOutcome::Advanced(1));
        assert_eq!(session.commit_advance(ticket), AdvanceOutcome::Stale);
        assert_eq!(session.step_index(), 1);
    }
}

// ============================================================================
// Band boundaries
// ============================================================================

#[test]
fn dog_band_boundaries() {
    let catalog = dog();
    let cases = [
        (0, "low"),
        (3, "low"),
        (4, "moderate"),
        (7, "moderate"),
        (8, "urgent"),
        (12, "urgent"),
        (13, "emergency"),
        (u32::MAX, "emergency"),
    ];
    for (score, expected) in cases {
        assert_eq!(catalog.classify(score).id, expected, "score {}", score);
    }
}
