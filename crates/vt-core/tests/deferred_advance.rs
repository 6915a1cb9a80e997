//! Timer-driven advance under a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use vt_config::{get_preset, PresetName};
use vt_core::scoring::compute_score;
use vt_core::session::{AdvanceOutcome, AssessmentSession, DeferredSession, Phase};

const DELAY: Duration = Duration::from_millis(300);

fn dog_session() -> DeferredSession {
    let catalog = Arc::new(get_preset(PresetName::Dog));
    DeferredSession::with_delay(AssessmentSession::new(catalog), DELAY)
}

async fn step(d: &DeferredSession) -> usize {
    d.inspect(|s| s.step_index()).await
}

#[tokio::test(start_paused = true)]
async fn rapid_reselect_applies_only_latest_answer() {
    let mut d = dog_session();
    d.select_answer("eating", "refusing_all").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    d.select_answer("eating", "reduced").await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    // The first selection's deadline has passed but its task was aborted.
    assert_eq!(step(&d).await, 0);

    assert_eq!(d.settle().await, Some(AdvanceOutcome::Advanced(1)));
    let (answers, severity) = d
        .inspect(|s| (s.answers().len(), s.answer_for("eating").map(|a| a.severity)))
        .await;
    assert_eq!(answers, 1);
    assert_eq!(severity, Some(1));
}

#[tokio::test(start_paused = true)]
async fn back_during_delay_cancels_advance() {
    let mut d = dog_session();
    d.select_answer("eating", "normal").await.unwrap();
    d.settle().await;
    d.select_answer("energy", "lethargic").await.unwrap();
    d.go_back().await;

    assert_eq!(d.settle().await, None);
    tokio::time::sleep(DELAY * 3).await;
    assert_eq!(step(&d).await, 0);
    assert_eq!(d.inspect(|s| s.answers().len()).await, 2);
}

#[tokio::test(start_paused = true)]
async fn full_run_with_delays_completes() {
    let mut d = dog_session();
    let picks = [
        ("eating", "reduced"),
        ("energy", "lethargic"),
        ("breathing", "labored"),
        ("digestion", "repeated"),
        ("mobility", "stiff"),
    ];
    for (category, option) in picks {
        d.select_answer(category, option).await.unwrap();
        tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
    }

    let (phase, score) = d
        .inspect(|s| (s.phase(), compute_score(s).ok()))
        .await;
    assert_eq!(phase, Phase::Completed);
    assert_eq!(score, Some(10));
    assert_eq!(d.settle().await, Some(AdvanceOutcome::Completed));
}

#[tokio::test(start_paused = true)]
async fn answering_before_advance_is_a_mismatch() {
    let mut d = dog_session();
    d.select_answer("eating", "normal").await.unwrap();
    // Still displaying "eating" until the delay elapses.
    let err = d.select_answer("energy", "normal").await.unwrap_err();
    assert!(matches!(err, vt_common::Error::CategoryMismatch { .. }));
    assert_eq!(step(&d).await, 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_session_aborts_pending_task() {
    let d = {
        let mut d = dog_session();
        d.select_answer("eating", "normal").await.unwrap();
        d.session()
    };
    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(d.lock().await.step_index(), 0);
}
