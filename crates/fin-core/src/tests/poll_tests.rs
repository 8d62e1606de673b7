//! Tests for the poll loop
//!
//! Timing runs on a paused clock, so intervals are exact.

use std::sync::Arc;
use std::time::Duration;

use super::fixtures::{Harness, MockProvider, figma, finder, titles};
use crate::poll::PollLoop;

const PERIOD: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn test_first_fetch_waits_one_period() {
    let provider = MockProvider::new();
    provider.answer("fi", vec![finder()]);
    let mut poll = PollLoop::new();

    let started = tokio::time::Instant::now();
    poll.start(Arc::clone(&provider), "fi".into(), PERIOD);
    let batch = poll.next_batch().await;

    assert_eq!(started.elapsed(), PERIOD);
    assert_eq!(titles(&batch), vec!["Finder"]);
    assert_eq!(provider.submitted(), vec!["fi"]);
}

#[tokio::test(start_paused = true)]
async fn test_fetches_on_every_tick() {
    let provider = MockProvider::new();
    let mut poll = PollLoop::new();
    poll.start(Arc::clone(&provider), "fi".into(), PERIOD);

    for _ in 0..3 {
        assert!(poll.next_batch().await.is_empty());
    }
    assert_eq!(provider.fetches(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_undelivered_batch_blocks_further_fetches() {
    let provider = MockProvider::new();
    let mut poll = PollLoop::new();
    poll.start(Arc::clone(&provider), "fi".into(), PERIOD);

    // One batch buffered, one more held by the task awaiting capacity
    tokio::time::sleep(PERIOD * 10).await;
    assert_eq!(provider.fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_and_drops_pending_batch() {
    let provider = MockProvider::new();
    provider.answer("fi", vec![finder()]);
    let mut poll = PollLoop::new();
    poll.start(Arc::clone(&provider), "fi".into(), PERIOD);

    tokio::time::sleep(PERIOD + PERIOD / 2).await;
    poll.stop();
    assert!(!poll.is_running());

    let fetched = provider.fetches();
    let late = tokio::time::timeout(PERIOD * 5, poll.next_batch()).await;
    assert!(late.is_err(), "no batch after stop");
    assert_eq!(provider.fetches(), fetched, "no fetch after stop");
}

#[tokio::test(start_paused = true)]
async fn test_restart_discards_the_old_query() {
    let provider = MockProvider::new();
    provider.answer("f", vec![figma()]);
    provider.answer("fi", vec![finder()]);
    let mut poll = PollLoop::new();

    poll.start(Arc::clone(&provider), "f".into(), PERIOD);
    tokio::time::sleep(PERIOD + PERIOD / 2).await;
    poll.start(Arc::clone(&provider), "fi".into(), PERIOD);

    assert_eq!(titles(&poll.next_batch().await), vec!["Finder"]);
    assert_eq!(provider.submitted(), vec!["f", "fi"]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_previous_results() {
    let mut h = Harness::new();
    h.provider.answer("fi", vec![finder()]);
    h.session.set_query("fi");
    h.session.poll_once().await;

    h.provider.set_failing(true);
    let outcome = tokio::time::timeout(PERIOD * 5, h.session.poll_once()).await;
    assert!(outcome.is_err());
    assert_eq!(titles(h.session.state().results()), vec!["Finder"]);
    assert!(h.session.is_polling());

    // The next successful tick recovers
    h.provider.set_failing(false);
    h.provider.answer("fi", vec![finder(), figma()]);
    h.session.poll_once().await;
    assert_eq!(titles(h.session.state().results()), vec!["Finder", "Figma"]);
}

#[tokio::test(start_paused = true)]
async fn test_session_restarts_loop_per_edit() {
    let mut h = Harness::new();
    h.provider.answer("f", vec![figma()]);
    h.provider.answer("fi", vec![finder()]);

    h.session.set_query("f");
    tokio::time::sleep(PERIOD + PERIOD / 2).await;
    h.session.set_query("fi");
    h.session.poll_once().await;

    assert_eq!(titles(h.session.state().results()), vec!["Finder"]);
}

#[tokio::test(start_paused = true)]
async fn test_loop_stops_on_empty_query() {
    let mut h = Harness::new();
    h.session.set_query("fi");
    assert!(h.session.is_polling());

    h.session.set_query("");
    assert!(!h.session.is_polling());
}
