//! Playback controller over real traces

use std::time::{Duration, Instant};

use avl_trace::{record_deletion, PlaybackConfig, PlaybackController, StepKind};
use proptest::prelude::*;

use test_helpers::*;

#[test]
fn current_step_follows_cursor() {
    let (_, trace) = record_deletion(&scenario_tree(), 30);
    let mut playback = PlaybackController::attach(trace.clone()).expect("non-empty trace");

    assert_eq!(playback.current_step().kind, StepKind::Search);
    playback.step_forward();
    assert_eq!(playback.current_step().kind, StepKind::Found);
    playback.step_backward();
    assert_eq!(playback.current_step(), &trace[0]);
}

#[test]
fn full_playback_visits_every_step_once() {
    let (_, trace) = record_deletion(&scenario_tree(), 30);
    let config = PlaybackConfig::default().with_speed_ms(250);
    let mut playback = PlaybackController::with_config(trace.clone(), config).expect("valid");

    let start = Instant::now();
    let mut seen = vec![playback.current_step().kind];
    playback.play(start);

    let mut now = start;
    while playback.is_playing() {
        now += Duration::from_millis(250);
        assert_eq!(playback.poll(now), 1);
        seen.push(playback.current_step().kind);
    }

    assert_eq!(seen, trace.kinds());
    assert!(playback.is_at_end());
}

#[test]
fn pause_keeps_cursor_and_stops_ticks() {
    let (_, trace) = record_deletion(&scenario_tree(), 30);
    let config = PlaybackConfig::default().with_speed_ms(10);
    let mut playback = PlaybackController::with_config(trace, config).expect("valid");

    let start = Instant::now();
    playback.play(start);
    playback.poll(start + Duration::from_millis(20));
    let cursor = playback.cursor();
    assert_eq!(cursor, 2);

    playback.pause();
    assert_eq!(playback.poll(start + Duration::from_secs(5)), 0);
    assert_eq!(playback.cursor(), cursor);
}

#[test]
fn independent_controllers_share_nothing() {
    let (_, trace) = record_deletion(&scenario_tree(), 30);
    let mut first = PlaybackController::attach(trace.clone()).expect("valid");
    let second = PlaybackController::attach(trace).expect("valid");

    first.seek(3);
    first.play(Instant::now());
    assert_eq!(second.cursor(), 0);
    assert!(!second.is_playing());
}

#[test]
fn single_step_trace_never_plays() {
    let (_, trace) = record_deletion(&scenario_tree(), 999);
    let mut playback = PlaybackController::attach(trace).expect("valid");
    playback.play(Instant::now());

    assert!(!playback.is_playing());
    assert_eq!(playback.current_step().kind, StepKind::NotFound);
    assert!(!playback.step_forward());
    assert!(!playback.step_backward());
}

proptest! {
    #[test]
    fn cursor_walks_stay_in_bounds(
        values in proptest::collection::btree_set(-50i64..50, 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let values: Vec<_> = values.into_iter().collect();
        let target = values[pick.index(values.len())];
        let tree = avl_trace::build_tree(values.iter().copied());
        let (_, trace) = record_deletion(&tree, target);
        let len = trace.len();
        let mut playback = PlaybackController::attach(trace).expect("non-empty trace");

        let mut forward = 0;
        while playback.step_forward() {
            forward += 1;
            prop_assert!(playback.cursor() < len);
        }
        prop_assert_eq!(forward, len - 1);
        prop_assert_eq!(playback.cursor(), len - 1);

        let mut backward = 0;
        while playback.step_backward() {
            backward += 1;
        }
        prop_assert_eq!(backward, len - 1);
        prop_assert_eq!(playback.cursor(), 0);
    }
}
