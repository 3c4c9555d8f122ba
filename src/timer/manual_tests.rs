//! Tests for `ManualTimeline`.

use super::{ManualTimeline, Scheduler, TimerTask};
use crate::time::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

type Log = Arc<Mutex<Vec<(&'static str, Duration)>>>;

/// Records the clock reading each time a task fires.
fn recording_task(timeline: &ManualTimeline, log: &Log, name: &'static str) -> TimerTask {
    let timeline = timeline.clone();
    let log = Arc::clone(log);
    Box::new(move || {
        let at = timeline.now().duration_since(SystemTime::UNIX_EPOCH).unwrap();
        log.lock().unwrap().push((name, at));
    })
}

#[test]
fn clock_starts_at_epoch() {
    let timeline = ManualTimeline::new();
    assert_eq!(timeline.now(), SystemTime::UNIX_EPOCH);
    assert_eq!(timeline.elapsed(), Duration::ZERO);
}

#[test]
fn starting_at_sets_wall_clock() {
    let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let timeline = ManualTimeline::starting_at(start);
    assert_eq!(timeline.now(), start);
}

#[test]
fn advance_moves_clock_without_timers() {
    let timeline = ManualTimeline::new();
    timeline.advance(ms(250));

    assert_eq!(timeline.now(), SystemTime::UNIX_EPOCH + ms(250));
    assert_eq!(timeline.elapsed(), ms(250));
}

#[test]
fn timer_fires_at_due_time_with_clock_at_due() {
    let timeline = ManualTimeline::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    timeline.schedule_after(ms(100), recording_task(&timeline, &log, "a"));

    timeline.advance(ms(99));
    assert!(log.lock().unwrap().is_empty());

    timeline.advance(ms(50));
    assert_eq!(*log.lock().unwrap(), vec![("a", ms(100))]);
    assert_eq!(timeline.elapsed(), ms(149));
}

#[test]
fn timers_fire_in_due_order() {
    let timeline = ManualTimeline::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    timeline.schedule_after(ms(30), recording_task(&timeline, &log, "late"));
    timeline.schedule_after(ms(10), recording_task(&timeline, &log, "early"));
    timeline.schedule_after(ms(30), recording_task(&timeline, &log, "late-second"));

    timeline.advance(ms(100));

    assert_eq!(
        *log.lock().unwrap(),
        vec![("early", ms(10)), ("late", ms(30)), ("late-second", ms(30))]
    );
}

#[test]
fn cancelled_timer_does_not_fire() {
    let timeline = ManualTimeline::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let handle = timeline.schedule_after(ms(10), recording_task(&timeline, &log, "a"));
    assert_eq!(timeline.pending_timers(), 1);

    timeline.cancel(handle);
    assert_eq!(timeline.pending_timers(), 0);

    timeline.advance(ms(100));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn cancel_of_fired_timer_is_noop() {
    let timeline = ManualTimeline::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let handle = timeline.schedule_after(ms(10), recording_task(&timeline, &log, "a"));
    timeline.advance(ms(10));
    timeline.cancel(handle);

    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn task_scheduled_by_task_fires_within_same_advance() {
    let timeline = ManualTimeline::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_timeline = timeline.clone();
    let inner_log = Arc::clone(&log);
    timeline.schedule_after(
        ms(10),
        Box::new(move || {
            let task = recording_task(&inner_timeline, &inner_log, "chained");
            inner_timeline.schedule_after(ms(20), task);
        }),
    );

    timeline.advance(ms(40));
    assert_eq!(*log.lock().unwrap(), vec![("chained", ms(30))]);
}

#[test]
fn next_due_in_reports_earliest_timer() {
    let timeline = ManualTimeline::new();
    assert_eq!(timeline.next_due_in(), None);

    timeline.schedule_after(ms(80), Box::new(|| {}));
    timeline.schedule_after(ms(30), Box::new(|| {}));
    timeline.advance(ms(10));

    assert_eq!(timeline.next_due_in(), Some(ms(20)));
}

#[test]
fn wall_clock_jump_does_not_move_timers() {
    let timeline = ManualTimeline::starting_at(SystemTime::UNIX_EPOCH + ms(1_000));
    let log = Arc::new(Mutex::new(Vec::new()));

    timeline.schedule_after(ms(100), recording_task(&timeline, &log, "a"));
    timeline.set_wall_clock(SystemTime::UNIX_EPOCH + ms(500));

    timeline.advance(ms(99));
    assert!(log.lock().unwrap().is_empty());

    timeline.advance(ms(1));
    assert_eq!(*log.lock().unwrap(), vec![("a", ms(600))]);
}

#[test]
fn debug_format_includes_pending_count() {
    let timeline = ManualTimeline::new();
    timeline.schedule_after(ms(5), Box::new(|| {}));

    let debug_str = format!("{timeline:?}");
    assert!(debug_str.contains("ManualTimeline"));
    assert!(debug_str.contains("pending_timers: 1"));
}
