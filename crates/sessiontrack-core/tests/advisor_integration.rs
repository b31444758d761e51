//! Integration tests for the break advisor over live timer engines.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use sessiontrack_core::{
    AdvisorConfig, BreakAdvisor, Clock, ManualClock, MemorySink, NotificationKind, QuietHours,
    Session, SessionStatus, TimerEngine, TimerState,
};

fn at(h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
}

fn scenario_config() -> AdvisorConfig {
    AdvisorConfig {
        break_interval: 25,
        quiet_hours: QuietHours { start: 22, end: 8 },
        ..AdvisorConfig::default()
    }
}

#[test]
fn test_break_reminder_at_hour_14() {
    let clock = ManualClock::new(at(13, 40));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(14, 4));
    assert!(advisor.check_engines(clock.now(), [&engine]).is_empty());

    clock.set(at(14, 6));
    let raised = advisor.check_engines(clock.now(), [&engine]);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind, NotificationKind::Break);
    assert_eq!(advisor.notifications().count(), 1);
}

#[test]
fn test_break_reminder_suppressed_at_hour_23() {
    let clock = ManualClock::new(at(22, 40));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(23, 6));
    assert!(advisor.check_engines(clock.now(), [&engine]).is_empty());
    assert_eq!(advisor.notifications().count(), 0);
}

#[test]
fn test_break_action_pauses_session() {
    let clock = ManualClock::new(at(13, 40));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(14, 6));
    let raised = advisor.check_engines(clock.now(), [&engine]);
    let id = raised[0].id.clone();

    let event = advisor.take_action(&id, &mut engine).unwrap();
    assert!(event.is_some());
    assert_eq!(engine.state(), TimerState::Paused);
    assert_eq!(engine.persisted_secs(), 26 * 60);
    assert_eq!(sink.last_duration("s1"), Some(26 * 60));
    assert_eq!(sink.last_status("s1"), Some(SessionStatus::Paused));
    assert!(advisor.get(&id).is_none());

    // A paused session no longer trips the threshold.
    clock.set(at(14, 7));
    assert!(advisor.check_engines(clock.now(), [&engine]).is_empty());
}

#[test]
fn test_action_for_other_session_is_ignored() {
    let clock = ManualClock::new(at(13, 40));
    let sink = MemorySink::new();
    let mut a =
        TimerEngine::new(Session::new("a"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut b =
        TimerEngine::new(Session::new("b"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    a.start();
    clock.set(at(14, 6));
    let raised = advisor.check_engines(clock.now(), [&a, &b]);
    assert_eq!(raised.len(), 1);

    assert!(advisor.take_action(&raised[0].id, &mut b).unwrap().is_none());
    assert_eq!(a.state(), TimerState::Running);
    assert!(advisor.get(&raised[0].id).is_some());
}

#[test]
fn test_summary_reports_stopped_sessions() {
    let clock = ManualClock::new(at(16, 0));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(17, 0));
    engine.stop().unwrap();

    clock.set(at(18, 0));
    let raised = advisor.check_engines(clock.now(), [&engine]);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind, NotificationKind::Summary);
    assert!(raised[0].message.contains("1:00:00"));
    assert!(raised[0].message.contains("1 completed"));
}

#[test]
fn test_break_action_after_reset_writes_nothing() {
    let clock = ManualClock::new(at(13, 40));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(14, 6));
    let raised = advisor.check_engines(clock.now(), [&engine]);
    let id = raised[0].id.clone();

    engine.reset().unwrap();
    let writes = sink.calls().len();

    assert!(advisor.take_action(&id, &mut engine).unwrap().is_none());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(sink.calls().len(), writes);
    assert_eq!(sink.last_status("s1"), None);
    // Nothing was acted on, so the notification stays in the log.
    assert!(advisor.get(&id).is_some());
}

#[test]
fn test_break_action_on_stopped_session_keeps_notification() {
    let clock = ManualClock::new(at(13, 40));
    let sink = MemorySink::new();
    let mut engine =
        TimerEngine::new(Session::new("s1"), Arc::new(sink.clone())).with_clock(Arc::new(clock.clone()));
    let mut advisor = BreakAdvisor::new(scenario_config()).unwrap();

    engine.start();
    clock.set(at(14, 6));
    let raised = advisor.check_engines(clock.now(), [&engine]);
    let id = raised[0].id.clone();

    engine.stop().unwrap();
    assert!(advisor.take_action(&id, &mut engine).unwrap().is_none());
    assert_eq!(sink.last_status("s1"), Some(SessionStatus::Completed));
    assert!(advisor.get(&id).is_some());
}
