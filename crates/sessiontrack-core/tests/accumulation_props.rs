//! Property tests: persisted duration always equals the base plus the sum of
//! finalized entries, whatever sequence of commands and clock moves runs.

use std::sync::Arc;

use chrono::{Local, TimeZone};
use proptest::prelude::*;
use sessiontrack_core::{ManualClock, MemorySink, Session, TimerEngine, TimerState};

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Stop,
    Tick,
    Advance(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Start),
        3 => Just(Op::Pause),
        1 => Just(Op::Stop),
        2 => Just(Op::Tick),
        // Includes backwards steps.
        4 => (-120i64..3_600).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn persisted_matches_finalized_entries(base in 0u64..10_000, ops in prop::collection::vec(op(), 0..40)) {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
        let sink = MemorySink::new();
        let mut engine = TimerEngine::new(Session::new("p").with_duration(base), Arc::new(sink.clone()))
            .with_clock(Arc::new(clock.clone()));

        let mut last_persisted = base;
        for op in ops {
            match op {
                Op::Start => {
                    let before = engine.ledger().len();
                    let was_running = engine.state() == TimerState::Running;
                    engine.start();
                    if was_running {
                        prop_assert_eq!(engine.ledger().len(), before);
                    }
                }
                Op::Pause => { engine.pause().unwrap(); }
                Op::Stop => { engine.stop().unwrap(); }
                Op::Tick => { engine.tick(); }
                Op::Advance(secs) => clock.advance_secs(secs),
            }

            let open = engine.entries().filter(|e| e.is_open()).count();
            prop_assert!(open <= 1);
            prop_assert_eq!(open == 1, engine.state() == TimerState::Running);
            for entry in engine.entries().filter(|e| !e.is_open()) {
                let end = entry.end_time.unwrap();
                let expected = (end - entry.start_time).num_seconds().max(0) as u64;
                prop_assert_eq!(entry.duration, Some(expected));
            }

            let persisted = engine.persisted_secs();
            prop_assert_eq!(persisted, base + engine.ledger().total_duration());
            prop_assert!(persisted >= last_persisted);
            last_persisted = persisted;
        }

        if engine.ledger().finalized_count() > 0 {
            prop_assert_eq!(sink.last_duration("p"), Some(engine.persisted_secs()));
        }
    }
}
