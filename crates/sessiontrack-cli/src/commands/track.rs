//! Interactive tracking loop.
//!
//! Runs on a single-threaded tokio runtime. Commands arrive on stdin; display
//! and advisor ticks arrive on the ticker channel. Everything that touches the
//! engine or the advisor happens on this one task.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use sessiontrack_core::{
    format_duration, BreakAdvisor, Clock, Config, CoreError, Event, Notification, Session,
    SystemClock, TickKind, Ticker, TimerEngine, TimerState, TokioTicker,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::store::JsonSessionStore;

#[derive(Args)]
pub struct TrackArgs {
    /// Session ID in the session store
    #[arg(long)]
    session: String,
    /// Title for a session not yet in the store
    #[arg(long)]
    title: Option<String>,
    /// Starting duration in seconds for a session not yet in the store
    #[arg(long)]
    duration: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "commands: start | pause | stop | reset | status | entries | \
notifications | break <id> | dismiss <id> | clear | help | quit";

pub fn run(args: TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(track(args))
}

async fn track(args: TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = JsonSessionStore::open_default()?;

    let session = match store.get(&args.session)? {
        Some(existing) => existing,
        None => {
            let mut session = Session::new(&args.session).with_duration(args.duration.unwrap_or(0));
            session.title = args.title.clone();
            store.put(&session)?;
            session
        }
    };
    tracing::info!(session_id = %session.id, duration = session.duration, "tracking session");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (ticker, mut ticks) = TokioTicker::channel();
    let ticker: Arc<dyn Ticker> = Arc::new(ticker);

    let mut engine = TimerEngine::new(session, Arc::new(store.clone()))
        .with_clock(Arc::clone(&clock))
        .with_ticker(Arc::clone(&ticker), config.timer.tick_period());
    let mut advisor = BreakAdvisor::new(config.advisor.clone())?.with_ticker(ticker);

    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_command(line.trim(), &mut engine, &mut advisor, clock.as_ref())? == Flow::Quit {
                    break;
                }
            }
            Some(tick) = ticks.recv() => match tick.kind {
                TickKind::Display => {
                    if let Some(Event::TimerTick { elapsed_secs, total_secs, .. }) = engine.tick() {
                        eprint!(
                            "\r{} elapsed | {} total ",
                            format_duration(elapsed_secs),
                            format_duration(total_secs)
                        );
                        std::io::stderr().flush()?;
                    }
                }
                TickKind::Advisor => {
                    for notification in advisor.check_engines(clock.now(), [&engine]) {
                        print_notification(&notification);
                    }
                }
            },
        }
    }

    advisor.dispose();
    finish(&mut engine);
    Ok(())
}

/// Close a still-running interval so it reaches the store before exit.
fn finish(engine: &mut TimerEngine) {
    if engine.state() == TimerState::Running {
        print_outcome(engine.pause());
    }
}

fn handle_command(
    line: &str,
    engine: &mut TimerEngine,
    advisor: &mut BreakAdvisor,
    clock: &dyn Clock,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(Flow::Continue);
    };
    let arg = parts.next();

    match (command, arg) {
        ("start", _) => print_outcome(Ok(engine.start())),
        ("pause", _) => print_outcome(engine.pause()),
        ("stop", _) => print_outcome(engine.stop()),
        ("reset", _) => print_outcome(engine.reset()),
        ("status", _) => print_event(&engine.snapshot())?,
        ("entries", _) => {
            for entry in engine.entries() {
                println!("{}", serde_json::to_string(entry)?);
            }
        }
        ("notifications", _) => {
            advisor.prune_expired(clock.now());
            for notification in advisor.notifications() {
                println!("{}", serde_json::to_string(notification)?);
            }
        }
        ("break", Some(id)) => {
            let outcome = advisor.take_action(id, engine);
            if matches!(outcome, Ok(None)) {
                eprintln!("no pause action for notification {id}");
            }
            print_outcome(outcome);
        }
        ("dismiss", Some(id)) => {
            if advisor.dismiss(id).is_none() {
                eprintln!("no notification {id}");
            }
        }
        ("clear", _) => advisor.clear_all(),
        ("help", _) => eprintln!("{HELP}"),
        ("quit" | "exit", _) => return Ok(Flow::Quit),
        _ => eprintln!("unknown command: {line}\n{HELP}"),
    }
    Ok(Flow::Continue)
}

/// Print the event of a command. Store failures become warnings: local
/// state is already committed and `status` still reports it.
fn print_outcome(outcome: Result<Option<Event>, CoreError>) {
    match outcome {
        Ok(Some(event)) => {
            if let Err(e) = print_event(&event) {
                eprintln!("error: {e}");
            }
        }
        Ok(None) => {}
        Err(e) => eprintln!("warning: {e}"),
    }
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn print_notification(notification: &Notification) {
    eprintln!();
    eprintln!("[{:?}] {}: {}", notification.kind, notification.title, notification.message);
    if let Some(action) = &notification.action {
        eprintln!("  -> `break {}` to {}", notification.id, action.label());
    }
}
