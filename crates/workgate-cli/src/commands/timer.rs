use std::io::BufRead;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};
use workgate_core::storage::Database;
use workgate_core::{drive, Config, Control, DriveExit, Event, Session};

use super::{print_events, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the timer
    Start,
    /// Stop the timer and record the elapsed time
    Stop,
    /// Print current timer state and view as JSON
    Status,
    /// Start if needed and tick in the foreground, printing events as JSON.
    ///
    /// Type "stop" on stdin to stop once the form is unlocked.
    Run {
        /// Stop automatically as soon as the target is reached
        #[arg(long)]
        auto_stop: bool,
        /// Leave the timer running and exit after this many seconds
        #[arg(long)]
        max_secs: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut session = Session::mount(&db, &config);
    let now = Utc::now();

    if session.restoration().was_healed() {
        print_json(&session.restored_event(now))?;
    }

    match action {
        TimerAction::Start => {
            let events = session.start(now)?;
            if events.is_empty() {
                print_json(&session.snapshot(now))?;
            } else {
                print_events(&events)?;
            }
        }
        TimerAction::Stop => {
            let events = session.stop(now)?;
            print_events(&events)?;
        }
        TimerAction::Status => {
            let status = json!({
                "state": session.snapshot(now),
                "view": session.view(now),
            });
            print_json(&status)?;
        }
        TimerAction::Run {
            auto_stop,
            max_secs,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            print_events(&session.start(now)?)?;
            let period = config.timer.tick_interval();
            let exit =
                runtime.block_on(run_foreground(&mut session, period, auto_stop, max_secs))?;
            info!(
                ?exit,
                elapsed_secs = session.engine().elapsed_secs(),
                "timer run finished"
            );
        }
    }
    Ok(())
}

async fn run_foreground(
    session: &mut Session<&Database>,
    period: Duration,
    auto_stop: bool,
    max_secs: Option<u64>,
) -> Result<DriveExit, serde_json::Error> {
    let (tx, mut controls) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx.clone());

    if auto_stop && session.is_unlocked() {
        let _ = tx.send(Control::Stop);
    }

    let shutdown = async move {
        match max_secs {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("cannot listen for ctrl-c: {e}");
                    std::future::pending::<()>().await;
                }
            }
        }
    };

    let mut print_error = None;
    let exit = drive(session, period, &mut controls, shutdown, |event| {
        if auto_stop && matches!(event, Event::TargetReached { .. }) {
            let _ = tx.send(Control::Stop);
        }
        if let Err(e) = print_json(event) {
            print_error.get_or_insert(e);
        }
    })
    .await;

    match print_error {
        Some(e) => Err(e),
        None => Ok(exit),
    }
}

/// Forward "stop" lines from stdin as controls until stdin closes.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Control>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("stop") && tx.send(Control::Stop).is_err() {
                break;
            }
        }
    });
}
