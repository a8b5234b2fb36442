//! One-second tick scheduling for a session.
//!
//! A [`Ticker`] owns a background interval task that only signals; every
//! state mutation happens in [`drive`], on the task that owns the session.
//! Dropping the ticker aborts its task, so every exit path of `drive`
//! (stop, shutdown, closed channel, unwinding) releases the schedule.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::session::Session;
use crate::storage::ClockStore;

/// Handle for a running tick schedule.
///
/// Drop this to stop ticking.
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<()>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start signalling every `period`, first signal one period from now.
    ///
    /// Late ticks are delayed rather than bursted, so a stalled consumer
    /// loses ticks instead of receiving a catch-up flood.
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        debug!(?period, "ticker spawned");
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Wait for the next tick. `None` once cancelled.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Stop the schedule explicitly.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.rx.close();
            debug!("ticker cancelled");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Commands accepted by a driven session between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Stop,
}

/// Why [`drive`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveExit {
    /// The session was not running, nothing was scheduled.
    NotRunning,
    /// The timer stopped; the schedule was cancelled.
    Stopped,
    /// The shutdown future completed (teardown).
    Shutdown,
    /// The ticker went away underneath us.
    TickerClosed,
}

/// Tick `session` every `period` until it stops or `shutdown` resolves.
///
/// Events are reported through `on_event` in the order they happen.
/// Rejected controls (e.g. stop while locked) are logged and ignored.
pub async fn drive<S, F, E>(
    session: &mut Session<S>,
    period: Duration,
    controls: &mut mpsc::UnboundedReceiver<Control>,
    shutdown: F,
    mut on_event: E,
) -> DriveExit
where
    S: ClockStore,
    F: Future<Output = ()>,
    E: FnMut(&Event),
{
    if !session.needs_ticking() {
        return DriveExit::NotRunning;
    }

    let mut ticker = Ticker::spawn(period);
    tokio::pin!(shutdown);
    info!(elapsed_secs = session.engine().elapsed_secs(), "driving session");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(elapsed_secs = session.engine().elapsed_secs(), "session teardown");
                return DriveExit::Shutdown;
            }
            Some(control) = controls.recv() => match control {
                Control::Stop => match session.stop(Utc::now()) {
                    Ok(events) => {
                        ticker.cancel();
                        events.iter().for_each(&mut on_event);
                        return DriveExit::Stopped;
                    }
                    Err(e) => warn!("stop ignored: {e}"),
                },
            },
            tick = ticker.next() => {
                if tick.is_none() {
                    return DriveExit::TickerClosed;
                }
                session.tick(Utc::now()).iter().for_each(&mut on_event);
                if !session.needs_ticking() {
                    ticker.cancel();
                    return DriveExit::Stopped;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, NotificationsConfig};
    use tokio::time::sleep;

    fn mounted(store: &MemoryStore, target: u64) -> Session<&MemoryStore> {
        Session::mount_with(store, target, &NotificationsConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn one_tick_per_period() {
        let store = MemoryStore::new();
        let mut session = mounted(&store, 5400);
        session.start(Utc::now()).unwrap();
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let mut ticks = 0;
        let exit = drive(
            &mut session,
            Duration::from_secs(1),
            &mut rx,
            sleep(Duration::from_millis(10_500)),
            |e| {
                if matches!(e, Event::TimerTicked { .. }) {
                    ticks += 1;
                }
            },
        )
        .await;

        assert_eq!(exit, DriveExit::Shutdown);
        assert_eq!(ticks, 10);
        assert_eq!(session.engine().elapsed_secs(), 10);
        assert!(session.needs_ticking());
        assert_eq!(store.get("stopwatchTime").as_deref(), Some("10"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_control_cancels_schedule() {
        let store = MemoryStore::new();
        let mut session = mounted(&store, 3);
        session.start(Utc::now()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            sleep(Duration::from_millis(1_500)).await;
            // Still locked: ignored.
            tx.send(Control::Stop).unwrap();
            sleep(Duration::from_secs(4)).await;
            tx.send(Control::Stop).unwrap();
        });

        let mut events = Vec::new();
        let exit = drive(
            &mut session,
            Duration::from_secs(1),
            &mut rx,
            sleep(Duration::from_secs(60)),
            |e| events.push(e.clone()),
        )
        .await;

        assert_eq!(exit, DriveExit::Stopped);
        assert_eq!(session.recorded_secs(), 5);
        assert_eq!(session.engine().elapsed_secs(), 5);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TimerStopped { recorded_secs: 5, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_is_not_scheduled() {
        let store = MemoryStore::new();
        let mut session = mounted(&store, 3);
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let exit = drive(
            &mut session,
            Duration::from_secs(1),
            &mut rx,
            sleep(Duration::from_secs(5)),
            |_| {},
        )
        .await;
        assert_eq!(exit, DriveExit::NotRunning);
        assert_eq!(session.engine().elapsed_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_yields_none() {
        let mut ticker = Ticker::spawn(Duration::from_secs(1));
        assert!(ticker.next().await.is_some());
        ticker.cancel();
        assert!(!ticker.is_active());
        assert!(ticker.next().await.is_none());
    }
}
