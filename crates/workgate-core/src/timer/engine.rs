//! Timer engine implementation.
//!
//! The engine is a tick-counting state machine. It does not use internal
//! threads and never reads the wall clock: the caller invokes `tick()` once
//! per elapsed period, and each call adds exactly one second. A suspended
//! host that misses ticks therefore undercounts, it never overcounts.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> Running -> TargetReachedRunning -> Stopped
//!                  \-> Suspended (restored, not running) -> Running
//! ```
//!
//! Every mutation is written through to the clock store before the caller
//! sees its result.
//!
//! ## Usage
//!
//! ```ignore
//! let (mut engine, _) = TimerEngine::restore(store, 5400);
//! engine.start();
//! // Once per second:
//! if let Some(tick) = engine.tick() { /* observe */ }
//! let recorded = engine.stop();
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::{ClockRecord, ClockSlot, ClockStore, PersistentClock};

/// Canonical read model over the persisted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    TargetReachedRunning,
    /// Progress exists but the timer is not ticking.
    Suspended,
    Stopped,
}

/// Result of one accepted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub elapsed_secs: u64,
    /// True only on the tick that set the target-reached flag.
    pub target_crossed: bool,
}

/// What restoration found and what it had to correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restoration {
    pub record: ClockRecord,
    /// Slots rewritten because the persisted combination was inconsistent.
    pub healed: Vec<ClockSlot>,
}

impl Restoration {
    pub fn was_healed(&self) -> bool {
        !self.healed.is_empty()
    }
}

/// Serializable view of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: SessionPhase,
    pub elapsed_secs: u64,
    pub target_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    pub target_reached: bool,
    pub stopped: bool,
    pub recorded_secs: u64,
}

/// Core timer engine.
///
/// Owns its storage adapter; one instance per session.
#[derive(Debug)]
pub struct TimerEngine<S> {
    clock: PersistentClock<S>,
    target_secs: u64,
    elapsed_secs: u64,
    running: bool,
    target_reached: bool,
    stopped: bool,
    /// 0 until stop.
    recorded_secs: u64,
}

impl<S: ClockStore> TimerEngine<S> {
    /// Rebuild the engine from whatever the store holds.
    ///
    /// Inconsistent combinations are corrected and the corrections written
    /// back:
    /// - elapsed at or past the target without the target flag sets the flag
    /// - stopped while still marked running clears the running flag
    pub fn restore(store: S, target_secs: u64) -> (Self, Restoration) {
        let mut clock = PersistentClock::new(store);
        let record = clock.load();
        let mut healed = Vec::new();

        let elapsed_secs = record.elapsed_secs.unwrap_or(0);
        let mut target_reached = record.target_reached;
        let mut running = record.running;

        if elapsed_secs >= target_secs && !target_reached {
            target_reached = true;
            clock.save_flag(ClockSlot::TargetReached, true);
            healed.push(ClockSlot::TargetReached);
            info!(elapsed_secs, target_secs, "restored past target without flag, corrected");
        }

        if record.stopped && running {
            running = false;
            clock.save_flag(ClockSlot::Running, false);
            healed.push(ClockSlot::Running);
            info!(elapsed_secs, "restored stopped session marked running, corrected");
        }

        let recorded_secs = if record.stopped { elapsed_secs } else { 0 };

        let engine = Self {
            clock,
            target_secs,
            elapsed_secs,
            running,
            target_reached,
            stopped: record.stopped,
            recorded_secs,
        };
        info!(
            elapsed_secs,
            running,
            target_reached,
            stopped = record.stopped,
            "timer restored"
        );
        (engine, Restoration { record, healed })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.target_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn target_reached(&self) -> bool {
        self.target_reached
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn recorded_secs(&self) -> u64 {
        self.recorded_secs
    }

    pub fn clock(&self) -> &PersistentClock<S> {
        &self.clock
    }

    pub fn phase(&self) -> SessionPhase {
        if self.stopped {
            SessionPhase::Stopped
        } else if self.running && self.target_reached {
            SessionPhase::TargetReachedRunning
        } else if self.running {
            SessionPhase::Running
        } else if self.elapsed_secs == 0 && !self.target_reached {
            SessionPhase::NotStarted
        } else {
            SessionPhase::Suspended
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            elapsed_secs: self.elapsed_secs,
            target_secs: self.target_secs,
            remaining_secs: self.remaining_secs(),
            running: self.running,
            target_reached: self.target_reached,
            stopped: self.stopped,
            recorded_secs: self.recorded_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns true when the timer went from idle to running.
    ///
    /// No-op when already running or once stopped.
    pub fn start(&mut self) -> bool {
        if self.running || self.stopped {
            return false;
        }
        self.running = true;
        self.clock.save_flag(ClockSlot::Running, true);
        info!(elapsed_secs = self.elapsed_secs, "timer started");
        true
    }

    /// Advance by one second. Ignored (returns `None`) unless running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }

        self.elapsed_secs += 1;
        self.clock.save_elapsed(self.elapsed_secs);

        let target_crossed = self.elapsed_secs >= self.target_secs && !self.target_reached;
        if target_crossed {
            self.target_reached = true;
            self.clock.save_flag(ClockSlot::TargetReached, true);
            info!(elapsed_secs = self.elapsed_secs, "target reached");
        } else {
            debug!(elapsed_secs = self.elapsed_secs, "tick");
        }

        Some(Tick {
            elapsed_secs: self.elapsed_secs,
            target_crossed,
        })
    }

    /// Stop ticking and capture the recorded time.
    ///
    /// When not running this changes nothing and returns the current
    /// elapsed value; a recorded time is never overwritten.
    pub fn stop(&mut self) -> u64 {
        if !self.running {
            return self.elapsed_secs;
        }
        self.running = false;
        self.clock.save_flag(ClockSlot::Running, false);
        if !self.stopped {
            self.recorded_secs = self.elapsed_secs;
            self.stopped = true;
            self.clock.save_flag(ClockSlot::Stopped, true);
        }
        info!(recorded_secs = self.recorded_secs, "timer stopped");
        self.recorded_secs
    }
}
