//! Typed access to the four persisted clock slots.
//!
//! Writes are best-effort: a failed write is logged and dropped, since the
//! next tick rewrites the same slot. Reads that fail or do not parse are
//! treated as missing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ClockStore;

/// One persisted slot of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSlot {
    ElapsedSeconds,
    Running,
    TargetReached,
    Stopped,
}

impl ClockSlot {
    /// Storage key. Shared by every user of the same store.
    pub fn key(self) -> &'static str {
        match self {
            ClockSlot::ElapsedSeconds => "stopwatchTime",
            ClockSlot::Running => "stopwatchRunning",
            ClockSlot::TargetReached => "targetReached",
            ClockSlot::Stopped => "stopwatchStopped",
        }
    }
}

/// Slot values as read back from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRecord {
    /// `None` when never written or unparsable.
    pub elapsed_secs: Option<u64>,
    pub running: bool,
    pub target_reached: bool,
    pub stopped: bool,
}

/// Adapter between the timer engine and a [`ClockStore`].
#[derive(Debug)]
pub struct PersistentClock<S> {
    store: S,
    failed_writes: u64,
}

impl<S: ClockStore> PersistentClock<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            failed_writes: 0,
        }
    }

    /// Number of writes dropped since construction.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn load(&self) -> ClockRecord {
        ClockRecord {
            elapsed_secs: self.read_slot(ClockSlot::ElapsedSeconds).and_then(|raw| {
                match raw.trim().parse::<u64>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(value = %raw, "ignoring unparsable elapsed seconds: {e}");
                        None
                    }
                }
            }),
            running: self.read_flag(ClockSlot::Running),
            target_reached: self.read_flag(ClockSlot::TargetReached),
            stopped: self.read_flag(ClockSlot::Stopped),
        }
    }

    pub fn save_elapsed(&mut self, secs: u64) -> bool {
        self.write_slot(ClockSlot::ElapsedSeconds, &secs.to_string())
    }

    pub fn save_flag(&mut self, slot: ClockSlot, value: bool) -> bool {
        debug_assert!(slot != ClockSlot::ElapsedSeconds);
        self.write_slot(slot, if value { "true" } else { "false" })
    }

    fn read_flag(&self, slot: ClockSlot) -> bool {
        self.read_slot(slot).as_deref() == Some("true")
    }

    fn read_slot(&self, slot: ClockSlot) -> Option<String> {
        match self.store.read(slot.key()) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = slot.key(), "clock slot read failed: {e}");
                None
            }
        }
    }

    fn write_slot(&mut self, slot: ClockSlot, value: &str) -> bool {
        match self.store.write(slot.key(), value) {
            Ok(()) => {
                debug!(key = slot.key(), value, "clock slot persisted");
                true
            }
            Err(e) => {
                self.failed_writes += 1;
                warn!(key = slot.key(), value, "clock slot write dropped: {e}");
                false
            }
        }
    }
}
