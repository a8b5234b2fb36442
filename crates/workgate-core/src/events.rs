use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gate::GateState;
use crate::notify::NotificationKind;
use crate::storage::ClockSlot;
use crate::timer::TimerSnapshot;

/// Every state change in a session produces an Event.
/// Hosts render from them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionRestored {
        elapsed_secs: u64,
        gate: GateState,
        /// Slots rewritten during restoration.
        healed: Vec<ClockSlot>,
        at: DateTime<Utc>,
    },
    TimerStarted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        elapsed_secs: u64,
        remaining_secs: u64,
    },
    TargetReached {
        elapsed_secs: u64,
        target_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        recorded_secs: u64,
        at: DateTime<Utc>,
    },
    SubmissionStarted {
        recorded_secs: u64,
        at: DateTime<Utc>,
    },
    SubmissionFinished {
        success: bool,
        at: DateTime<Utc>,
    },
    NotificationPublished {
        message: String,
        kind: NotificationKind,
        at: DateTime<Utc>,
    },
    NotificationCleared {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        timer: TimerSnapshot,
        gate: GateState,
        submission_in_flight: bool,
        at: DateTime<Utc>,
    },
}
