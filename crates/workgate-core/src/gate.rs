//! Gate controller for the dependent work form.
//!
//! ## States
//!
//! - **Locked**: target not reached, form and stop control disabled
//! - **Unlocked**: target reached, stop and submit available
//! - **Stopped**: time recorded, terminal for the session
//!
//! ```text
//! Locked --target reached--> Unlocked --stop--> Stopped
//! ```
//!
//! Locked -> Stopped is refused. The unlock and stop notifications are each
//! published at most once per session, no matter how often the gate is
//! asked to observe the same state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TransitionError;
use crate::notify::{NotificationChannel, NotificationKind};
use crate::timer::format_hms;

pub const UNLOCKED_MESSAGE: &str =
    "Form is now active! You can stop the stopwatch and submit your work.";

pub fn stopped_message(recorded_secs: u64) -> String {
    format!(
        "Stopwatch stopped at {}. Your time has been recorded.",
        format_hms(recorded_secs)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Locked,
    Unlocked,
    Stopped,
}

/// A state change made by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    Unlocked { elapsed_secs: u64 },
    Stopped { recorded_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct GateController {
    state: GateState,
    recorded_secs: u64,
}

impl GateController {
    /// Initial gate for a restored timer. Restoration never notifies.
    pub fn restored(target_reached: bool, stopped: bool, recorded_secs: u64) -> Self {
        let state = if stopped {
            GateState::Stopped
        } else if target_reached {
            GateState::Unlocked
        } else {
            GateState::Locked
        };
        Self {
            state,
            recorded_secs: if stopped { recorded_secs } else { 0 },
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Purely derived from the target having been reached.
    pub fn is_unlocked(&self) -> bool {
        self.state != GateState::Locked
    }

    pub fn is_stopped(&self) -> bool {
        self.state == GateState::Stopped
    }

    /// 0 until the session is stopped.
    pub fn recorded_secs(&self) -> u64 {
        self.recorded_secs
    }

    /// True when unlocked and nothing is in flight.
    pub fn can_submit(&self, submission_in_flight: bool) -> bool {
        self.is_unlocked() && !submission_in_flight
    }

    /// Whether the stop control may be offered.
    pub fn can_stop(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Feed the engine's latest state. Level-triggered: safe to call on
    /// every tick and on every re-render.
    pub fn observe(
        &mut self,
        elapsed_secs: u64,
        target_reached: bool,
        notifications: &mut NotificationChannel,
        now: DateTime<Utc>,
    ) -> Option<GateTransition> {
        if self.state != GateState::Locked || !target_reached {
            return None;
        }
        self.state = GateState::Unlocked;
        info!(elapsed_secs, "gate unlocked");
        notifications.publish(UNLOCKED_MESSAGE, NotificationKind::Success, now);
        Some(GateTransition::Unlocked { elapsed_secs })
    }

    /// Take the value returned by the engine's stop and fix it for the
    /// rest of the session.
    pub fn on_stop(
        &mut self,
        final_elapsed: u64,
        notifications: &mut NotificationChannel,
        now: DateTime<Utc>,
    ) -> Result<GateTransition, TransitionError> {
        match self.state {
            GateState::Locked => {
                warn!(final_elapsed, "stop refused while locked");
                Err(TransitionError::StopWhileLocked)
            }
            GateState::Stopped => Err(TransitionError::AlreadyStopped {
                recorded_secs: self.recorded_secs,
            }),
            GateState::Unlocked => {
                self.state = GateState::Stopped;
                self.recorded_secs = final_elapsed;
                info!(recorded_secs = final_elapsed, "gate stopped");
                notifications.publish(
                    stopped_message(final_elapsed),
                    NotificationKind::Info,
                    now,
                );
                Ok(GateTransition::Stopped {
                    recorded_secs: final_elapsed,
                })
            }
        }
    }
}
