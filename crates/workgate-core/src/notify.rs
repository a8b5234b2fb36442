//! Transient user-facing notifications.
//!
//! At most one notification is active. Publishing replaces whatever is
//! showing, there is no queue. Visibility is a function of time: a
//! notification is hidden once its display duration has passed, whether
//! or not anything ticks afterwards.
//!
//! After it is hidden the notification stays renderable for a short
//! fade window. Fading is presentation only: a fading notification is not
//! active and never blocks or delays a new one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::NotificationsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Presentation contract, re-rendered on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub visible: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    message: String,
    kind: NotificationKind,
    /// Display deadline, pulled forward by an explicit clear.
    hidden_at: DateTime<Utc>,
    /// Set once `expire` has reported the clear.
    expiry_reported: bool,
}

#[derive(Debug, Clone)]
pub struct NotificationChannel {
    display: Duration,
    fade: Duration,
    slot: Option<Slot>,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(&NotificationsConfig::default())
    }
}

/// `at + delta`, saturating at the latest representable instant.
fn saturating_add(at: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl NotificationChannel {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            display: config.display(),
            fade: config.fade(),
            slot: None,
        }
    }

    /// Show `message`, superseding any current notification.
    pub fn publish(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) {
        let message = message.into();
        debug!(?kind, %message, "notification published");
        self.slot = Some(Slot {
            message,
            kind,
            hidden_at: saturating_add(now, self.display),
            expiry_reported: false,
        });
    }

    /// Report the clear of the current notification once its display time
    /// is over.
    ///
    /// Visibility does not depend on this being called; it only lets a
    /// driver emit a single "cleared" event. Returns true on that call.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.slot.as_mut() {
            Some(slot) if !slot.expiry_reported && now >= slot.hidden_at => {
                slot.expiry_reported = true;
                debug!("notification expired");
                true
            }
            _ => false,
        }
    }

    /// Hide the current notification now.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        if let Some(slot) = self.slot.as_mut() {
            if now < slot.hidden_at {
                slot.hidden_at = now;
                slot.expiry_reported = true;
                debug!("notification cleared");
            }
        }
    }

    /// The notification visible at `now`, if any.
    pub fn active(&self, now: DateTime<Utc>) -> Option<Notification> {
        self.rendered(now).filter(|n| n.visible)
    }

    /// What the surface should draw at `now`: the visible notification, or
    /// a hidden one still inside its fade window.
    pub fn rendered(&self, now: DateTime<Utc>) -> Option<Notification> {
        let slot = self.slot.as_ref()?;
        if now >= saturating_add(slot.hidden_at, self.fade) {
            return None;
        }
        Some(Notification {
            message: slot.message.clone(),
            kind: slot.kind,
            visible: now < slot.hidden_at,
        })
    }
}
