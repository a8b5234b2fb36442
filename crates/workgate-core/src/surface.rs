//! View-model for the presentation surface.
//!
//! Everything a page needs to draw the header timer, the form lock and the
//! banners, computed from a session at a given instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notify::Notification;
use crate::session::Session;
use crate::storage::ClockStore;
use crate::timer::format_hms;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceView {
    pub elapsed: String,
    pub target: String,
    /// Only while the target is still ahead.
    pub remaining: Option<String>,
    pub show_start: bool,
    pub show_stop: bool,
    pub form_enabled: bool,
    pub submit_enabled: bool,
    /// Only once a time has been recorded.
    pub recorded: Option<String>,
    pub locked_banner: Option<String>,
    pub ready_banner: Option<String>,
    /// Includes a cleared notification during its fade window.
    pub notification: Option<Notification>,
}

pub const READY_BANNER: &str = "You can now stop the stopwatch and submit your work. \
     The recorded time will be included with your submission.";

impl SurfaceView {
    pub fn render<S: ClockStore>(session: &Session<S>, now: DateTime<Utc>) -> Self {
        let engine = session.engine();
        let gate = session.gate();
        let unlocked = gate.is_unlocked();
        let recorded_secs = gate.recorded_secs();

        let locked_banner = (!unlocked).then(|| {
            format!(
                "The form will become active after {}. Current time: {}",
                format_hms(engine.target_secs()),
                format_hms(engine.elapsed_secs())
            )
        });

        Self {
            elapsed: format_hms(engine.elapsed_secs()),
            target: format_hms(engine.target_secs()),
            remaining: (!engine.target_reached()).then(|| format_hms(engine.remaining_secs())),
            show_start: !engine.is_running() && !engine.is_stopped(),
            show_stop: engine.target_reached() && engine.is_running() && gate.can_stop(),
            form_enabled: unlocked,
            submit_enabled: session.can_submit(),
            recorded: (recorded_secs > 0).then(|| format_hms(recorded_secs)),
            locked_banner,
            ready_banner: (unlocked && recorded_secs == 0).then(|| READY_BANNER.to_string()),
            notification: session.notifications().rendered(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, NotificationsConfig};

    fn session(store: &MemoryStore, target: u64) -> Session<&MemoryStore> {
        Session::mount_with(store, target, &NotificationsConfig::default())
    }

    #[test]
    fn fresh_session_is_locked() {
        let store = MemoryStore::new();
        let view = SurfaceView::render(&session(&store, 5400), Utc::now());
        assert_eq!(view.elapsed, "00:00:00");
        assert_eq!(view.remaining.as_deref(), Some("01:30:00"));
        assert!(view.show_start);
        assert!(!view.show_stop);
        assert!(!view.form_enabled);
        assert!(!view.submit_enabled);
        assert_eq!(
            view.locked_banner.as_deref(),
            Some("The form will become active after 01:30:00. Current time: 00:00:00")
        );
        assert!(view.ready_banner.is_none());
        assert!(view.notification.is_none());
    }

    #[test]
    fn unlocked_running_session_offers_stop() {
        let store = MemoryStore::new();
        let mut s = session(&store, 2);
        let now = Utc::now();
        s.start(now).unwrap();
        s.tick(now);
        s.tick(now);

        let view = SurfaceView::render(&s, now);
        assert!(view.show_stop);
        assert!(!view.show_start);
        assert!(view.form_enabled);
        assert!(view.submit_enabled);
        assert!(view.remaining.is_none());
        assert!(view.locked_banner.is_none());
        assert_eq!(view.ready_banner.as_deref(), Some(READY_BANNER));
        assert!(view.notification.unwrap().visible);
    }

    #[test]
    fn stopped_session_shows_recorded_time() {
        let store = MemoryStore::new();
        let mut s = session(&store, 1);
        let now = Utc::now();
        s.start(now).unwrap();
        for _ in 0..90 {
            s.tick(now);
        }
        s.stop(now).unwrap();

        let view = SurfaceView::render(&s, now);
        assert_eq!(view.recorded.as_deref(), Some("00:01:30"));
        assert!(!view.show_stop);
        assert!(!view.show_start);
        assert!(view.ready_banner.is_none());
        assert!(view.form_enabled);
    }
}
