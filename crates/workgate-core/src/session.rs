//! One timer session: engine, gate and notifications wired together.
//!
//! The session is the only thing a host talks to. Every command takes the
//! current time explicitly (used for notification expiry only, never for
//! elapsed time) and returns the events it produced.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{CoreError, TransitionError};
use crate::events::Event;
use crate::gate::{GateController, GateTransition};
use crate::notify::{NotificationChannel, NotificationKind};
use crate::storage::{ClockStore, Config, NotificationsConfig};
use crate::submission::{
    WorkDraft, WorkSubmission, SUBMIT_REJECTED_MESSAGE, SUBMIT_SUCCESS_MESSAGE,
    SUBMIT_TRANSPORT_MESSAGE,
};
use crate::surface::SurfaceView;
use crate::timer::{Restoration, TimerEngine};

#[derive(Debug)]
pub struct Session<S> {
    engine: TimerEngine<S>,
    gate: GateController,
    notifications: NotificationChannel,
    submission_in_flight: bool,
    restoration: Restoration,
}

impl<S: ClockStore> Session<S> {
    /// Restore a session from `store` using the configured target.
    pub fn mount(store: S, config: &Config) -> Self {
        Self::mount_with(store, config.timer.target_seconds, &config.notifications)
    }

    pub fn mount_with(store: S, target_secs: u64, notifications: &NotificationsConfig) -> Self {
        let (engine, restoration) = TimerEngine::restore(store, target_secs);
        let gate = GateController::restored(
            engine.target_reached(),
            engine.is_stopped(),
            engine.recorded_secs(),
        );
        info!(gate = ?gate.state(), phase = ?engine.phase(), "session mounted");
        Self {
            engine,
            gate,
            notifications: NotificationChannel::new(notifications),
            submission_in_flight: false,
            restoration,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine<S> {
        &self.engine
    }

    pub fn gate(&self) -> &GateController {
        &self.gate
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    pub fn restoration(&self) -> &Restoration {
        &self.restoration
    }

    pub fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    pub fn recorded_secs(&self) -> u64 {
        self.gate.recorded_secs()
    }

    pub fn submission_in_flight(&self) -> bool {
        self.submission_in_flight
    }

    pub fn can_submit(&self) -> bool {
        self.gate.can_submit(self.submission_in_flight)
    }

    /// Whether a scheduler should be delivering ticks.
    pub fn needs_ticking(&self) -> bool {
        self.engine.is_running()
    }

    pub fn restored_event(&self, now: DateTime<Utc>) -> Event {
        Event::SessionRestored {
            elapsed_secs: self.engine.elapsed_secs(),
            gate: self.gate.state(),
            healed: self.restoration.healed.clone(),
            at: now,
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            timer: self.engine.snapshot(),
            gate: self.gate.state(),
            submission_in_flight: self.submission_in_flight,
            at: now,
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> SurfaceView {
        SurfaceView::render(self, now)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>, TransitionError> {
        if self.gate.is_stopped() {
            return Err(TransitionError::AlreadyStopped {
                recorded_secs: self.gate.recorded_secs(),
            });
        }
        let mut events = Vec::new();
        if self.engine.start() {
            events.push(Event::TimerStarted {
                elapsed_secs: self.engine.elapsed_secs(),
                at: now,
            });
        }
        Ok(events)
    }

    /// One scheduled tick. Also expires the active notification.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.expire_notifications(now);

        let Some(tick) = self.engine.tick() else {
            return events;
        };
        events.push(Event::TimerTicked {
            elapsed_secs: tick.elapsed_secs,
            remaining_secs: self.engine.remaining_secs(),
        });
        if tick.target_crossed {
            events.push(Event::TargetReached {
                elapsed_secs: tick.elapsed_secs,
                target_secs: self.engine.target_secs(),
                at: now,
            });
        }

        let transition = self.gate.observe(
            tick.elapsed_secs,
            self.engine.target_reached(),
            &mut self.notifications,
            now,
        );
        if let Some(GateTransition::Unlocked { .. }) = transition {
            events.extend(self.published(now));
        }
        events
    }

    /// Stop the timer and fix the recorded time.
    ///
    /// Only allowed while unlocked and running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>, TransitionError> {
        if self.gate.is_stopped() {
            return Err(TransitionError::AlreadyStopped {
                recorded_secs: self.gate.recorded_secs(),
            });
        }
        if !self.gate.can_stop() {
            return Err(TransitionError::StopWhileLocked);
        }
        if !self.engine.is_running() {
            return Err(TransitionError::NotRunning);
        }

        let final_elapsed = self.engine.stop();
        self.gate.on_stop(final_elapsed, &mut self.notifications, now)?;

        let mut events = vec![Event::TimerStopped {
            recorded_secs: final_elapsed,
            at: now,
        }];
        events.extend(self.published(now));
        Ok(events)
    }

    /// Validate `draft` and mark a submission in flight.
    ///
    /// An incomplete draft publishes an error notification and is refused.
    pub fn begin_submission(
        &mut self,
        draft: WorkDraft,
        now: DateTime<Utc>,
    ) -> Result<(WorkSubmission, Vec<Event>), CoreError> {
        if !self.gate.is_unlocked() {
            return Err(TransitionError::SubmissionLocked.into());
        }
        if self.submission_in_flight {
            return Err(TransitionError::SubmissionInFlight.into());
        }

        let submission = match WorkSubmission::new(draft, self.gate.recorded_secs()) {
            Ok(s) => s,
            Err(e) => {
                warn!("work draft rejected: {e}");
                self.notifications
                    .publish(e.to_string(), NotificationKind::Error, now);
                return Err(e.into());
            }
        };

        self.submission_in_flight = true;
        let events = vec![Event::SubmissionStarted {
            recorded_secs: submission.recorded_secs,
            at: now,
        }];
        Ok((submission, events))
    }

    /// Outcome reported by the form's transport.
    ///
    /// Failures without a server message fall back to a generic one.
    pub fn on_submit_result(
        &mut self,
        success: bool,
        message: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        self.submission_in_flight = false;
        if success {
            info!("work submitted");
            self.notifications
                .publish(SUBMIT_SUCCESS_MESSAGE, NotificationKind::Success, now);
        } else {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(SUBMIT_REJECTED_MESSAGE);
            warn!(%message, "work submission failed");
            self.notifications
                .publish(message, NotificationKind::Error, now);
        }

        let mut events = vec![Event::SubmissionFinished { success, at: now }];
        events.extend(self.published(now));
        events
    }

    /// The request never got an answer.
    pub fn on_submit_transport_error(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.on_submit_result(false, Some(SUBMIT_TRANSPORT_MESSAGE), now)
    }

    pub fn expire_notifications(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.notifications.expire(now) {
            vec![Event::NotificationCleared { at: now }]
        } else {
            Vec::new()
        }
    }

    fn published(&self, now: DateTime<Utc>) -> Option<Event> {
        self.notifications
            .active(now)
            .map(|n| Event::NotificationPublished {
                message: n.message,
                kind: n.kind,
                at: now,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateState, UNLOCKED_MESSAGE};
    use crate::storage::MemoryStore;
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn mount(store: &MemoryStore, target: u64) -> Session<&MemoryStore> {
        Session::mount_with(store, target, &NotificationsConfig::default())
    }

    fn draft() -> WorkDraft {
        WorkDraft {
            title: "Weekly report".into(),
            body: "All done".into(),
            photo1: Some(PathBuf::from("proof.png")),
            ..Default::default()
        }
    }

    fn count_published(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::NotificationPublished { .. }))
            .count()
    }

    #[test]
    fn stop_is_refused_while_locked() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 10);
        session.start(now()).unwrap();
        session.tick(now());
        assert_eq!(session.stop(now()), Err(TransitionError::StopWhileLocked));
        assert!(session.needs_ticking());
        assert_eq!(session.recorded_secs(), 0);
    }

    #[test]
    fn stop_is_refused_when_not_running() {
        let store = MemoryStore::with_slots([("stopwatchTime", "20"), ("targetReached", "true")]);
        let mut session = mount(&store, 10);
        assert_eq!(session.stop(now()), Err(TransitionError::NotRunning));
    }

    #[test]
    fn start_after_stop_is_refused() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 1);
        session.start(now()).unwrap();
        session.tick(now());
        session.stop(now()).unwrap();
        assert_eq!(
            session.start(now()),
            Err(TransitionError::AlreadyStopped { recorded_secs: 1 })
        );
        assert!(session.tick(now()).is_empty());
    }

    #[test]
    fn repeated_start_emits_once() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 5);
        assert_eq!(session.start(now()).unwrap().len(), 1);
        assert!(session.start(now()).unwrap().is_empty());
    }

    #[test]
    fn unlock_publishes_on_crossing_tick_only() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 3);
        session.start(now()).unwrap();

        let mut published = 0;
        for _ in 0..10 {
            published += count_published(&session.tick(now()));
        }
        assert_eq!(published, 1);
        assert_eq!(session.gate().state(), GateState::Unlocked);
    }

    #[test]
    fn notification_expires_on_later_tick() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 1);
        session.start(now()).unwrap();
        session.tick(now());
        assert_eq!(
            session.notifications().active(now()).unwrap().message,
            UNLOCKED_MESSAGE
        );

        let later = now() + chrono::Duration::seconds(5);
        let events = session.tick(later);
        assert!(matches!(events[0], Event::NotificationCleared { .. }));
        assert!(session.notifications().active(later).is_none());
    }

    #[test]
    fn notices_hide_after_stop_without_ticks() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 1);
        session.start(now()).unwrap();
        session.tick(now());
        session.stop(now()).unwrap();
        assert!(session.view(now()).notification.unwrap().visible);

        let at_deadline = now() + chrono::Duration::seconds(5);
        let fading = session.view(at_deadline).notification.unwrap();
        assert!(fading.message.starts_with("Stopwatch stopped at"));
        assert!(!fading.visible);

        let much_later = now() + chrono::Duration::seconds(60);
        assert!(session.view(much_later).notification.is_none());
        assert!(session.notifications().active(much_later).is_none());

        session.begin_submission(draft(), much_later).unwrap();
        session.on_submit_result(true, None, much_later);
        let after_submit = much_later + chrono::Duration::seconds(5);
        assert!(session.notifications().active(after_submit).is_none());
    }

    #[test]
    fn submission_requires_unlock() {
        let store = MemoryStore::new();
        let mut session = mount(&store, 10);
        let err = session.begin_submission(draft(), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::SubmissionLocked)
        ));
    }

    #[test]
    fn submission_in_flight_blocks_second_submit() {
        let store = MemoryStore::with_slots([
            ("stopwatchTime", "6000"),
            ("targetReached", "true"),
            ("stopwatchStopped", "true"),
        ]);
        let mut session = mount(&store, 5400);

        let (submission, _) = session.begin_submission(draft(), now()).unwrap();
        assert_eq!(submission.recorded_secs, 6000);
        assert!(!session.can_submit());
        assert!(matches!(
            session.begin_submission(draft(), now()),
            Err(CoreError::Transition(TransitionError::SubmissionInFlight))
        ));

        let events = session.on_submit_result(true, None, now());
        assert!(session.can_submit());
        assert_eq!(count_published(&events), 1);
        let active = session.notifications().active(now()).unwrap();
        assert_eq!(active.kind, NotificationKind::Success);
        assert_eq!(active.message, SUBMIT_SUCCESS_MESSAGE);
    }

    #[test]
    fn invalid_draft_publishes_error() {
        let store = MemoryStore::with_slots([("stopwatchTime", "5400")]);
        let mut session = mount(&store, 5400);
        let result = session.begin_submission(WorkDraft::default(), now());
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(!session.submission_in_flight());

        let active = session.notifications().active(now()).unwrap();
        assert_eq!(active.kind, NotificationKind::Error);
        assert_eq!(active.message, "Title, body, and at least one photo are required");
    }

    #[test]
    fn failed_submission_uses_server_or_default_message() {
        let store = MemoryStore::with_slots([("stopwatchTime", "5400")]);
        let mut session = mount(&store, 5400);

        session.begin_submission(draft(), now()).unwrap();
        session.on_submit_result(false, Some("Photo too large"), now());
        assert_eq!(
            session.notifications().active(now()).unwrap().message,
            "Photo too large"
        );

        session.begin_submission(draft(), now()).unwrap();
        session.on_submit_result(false, None, now());
        let active = session.notifications().active(now()).unwrap();
        assert_eq!(active.message, SUBMIT_REJECTED_MESSAGE);
        assert_eq!(active.kind, NotificationKind::Error);
        assert!(!session.submission_in_flight());

        session.begin_submission(draft(), now()).unwrap();
        session.on_submit_transport_error(now());
        assert_eq!(
            session.notifications().active(now()).unwrap().message,
            SUBMIT_TRANSPORT_MESSAGE
        );
        assert!(session.can_submit());
    }
}
