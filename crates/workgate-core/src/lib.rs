//! # Workgate Core Library
//!
//! Gates submitting a work record behind a minimum elapsed time, measured
//! by a persistent timer that survives restarts.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-counting state machine; the caller invokes
//!   `tick()` once per second and every tick is written through to storage
//! - **Gate Controller**: locks the work form until the target is reached
//!   and fixes the recorded time at stop
//! - **Notifications**: one auto-expiring message at a time
//! - **Storage**: clock slots in SQLite (or memory) and TOML configuration
//! - **Scheduler**: tokio interval feeding ticks to a single-owner session
//!
//! ## Key Components
//!
//! - [`Session`]: the entry point hosts talk to
//! - [`TimerEngine`]: core timer state machine
//! - [`GateController`]: locked / unlocked / stopped
//! - [`Database`]: durable clock store
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod gate;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod submission;
pub mod surface;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError, TransitionError, ValidationError};
pub use events::Event;
pub use gate::{GateController, GateState};
pub use notify::{Notification, NotificationChannel, NotificationKind};
pub use scheduler::{drive, Control, DriveExit, Ticker};
pub use session::Session;
pub use storage::{ClockStore, Config, Database, MemoryStore};
pub use submission::{WorkDraft, WorkSubmission};
pub use surface::SurfaceView;
pub use timer::{format_hms, SessionPhase, TimerEngine};
