mod engine;
mod format;

pub use engine::{Restoration, SessionPhase, Tick, TimerEngine, TimerSnapshot};
pub use format::format_hms;
