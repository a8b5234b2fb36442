pub mod config;
pub mod timer;
pub mod work;

use serde::Serialize;
use workgate_core::Event;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_events(events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        print_json(event)?;
    }
    Ok(())
}
