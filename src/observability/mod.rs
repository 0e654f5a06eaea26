//! Observability for geocheck
//!
//! Structured JSON logging of typed lifecycle events. Logging is read-only
//! and never changes what gets compiled or executed.
//!
//! # Usage
//!
//! ```ignore
//! use geocheck::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CheckLoaded, &[("check", "12"), ("path", "a.xml")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // No panic
        log_event(Event::ChecksLoadBegin);
        log_event(Event::ChecksLoadComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::CheckRejected, &[("path", "/tmp/x.xml")]);
    }
}
