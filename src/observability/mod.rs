//! Observability subsystem for flatdb
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Begin/complete scopes around load and save
//!
//! Observability is read-only: it never changes the outcome of the
//! operation it observes.

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::info(event.as_str(), fields);
}
