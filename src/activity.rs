//! Activity log for booking and cancellation events.
//!
//! The allocator reports every change it makes through an [`AuditSink`]. The
//! composing application creates the [`EventLog`], hands it to the allocator,
//! and reads it back when it shuts down.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fmt;

/// Receiver of human-readable audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, description: String);
}

/// One logged event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub logged_at: DateTime<Local>,
    pub description: String,
}

impl Event {
    pub fn new(description: impl Into<String>) -> Self {
        Event {
            logged_at: Local::now(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}",
            self.logged_at.format("%a %b %d %H:%M:%S %Y"),
            self.description
        )
    }
}

/// Append-only, ordered log of events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of every event logged so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Take every event out of the log, oldest first.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl AuditSink for EventLog {
    fn record(&self, description: String) {
        self.events.lock().push(Event::new(description));
    }
}
