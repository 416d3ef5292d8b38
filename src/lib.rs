//! Walk-in clinic appointments: a fixed day of one-hour slots handed out
//! first come, first served, with a wait list whose head is promoted into
//! any slot freed by a cancellation.

pub mod activity;
pub mod calendar;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod persistence;
pub mod scheduler;

pub use activity::{AuditSink, Event, EventLog};
pub use calendar::{format_hour, AppointmentList};
pub use config::{AllocatorConfig, AppConfig};
pub use error::{ConfigError, PersistenceError};
pub use models::{Booking, Patient, StudentNumber};
pub use persistence::{JsonStore, SystemDocument};
pub use scheduler::AppointmentSystem;
