//! First-come slot allocation with a promoting wait list.
//!
//! The AppointmentSystem hands out slots in arrival order. Once every slot is
//! taken, new requesters join a FIFO wait list, and whenever a booked
//! requester cancels, the head of the wait list takes over the freed slot.

use crate::activity::AuditSink;
use crate::calendar::{format_hour, AppointmentList};
use crate::config::AllocatorConfig;
use crate::models::{Booking, StudentNumber};
use log::debug;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Slot allocator for one clinic day.
///
/// Booking the same student number twice is allowed and gives that number a
/// second slot or wait-list entry. Cancellation and lookups always act on the
/// first match.
#[derive(Clone)]
pub struct AppointmentSystem {
    name: String,
    config: AllocatorConfig,
    appointments: AppointmentList,
    waitlist: VecDeque<StudentNumber>,
    audit: Arc<dyn AuditSink>,
}

impl AppointmentSystem {
    /// Create an empty system.
    pub fn new(name: impl Into<String>, config: AllocatorConfig, audit: Arc<dyn AuditSink>) -> Self {
        AppointmentSystem {
            name: name.into(),
            config,
            appointments: AppointmentList::new(config.capacity, config.base_hour),
            waitlist: VecDeque::new(),
            audit,
        }
    }

    /// Rebuild a system from stored lists.
    ///
    /// The lists are taken as given; an appointment list longer or shorter
    /// than the configured capacity is kept that way.
    pub fn from_parts(
        name: impl Into<String>,
        config: AllocatorConfig,
        slots: Vec<Option<StudentNumber>>,
        waitlist: Vec<StudentNumber>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        AppointmentSystem {
            name: name.into(),
            config,
            appointments: AppointmentList::from_slots(config.capacity, config.base_hour, slots),
            waitlist: waitlist.into(),
            audit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> AllocatorConfig {
        self.config
    }

    /// Sink this system reports its changes to.
    pub fn audit_sink(&self) -> Arc<dyn AuditSink> {
        Arc::clone(&self.audit)
    }

    /// Book `student_number` into the first free slot, or onto the wait list.
    pub fn book_appointment(&mut self, student_number: StudentNumber) -> Booking {
        if let Some(index) = self.appointments.place(student_number) {
            let hour = self.appointments.hour_of(index);
            debug!("booked {} into slot {} ({})", student_number, index, format_hour(hour));
            self.audit.record(format!(
                "New patient with student number {} added to the appointment list at {}.",
                student_number,
                format_hour(hour)
            ));
            return Booking::Booked { index, hour };
        }

        self.waitlist.push_back(student_number);
        let position = self.waitlist.len();
        debug!("slots full, {} waitlisted at position {}", student_number, position);
        self.audit.record(format!(
            "New patient with student number {} added to the wait list at position {}.",
            student_number, position
        ));
        Booking::Waitlisted { position }
    }

    /// Cancel the first appointment held by `student_number`.
    ///
    /// The freed slot goes to the head of the wait list if there is one, and
    /// is left as a hole otherwise. Returns `false` if no appointment matched.
    pub fn cancel_appointment(&mut self, student_number: StudentNumber) -> bool {
        let Some(index) = self.appointments.find(student_number) else {
            return false;
        };
        let hour = format_hour(self.appointments.hour_of(index));

        match self.waitlist.pop_front() {
            Some(promoted) => {
                self.appointments.replace(index, Some(promoted));
                debug!("slot {} passed from {} to {}", index, student_number, promoted);
                self.audit.record(format!(
                    "Patient {} cancelled the {} appointment; patient {} moved from the wait list into it.",
                    student_number, hour, promoted
                ));
            }
            None => {
                self.appointments.replace(index, None);
                debug!("slot {} freed by {}", index, student_number);
                self.audit.record(format!(
                    "Patient {} cancelled the {} appointment.",
                    student_number, hour
                ));
            }
        }
        true
    }

    /// Remove the first wait-list entry for `student_number`.
    pub fn cancel_waitlist(&mut self, student_number: StudentNumber) -> bool {
        let Some(position) = self.waitlist.iter().position(|sn| *sn == student_number) else {
            return false;
        };

        self.waitlist.remove(position);
        debug!("{} left the wait list from position {}", student_number, position + 1);
        self.audit.record(format!(
            "Patient {} removed from the wait list.",
            student_number
        ));
        true
    }

    /// Start hour of the first appointment held by `student_number`.
    pub fn appointment_time(&self, student_number: StudentNumber) -> Option<u32> {
        self.appointments
            .find(student_number)
            .map(|index| self.appointments.hour_of(index))
    }

    /// One-based wait-list position of `student_number`.
    pub fn waitlist_position(&self, student_number: StudentNumber) -> Option<usize> {
        self.waitlist
            .iter()
            .position(|sn| *sn == student_number)
            .map(|index| index + 1)
    }

    /// Number of slots handed out, holes included.
    pub fn appointment_count(&self) -> usize {
        self.appointments.len()
    }

    pub fn waitlist_count(&self) -> usize {
        self.waitlist.len()
    }

    pub fn is_full(&self) -> bool {
        self.appointments.is_full()
    }

    /// See [`AppointmentList::is_empty`] for the exact boundary.
    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn waitlist_is_empty(&self) -> bool {
        self.waitlist.is_empty()
    }

    /// Raw slots in index order, `None` marking a hole.
    pub fn slots(&self) -> &[Option<StudentNumber>] {
        self.appointments.slots()
    }

    /// Occupied slots in index order, as `(hour, student number)`.
    pub fn appointments(&self) -> impl Iterator<Item = (u32, StudentNumber)> + '_ {
        self.appointments.appointments()
    }

    /// Wait list in promotion order, as `(position, student number)`.
    pub fn waitlist(&self) -> impl Iterator<Item = (usize, StudentNumber)> + '_ {
        self.waitlist
            .iter()
            .enumerate()
            .map(|(index, sn)| (index + 1, *sn))
    }
}

impl fmt::Debug for AppointmentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppointmentSystem")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("appointments", &self.appointments)
            .field("waitlist", &self.waitlist)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for AppointmentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AppointmentSystem({}, {}, waitlist={})",
            self.name,
            self.appointments,
            self.waitlist.len()
        )
    }
}
