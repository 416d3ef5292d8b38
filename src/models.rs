//! Data models for the appointment system.
//!
//! This module defines the value types shared by the allocator, the
//! persistence adapter and the console front-end:
//! - StudentNumber: the opaque key a requester books under
//! - Patient: the stored record for one requester
//! - Booking: where a booking request landed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits a student number has at the clinic desk.
pub const STUDENT_NUMBER_DIGITS: usize = 8;

/// Identifier a requester books under.
///
/// The allocator only compares these for equality. Format rules such as the
/// eight-digit length are enforced by [`StudentNumber::parse`], which the
/// front-end calls before anything reaches the allocator.
///
/// Stored as unsigned, so negative numbers cannot be represented; saved
/// documents holding one fail to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentNumber(u32);

impl StudentNumber {
    pub const fn new(value: u32) -> Self {
        StudentNumber(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Parse a student number typed at the console.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.len() != STUDENT_NUMBER_DIGITS || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!(
                "Invalid student number: '{}'. Must be exactly {} digits",
                value, STUDENT_NUMBER_DIGITS
            ));
        }

        value
            .parse::<u32>()
            .map(StudentNumber)
            .map_err(|e| format!("Invalid student number: '{}': {}", value, e))
    }
}

impl fmt::Display for StudentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = STUDENT_NUMBER_DIGITS)
    }
}

/// Stored form of a requester inside a saved appointment system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "Student number")]
    pub student_number: StudentNumber,
}

impl From<StudentNumber> for Patient {
    fn from(student_number: StudentNumber) -> Self {
        Patient { student_number }
    }
}

/// Outcome of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Booking {
    /// Placed into the slot at `index`, which starts at `hour`.
    Booked { index: usize, hour: u32 },
    /// Every slot was taken; the requester is now last in the wait list.
    Waitlisted { position: usize },
}
