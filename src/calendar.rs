//! Slot sequence for a single clinic day.
//!
//! The AppointmentList holds one entry per one-hour slot. A cancelled slot is
//! kept as an empty hole rather than removed, because the index of an entry is
//! what decides its start time.

use crate::models::StudentNumber;
use chrono::NaiveTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentList {
    capacity: usize,
    base_hour: u32,
    slots: Vec<Option<StudentNumber>>,
}

impl AppointmentList {
    /// Create an empty list with room for `capacity` slots starting at `base_hour`.
    pub fn new(capacity: usize, base_hour: u32) -> Self {
        AppointmentList {
            capacity,
            base_hour,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Rebuild a list from stored slots.
    ///
    /// The slots are taken as given, even when there are more or fewer of them
    /// than `capacity`.
    pub fn from_slots(capacity: usize, base_hour: u32, slots: Vec<Option<StudentNumber>>) -> Self {
        AppointmentList {
            capacity,
            base_hour,
            slots,
        }
    }

    /// Number of slots handed out so far, holes included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<StudentNumber>] {
        &self.slots
    }

    pub fn has_hole(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        !self.has_hole() && self.slots.len() == self.capacity
    }

    /// Reporting notion of "empty".
    ///
    /// A list holding one hole counts as empty, a list holding two holes does
    /// not. Callers rely on this exact boundary.
    pub fn is_empty(&self) -> bool {
        if self.has_hole() {
            self.slots.len() == 1
        } else {
            self.slots.is_empty()
        }
    }

    /// Start hour of the slot at `index`.
    pub fn hour_of(&self, index: usize) -> u32 {
        self.base_hour + index as u32
    }

    /// Index of the first occupied slot held by `student_number`.
    pub fn find(&self, student_number: StudentNumber) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| *slot == Some(student_number))
    }

    /// Put `student_number` into the lowest hole, or append a new slot.
    ///
    /// Returns `None` without touching the list when it is full.
    pub fn place(&mut self, student_number: StudentNumber) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(student_number);
            return Some(index);
        }

        self.slots.push(Some(student_number));
        Some(self.slots.len() - 1)
    }

    /// Overwrite the slot at `index` and return what was there.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a slot that has been handed out.
    pub fn replace(&mut self, index: usize, entry: Option<StudentNumber>) -> Option<StudentNumber> {
        std::mem::replace(&mut self.slots[index], entry)
    }

    /// Occupied slots in index order, as `(hour, student number)`.
    pub fn appointments(&self) -> impl Iterator<Item = (u32, StudentNumber)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|sn| (self.hour_of(index), sn)))
    }
}

impl fmt::Display for AppointmentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.slots.iter().filter(|s| s.is_some()).count();
        write!(
            f,
            "AppointmentList(slots={}/{}, occupied={}, opens={})",
            self.slots.len(),
            self.capacity,
            occupied,
            format_hour(self.base_hour)
        )
    }
}

/// Render a slot start hour as `HH:MM`.
///
/// Hours past the end of the day only appear after loading an oversized list;
/// they are rendered as a plain hour count.
pub fn format_hour(hour: u32) -> String {
    NaiveTime::from_hms_opt(hour, 0, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| format!("{}:00", hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sn(value: u32) -> StudentNumber {
        StudentNumber::new(value)
    }

    #[test]
    fn place_appends_until_capacity() {
        let mut list = AppointmentList::new(3, 8);
        assert_eq!(list.place(sn(1)), Some(0));
        assert_eq!(list.place(sn(2)), Some(1));
        assert_eq!(list.place(sn(3)), Some(2));
        assert!(list.is_full());
        assert_eq!(list.place(sn(4)), None);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn place_fills_lowest_hole_first() {
        let mut list = AppointmentList::from_slots(4, 8, vec![Some(sn(1)), None, Some(sn(3)), None]);
        assert_eq!(list.place(sn(9)), Some(1));
        assert_eq!(list.place(sn(10)), Some(3));
        assert!(list.is_full());
    }

    #[test]
    fn oversized_list_without_holes_keeps_growing() {
        let mut list = AppointmentList::from_slots(2, 8, vec![Some(sn(1)), Some(sn(2)), Some(sn(3))]);
        assert!(!list.is_full());
        assert_eq!(list.place(sn(4)), Some(3));
        assert_eq!(list.hour_of(3), 11);
    }

    #[test]
    fn empty_boundary_counts_a_single_hole_only() {
        assert!(AppointmentList::new(9, 8).is_empty());
        assert!(AppointmentList::from_slots(9, 8, vec![None]).is_empty());
        assert!(!AppointmentList::from_slots(9, 8, vec![None, None]).is_empty());
        assert!(!AppointmentList::from_slots(9, 8, vec![Some(sn(1))]).is_empty());
    }

    #[test]
    fn appointments_skip_holes_but_keep_hours() {
        let list = AppointmentList::from_slots(9, 8, vec![Some(sn(1)), None, Some(sn(3))]);
        let listed: Vec<_> = list.appointments().collect();
        assert_eq!(listed, vec![(8, sn(1)), (10, sn(3))]);
    }

    #[test]
    fn find_returns_lowest_index() {
        let list = AppointmentList::from_slots(9, 8, vec![None, Some(sn(5)), Some(sn(5))]);
        assert_eq!(list.find(sn(5)), Some(1));
        assert_eq!(list.find(sn(6)), None);
    }

    #[test]
    fn display_summarises_the_day() {
        let list = AppointmentList::from_slots(9, 8, vec![Some(sn(1)), None, Some(sn(3))]);
        assert_eq!(
            list.to_string(),
            "AppointmentList(slots=3/9, occupied=2, opens=08:00)"
        );
    }

    #[test]
    fn format_hour_renders_clock_time() {
        assert_eq!(format_hour(8), "08:00");
        assert_eq!(format_hour(16), "16:00");
        assert_eq!(format_hour(25), "25:00");
    }
}
