//! Timetable (solution) model.
//!
//! An [`Assignment`] binds one weekly occurrence of a course session to a
//! concrete room and time slot. A [`Timetable`] is the full set of
//! assignments for one generation run.
//!
//! # Validity
//! A timetable is valid iff every composite key (teacher+slot, room+slot,
//! semester+section+slot) is unique and every lab sits in a lab-capable room.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CourseSession, HardConstraints, Room, SessionType, TimeSlot};

/// One concrete (course, teacher, room, slot) binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    /// Course identifier.
    pub course_id: String,
    /// Course display name.
    pub course_name: String,
    /// Course catalog code.
    pub course_code: String,
    /// Teacher identifier.
    pub teacher_id: String,
    /// Teacher display name.
    pub teacher_name: String,
    /// Assigned room ID.
    pub room_id: String,
    /// Assigned room name.
    pub room_name: String,
    /// Assigned time slot ID.
    pub time_slot_id: String,
    /// Day of the assigned slot.
    pub day: Weekday,
    /// Slot start.
    pub start_time: NaiveTime,
    /// Slot end.
    pub end_time: NaiveTime,
    /// Ordinal of the slot within its day.
    pub slot_index: u32,
    /// Session kind.
    pub session_type: SessionType,
    /// Cohort semester.
    pub semester: u32,
    /// Cohort section.
    pub section: String,
}

impl Assignment {
    /// Binds a session occurrence to a slot and room.
    pub fn new(session: &CourseSession, slot: &TimeSlot, room: &Room) -> Self {
        Self {
            course_id: session.course_id.clone(),
            course_name: session.course_name.clone(),
            course_code: session.course_code.clone(),
            teacher_id: session.teacher_id.clone(),
            teacher_name: session.teacher_name.clone(),
            room_id: room.id.clone(),
            room_name: room.name.clone(),
            time_slot_id: slot.id.clone(),
            day: slot.day,
            start_time: slot.start_time,
            end_time: slot.end_time,
            slot_index: slot.slot_index,
            session_type: session.session_type,
            semester: session.semester,
            section: session.section.clone(),
        }
    }

    /// Moves this assignment to another slot, keeping the room.
    pub fn move_to_slot(&mut self, slot: &TimeSlot) {
        self.time_slot_id.clone_from(&slot.id);
        self.day = slot.day;
        self.start_time = slot.start_time;
        self.end_time = slot.end_time;
        self.slot_index = slot.slot_index;
    }

    /// Moves this assignment to another room, keeping the slot.
    pub fn move_to_room(&mut self, room: &Room) {
        self.room_id.clone_from(&room.id);
        self.room_name.clone_from(&room.name);
    }

    /// Human-readable time label, e.g. `Mon 09:00`.
    pub fn time_label(&self) -> String {
        format!("{} {}", self.day, self.start_time.format("%H:%M"))
    }

    /// The first enabled pairwise hard constraint broken by `self` and `other`.
    ///
    /// Only slot-sharing rules are checked here; room type and daily caps
    /// need context beyond the pair.
    pub fn clashes_with(&self, other: &Self, hard: &HardConstraints) -> Option<ViolationType> {
        if self.time_slot_id != other.time_slot_id {
            return None;
        }
        if hard.no_teacher_conflict && self.teacher_id == other.teacher_id {
            return Some(ViolationType::TeacherConflict);
        }
        if hard.no_room_conflict && self.room_id == other.room_id {
            return Some(ViolationType::RoomConflict);
        }
        if hard.no_student_conflict
            && self.semester == other.semester
            && self.section == other.section
        {
            return Some(ViolationType::StudentConflict);
        }
        None
    }
}

/// A hard-constraint violation found in a timetable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (teacher, room, cohort, or course).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Positions of the involved assignments.
    pub assignment_indices: Vec<usize>,
}

/// Classification of hard-constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A teacher is booked twice in one slot.
    TeacherConflict,
    /// A room is booked twice in one slot.
    RoomConflict,
    /// A student cohort is booked twice in one slot.
    StudentConflict,
    /// A lab is placed in a room that cannot host labs.
    RoomTypeMismatch,
    /// A teacher exceeds the daily session cap.
    TeacherOverload,
    /// An assignment references a room that does not exist.
    UnknownRoom,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        assignment_indices: Vec<usize>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            assignment_indices,
        }
    }
}

/// A complete set of assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timetable {
    /// All assignments, in placement order.
    pub assignments: Vec<Assignment>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing assignment list.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the timetable has no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments taught by a teacher.
    pub fn assignments_for_teacher(&self, teacher_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.teacher_id == teacher_id)
            .collect()
    }

    /// All assignments held in a room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// All assignments attended by a cohort.
    pub fn assignments_for_cohort(&self, semester: u32, section: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.semester == semester && a.section == section)
            .collect()
    }

    /// Assignment count per teacher ID.
    pub fn teacher_loads(&self) -> BTreeMap<String, usize> {
        let mut loads = BTreeMap::new();
        for a in &self.assignments {
            *loads.entry(a.teacher_id.clone()).or_insert(0) += 1;
        }
        loads
    }

    /// Assignment count per room ID.
    pub fn room_loads(&self) -> BTreeMap<String, usize> {
        let mut loads = BTreeMap::new();
        for a in &self.assignments {
            *loads.entry(a.room_id.clone()).or_insert(0) += 1;
        }
        loads
    }

    /// Fraction of the weekly grid each room is occupied.
    ///
    /// Returns an empty map when `slot_count` is zero.
    pub fn room_utilization(&self, slot_count: usize) -> BTreeMap<String, f64> {
        if slot_count == 0 {
            return BTreeMap::new();
        }
        self.room_loads()
            .into_iter()
            .map(|(id, load)| (id, load as f64 / slot_count as f64))
            .collect()
    }
}
