//! Input and solution validation.
//!
//! - [`validate_input`] checks the structural integrity of a problem
//!   before any search starts (duplicate IDs, empty grids, labs without
//!   a lab-capable room).
//! - [`find_conflict_groups`] groups assignments on the composite keys
//!   (teacher+slot, room+slot, semester+section+slot); any group with more
//!   than one member is a hard violation.
//! - [`validate_solution`] re-derives every hard violation of an arbitrary
//!   assignment list and renders errors and soft-constraint warnings as
//!   human-readable strings, independent of how the list was produced.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Assignment, Constraints, CourseSession, HardConstraints, Room, SessionType, TimeSlot,
    Violation, ViolationType,
};
use crate::scheduler::kpi::afternoon_start;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A required collection is empty.
    EmptyInput,
    /// A session has no room able to host it.
    NoCompatibleRoom,
    /// A session is malformed (e.g. zero weekly occurrences).
    InvalidSession,
    /// A time slot ends before it starts.
    InvalidTimeSlot,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a timetabling problem.
///
/// Checks:
/// 1. At least one time slot and one room
/// 2. No duplicate slot or room IDs
/// 3. Every slot ends after it starts
/// 4. Every session has at least one weekly occurrence
/// 5. Every lab session has a lab-capable room (when room types are enforced)
/// 6. A mandatory lunch break leaves at least one usable slot
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    slots: &[TimeSlot],
    sessions: &[CourseSession],
    rooms: &[Room],
    constraints: &Constraints,
) -> ValidationResult {
    let mut errors = Vec::new();

    if slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyInput,
            "No time slots supplied",
        ));
    }
    if rooms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyInput,
            "No rooms supplied",
        ));
    }

    let mut slot_ids = HashSet::new();
    for slot in slots {
        if !slot_ids.insert(slot.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate time slot ID: {}", slot.id),
            ));
        }
        if slot.end_time <= slot.start_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Time slot '{}' ends before it starts", slot.id),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for room in rooms {
        if !room_ids.insert(room.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", room.id),
            ));
        }
    }

    let has_lab_room = rooms.iter().any(|r| r.room_type.supports_labs());
    for session in sessions {
        if session.sessions_per_week == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSession,
                format!(
                    "Session '{}' ({}) has zero sessions per week",
                    session.course_name, session.session_type
                ),
            ));
        }
        if constraints.hard.respect_session_room_type
            && session.session_type == SessionType::Lab
            && !rooms.is_empty()
            && !has_lab_room
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoCompatibleRoom,
                format!(
                    "Lab session '{}' has no lab-capable room",
                    session.course_name
                ),
            ));
        }
    }

    if let Some(lunch) = constraints.blocked_lunch_window() {
        if !slots.is_empty() && slots.iter().all(|s| s.overlaps(&lunch)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyInput,
                "Every time slot overlaps the mandatory lunch break",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Assignments sharing one composite key.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictGroup {
    /// Which hard constraint the shared key breaks.
    pub violation_type: ViolationType,
    /// Indices into the assignment list, in list order.
    pub members: Vec<usize>,
}

/// Groups assignments on every enabled composite key and returns the
/// groups with more than one member, ordered by their first member.
pub fn find_conflict_groups(assignments: &[Assignment], hard: &HardConstraints) -> Vec<ConflictGroup> {
    let mut groups = Vec::new();

    if hard.no_teacher_conflict {
        collect_groups(assignments, ViolationType::TeacherConflict, &mut groups, |a| {
            (a.teacher_id.clone(), String::new(), a.time_slot_id.clone())
        });
    }
    if hard.no_room_conflict {
        collect_groups(assignments, ViolationType::RoomConflict, &mut groups, |a| {
            (a.room_id.clone(), String::new(), a.time_slot_id.clone())
        });
    }
    if hard.no_student_conflict {
        collect_groups(assignments, ViolationType::StudentConflict, &mut groups, |a| {
            (a.semester.to_string(), a.section.clone(), a.time_slot_id.clone())
        });
    }

    groups.sort_by_key(|g| (g.members[0], g.violation_type as u8));
    groups
}

fn collect_groups<F>(
    assignments: &[Assignment],
    violation_type: ViolationType,
    out: &mut Vec<ConflictGroup>,
    key: F,
) where
    F: Fn(&Assignment) -> (String, String, String),
{
    let mut by_key: HashMap<(String, String, String), Vec<usize>> = HashMap::new();
    for (i, a) in assignments.iter().enumerate() {
        by_key.entry(key(a)).or_default().push(i);
    }
    out.extend(
        by_key
            .into_values()
            .filter(|members| members.len() > 1)
            .map(|members| ConflictGroup {
                violation_type,
                members,
            }),
    );
}

/// Number of assignments that would have to move to clear every conflict
/// group (`Σ (group size − 1)`).
pub fn count_hard_violations(assignments: &[Assignment], hard: &HardConstraints) -> usize {
    find_conflict_groups(assignments, hard)
        .iter()
        .map(|g| g.members.len() - 1)
        .sum()
}

/// Whether no composite key is shared.
pub fn is_conflict_free(assignments: &[Assignment], hard: &HardConstraints) -> bool {
    find_conflict_groups(assignments, hard).is_empty()
}

/// Outcome of validating an assignment list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    /// Hard-constraint violations, human-readable.
    pub errors: Vec<String>,
    /// Soft-constraint issues, human-readable.
    pub warnings: Vec<String>,
    /// Structured hard violations, parallel to `errors`.
    pub violations: Vec<Violation>,
}

impl SolutionReport {
    /// Whether no hard constraint is violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, violation: Violation) {
        self.errors.push(violation.message.clone());
        self.violations.push(violation);
    }
}

/// Validates an arbitrary assignment list.
///
/// Every hard check honors its toggle in `constraints.hard`. Room checks
/// look assignments up in `rooms`; a room ID missing from `rooms` is an error.
/// Warnings are emitted only for enabled soft constraints.
pub fn validate_solution(
    assignments: &[Assignment],
    rooms: &[Room],
    constraints: &Constraints,
) -> SolutionReport {
    let mut report = SolutionReport::default();
    let hard = &constraints.hard;

    for group in find_conflict_groups(assignments, hard) {
        let first = &assignments[group.members[0]];
        let courses = group
            .members
            .iter()
            .map(|&i| assignments[i].course_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let (entity_id, message) = match group.violation_type {
            ViolationType::TeacherConflict => (
                first.teacher_id.clone(),
                format!(
                    "Teacher {} has {} classes at {} ({})",
                    first.teacher_name,
                    group.members.len(),
                    first.time_label(),
                    courses
                ),
            ),
            ViolationType::RoomConflict => (
                first.room_id.clone(),
                format!(
                    "Room {} is double-booked at {} ({})",
                    first.room_name,
                    first.time_label(),
                    courses
                ),
            ),
            _ => (
                format!("{}-{}", first.semester, first.section),
                format!(
                    "Semester {} section {} has {} classes at {} ({})",
                    first.semester,
                    first.section,
                    group.members.len(),
                    first.time_label(),
                    courses
                ),
            ),
        };
        report.error(Violation::new(
            group.violation_type,
            entity_id,
            message,
            group.members,
        ));
    }

    let rooms_by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    for (i, a) in assignments.iter().enumerate() {
        match rooms_by_id.get(a.room_id.as_str()) {
            None => report.error(Violation::new(
                ViolationType::UnknownRoom,
                a.room_id.clone(),
                format!(
                    "Course {} at {} uses unknown room {}",
                    a.course_name,
                    a.time_label(),
                    a.room_id
                ),
                vec![i],
            )),
            Some(room) if hard.respect_session_room_type && !room.supports(a.session_type) => {
                report.error(Violation::new(
                    ViolationType::RoomTypeMismatch,
                    a.course_id.clone(),
                    format!(
                        "Lab {} at {} is in {} room {}",
                        a.course_name,
                        a.time_label(),
                        room.room_type,
                        room.name
                    ),
                    vec![i],
                ))
            }
            Some(_) => {}
        }
    }

    if let Some(cap) = hard.max_teacher_hours_per_day {
        let mut per_day: HashMap<(&str, u32), Vec<usize>> = HashMap::new();
        for (i, a) in assignments.iter().enumerate() {
            per_day
                .entry((a.teacher_id.as_str(), a.day.num_days_from_monday()))
                .or_default()
                .push(i);
        }
        let mut overloaded: Vec<_> = per_day
            .into_values()
            .filter(|members| members.len() > cap as usize)
            .collect();
        overloaded.sort_by_key(|members| members[0]);
        for members in overloaded {
            let first = &assignments[members[0]];
            report.error(Violation::new(
                ViolationType::TeacherOverload,
                first.teacher_id.clone(),
                format!(
                    "Teacher {} has {} sessions on {} (max {})",
                    first.teacher_name,
                    members.len(),
                    first.day,
                    cap
                ),
                members,
            ));
        }
    }

    collect_warnings(assignments, constraints, &mut report.warnings);
    report
}

fn collect_warnings(assignments: &[Assignment], constraints: &Constraints, warnings: &mut Vec<String>) {
    let soft = &constraints.soft;

    // Same window the lunch metric counts against.
    if let Some(lunch) = constraints.lunch_window() {
        for a in assignments.iter().filter(|a| lunch.overlaps(a.start_time, a.end_time)) {
            warnings.push(format!(
                "Course {} ({}) overlaps the lunch break at {}",
                a.course_name,
                a.teacher_name,
                a.time_label()
            ));
        }
    }

    if soft.avoid_back_to_back_labs.enabled {
        let labs: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.session_type == SessionType::Lab)
            .collect();
        for (i, a) in labs.iter().enumerate() {
            for b in &labs[i + 1..] {
                if a.teacher_id == b.teacher_id
                    && a.day == b.day
                    && a.slot_index.abs_diff(b.slot_index) == 1
                {
                    warnings.push(format!(
                        "Teacher {} has back-to-back labs on {} ({} and {})",
                        a.teacher_name, a.day, a.course_name, b.course_name
                    ));
                }
            }
        }
    }

    if soft.morning_theory_preference.enabled {
        let cutoff = afternoon_start();
        for a in assignments
            .iter()
            .filter(|a| a.session_type == SessionType::Theory && a.start_time >= cutoff)
        {
            warnings.push(format!(
                "Theory session {} is scheduled in the afternoon at {}",
                a.course_name,
                a.time_label()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time_slot::hm;
    use crate::models::{RoomType, SoftConstraints, TimeWindow};
    use crate::scheduler::SoftMetrics;
    use chrono::Weekday;

    fn slot(id: &str, day: Weekday, hour: u32, index: u32) -> TimeSlot {
        TimeSlot::new(id, day, hm(hour, 0), hm(hour + 1, 0), index)
    }

    fn sample_slots() -> Vec<TimeSlot> {
        vec![
            slot("Mon-1", Weekday::Mon, 9, 0),
            slot("Mon-2", Weekday::Mon, 10, 1),
            slot("Mon-3", Weekday::Mon, 11, 2),
        ]
    }

    fn sample_rooms() -> Vec<Room> {
        vec![Room::theory("R1"), Room::theory("R2"), Room::lab("L1")]
    }

    fn no_soft() -> Constraints {
        Constraints::default().with_soft(SoftConstraints::none())
    }

    #[test]
    fn test_valid_input() {
        let sessions = vec![CourseSession::theory("C1", "T1"), CourseSession::lab("C2", "T2")];
        assert!(validate_input(&sample_slots(), &sessions, &sample_rooms(), &Constraints::default()).is_ok());
    }

    #[test]
    fn test_empty_rooms_and_slots() {
        let sessions = vec![CourseSession::theory("C1", "T1")];
        let errors = validate_input(&[], &sessions, &[], &Constraints::default()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::EmptyInput)
                .count(),
            2
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let slots = vec![slot("S", Weekday::Mon, 9, 0), slot("S", Weekday::Tue, 9, 0)];
        let rooms = vec![Room::theory("R1"), Room::theory("R1")];
        let errors = validate_input(&slots, &[], &rooms, &Constraints::default()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
                .count(),
            2
        );
    }

    #[test]
    fn test_lab_without_lab_room() {
        let sessions = vec![CourseSession::lab("Chem", "T1")];
        let rooms = vec![Room::theory("R1")];
        let errors = validate_input(&sample_slots(), &sessions, &rooms, &Constraints::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NoCompatibleRoom && e.message.contains("Chem")));

        let relaxed = Constraints::default().with_hard(HardConstraints {
            respect_session_room_type: false,
            ..HardConstraints::default()
        });
        assert!(validate_input(&sample_slots(), &sessions, &rooms, &relaxed).is_ok());
    }

    #[test]
    fn test_zero_sessions_per_week() {
        let sessions = vec![CourseSession::theory("C1", "T1").with_sessions_per_week(0)];
        let errors = validate_input(&sample_slots(), &sessions, &sample_rooms(), &Constraints::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidSession);
    }

    #[test]
    fn test_inverted_time_slot() {
        let slots = vec![TimeSlot::new("bad", Weekday::Mon, hm(10, 0), hm(9, 0), 0)];
        let errors = validate_input(&slots, &[], &sample_rooms(), &Constraints::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTimeSlot);
    }

    #[test]
    fn test_all_slots_in_lunch() {
        let slots = vec![slot("Mon-L", Weekday::Mon, 12, 0)];
        let errors = validate_input(&slots, &[], &sample_rooms(), &Constraints::default()).unwrap_err();
        assert!(errors[0].message.contains("lunch"));
        assert!(validate_input(&slots, &[], &sample_rooms(), &no_soft()).is_ok());
    }

    #[test]
    fn test_conflict_groups() {
        let slots = sample_slots();
        let rooms = sample_rooms();
        let assignments = vec![
            Assignment::new(&CourseSession::theory("C1", "T1"), &slots[0], &rooms[0]),
            Assignment::new(&CourseSession::theory("C2", "T1").with_cohort(2, "A"), &slots[0], &rooms[1]),
            Assignment::new(&CourseSession::theory("C3", "T3").with_cohort(3, "A"), &slots[0], &rooms[1]),
            Assignment::new(&CourseSession::theory("C4", "T4").with_cohort(4, "A"), &slots[1], &rooms[0]),
        ];
        let groups = find_conflict_groups(&assignments, &HardConstraints::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].violation_type, ViolationType::TeacherConflict);
        assert_eq!(groups[0].members, vec![0, 1]);
        assert_eq!(groups[1].violation_type, ViolationType::RoomConflict);
        assert_eq!(groups[1].members, vec![1, 2]);
        assert_eq!(count_hard_violations(&assignments, &HardConstraints::default()), 2);
        assert!(is_conflict_free(&assignments, &HardConstraints::none()));
    }

    #[test]
    fn test_validate_conflict_free_solution() {
        let slots = sample_slots();
        let rooms = sample_rooms();
        let assignments = vec![
            Assignment::new(&CourseSession::theory("C1", "T1"), &slots[0], &rooms[0]),
            Assignment::new(&CourseSession::lab("C2", "T2").with_cohort(2, "A"), &slots[0], &rooms[2]),
            Assignment::new(&CourseSession::theory("C3", "T1"), &slots[1], &rooms[0]),
        ];
        let report = validate_solution(&assignments, &rooms, &no_soft());
        assert!(report.errors.is_empty());
        assert!(report.is_valid());
    }

    #[test]
    fn test_validate_teacher_double_booking() {
        let slots = sample_slots();
        let rooms = sample_rooms();
        let assignments = vec![
            Assignment::new(
                &CourseSession::theory("C1", "T1").with_teacher_name("Dr. Rao"),
                &slots[0],
                &rooms[0],
            ),
            Assignment::new(
                &CourseSession::theory("C2", "T1")
                    .with_teacher_name("Dr. Rao")
                    .with_cohort(2, "B"),
                &slots[0],
                &rooms[1],
            ),
        ];
        let report = validate_solution(&assignments, &rooms, &no_soft());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Dr. Rao"));
        assert!(report.errors[0].contains("Mon 09:00"));
        assert_eq!(report.violations[0].violation_type, ViolationType::TeacherConflict);
    }

    #[test]
    fn test_validate_room_type_and_unknown_room() {
        let slots = sample_slots();
        let rooms = sample_rooms();
        let ghost = Room::new("X9", RoomType::Both);
        let assignments = vec![
            Assignment::new(&CourseSession::lab("Bio", "T1"), &slots[0], &rooms[0]),
            Assignment::new(&CourseSession::theory("Art", "T2").with_cohort(2, "A"), &slots[0], &ghost),
        ];
        let report = validate_solution(&assignments, &rooms, &no_soft());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.violations[0].violation_type, ViolationType::RoomTypeMismatch);
        assert_eq!(report.violations[1].violation_type, ViolationType::UnknownRoom);
        assert!(report.errors[1].contains("X9"));
    }

    #[test]
    fn test_validate_teacher_overload() {
        let slots = sample_slots();
        let rooms = sample_rooms();
        let assignments: Vec<Assignment> = slots
            .iter()
            .map(|s| Assignment::new(&CourseSession::theory("C", "T1"), s, &rooms[0]))
            .collect();
        let constraints = no_soft().with_hard(HardConstraints::default().with_max_teacher_hours_per_day(Some(2)));
        let report = validate_solution(&assignments, &rooms, &constraints);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("3 sessions on Mon (max 2)"));
    }

    #[test]
    fn test_validate_warnings() {
        let rooms = sample_rooms();
        let lunch_slot = slot("Mon-4", Weekday::Mon, 12, 3);
        let s1 = slot("Mon-6", Weekday::Mon, 14, 5);
        let s2 = slot("Mon-7", Weekday::Mon, 15, 6);
        let assignments = vec![
            Assignment::new(&CourseSession::theory("Lunchtime", "T1"), &lunch_slot, &rooms[0]),
            Assignment::new(&CourseSession::lab("LabA", "T2").with_cohort(2, "A"), &s1, &rooms[2]),
            Assignment::new(&CourseSession::lab("LabB", "T2").with_cohort(2, "A"), &s2, &rooms[2]),
        ];
        let constraints = Constraints::default().with_lunch_break(TimeWindow::default_lunch());
        let report = validate_solution(&assignments, &rooms, &constraints);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("lunch"));
        assert!(report.warnings[1].contains("back-to-back"));
    }

    #[test]
    fn test_lunch_warning_follows_lunch_metric() {
        let rooms = sample_rooms();
        let lunch_slot = slot("Mon-4", Weekday::Mon, 12, 3);
        let assignments = vec![Assignment::new(
            &CourseSession::theory("Lunchtime", "T1"),
            &lunch_slot,
            &rooms[0],
        )];

        // Configured window, lunch not mandatory: the metric still counts it.
        let optional = Constraints::default()
            .with_lunch_mandatory(false)
            .with_lunch_break(TimeWindow::default_lunch());
        let metrics = SoftMetrics::for_constraints(&assignments, &optional);
        let report = validate_solution(&assignments, &rooms, &optional);
        assert_eq!(metrics.lunch_overlaps, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("lunch"));

        // No window and not mandatory: neither counts it.
        let none = Constraints::default().with_lunch_mandatory(false);
        assert_eq!(SoftMetrics::for_constraints(&assignments, &none).lunch_overlaps, 0);
        assert!(validate_solution(&assignments, &rooms, &none).warnings.is_empty());
    }
}
