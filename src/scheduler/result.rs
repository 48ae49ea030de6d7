//! Normalized generation result.
//!
//! Every strategy reports through the same envelope: success flag,
//! assignments, statistics, approach, and wall-clock time.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::generator::Approach;
use super::kpi::SoftMetrics;
use crate::models::{Assignment, Constraints, Room, Timetable, Violation, ViolationType};
use crate::validation::validate_solution;

/// Hard-violation counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardViolationCounts {
    /// Teacher double-bookings.
    pub teacher_conflicts: usize,
    /// Room double-bookings.
    pub room_conflicts: usize,
    /// Cohort double-bookings.
    pub student_conflicts: usize,
    /// Labs in rooms that cannot host labs.
    pub room_type_mismatches: usize,
    /// Teacher-days over the daily cap.
    pub teacher_overloads: usize,
    /// References to rooms that do not exist.
    pub unknown_rooms: usize,
}

impl HardViolationCounts {
    /// Tallies violations by type.
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut counts = Self::default();
        for v in violations {
            let slot = match v.violation_type {
                ViolationType::TeacherConflict => &mut counts.teacher_conflicts,
                ViolationType::RoomConflict => &mut counts.room_conflicts,
                ViolationType::StudentConflict => &mut counts.student_conflicts,
                ViolationType::RoomTypeMismatch => &mut counts.room_type_mismatches,
                ViolationType::TeacherOverload => &mut counts.teacher_overloads,
                ViolationType::UnknownRoom => &mut counts.unknown_rooms,
            };
            *slot += 1;
        }
        counts
    }

    /// Sum over every kind.
    pub fn total(&self) -> usize {
        self.teacher_conflicts
            + self.room_conflicts
            + self.student_conflicts
            + self.room_type_mismatches
            + self.teacher_overloads
            + self.unknown_rooms
    }
}

/// Quality statistics of one timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableStatistics {
    /// Number of assignments.
    pub total_assignments: usize,
    /// `hard total × hard_penalty + weighted soft sum`; lower is better.
    pub fitness: f64,
    /// Hard violations by kind.
    pub hard: HardViolationCounts,
    /// Soft metrics.
    pub soft: SoftMetrics,
    /// Assignments per teacher ID.
    pub teacher_workload: BTreeMap<String, usize>,
    /// Fraction of the weekly grid each room is occupied. Unused rooms report 0.
    pub room_utilization: BTreeMap<String, f64>,
}

impl TimetableStatistics {
    /// Computes statistics for any assignment set.
    pub fn calculate(
        assignments: &[Assignment],
        rooms: &[Room],
        slot_count: usize,
        constraints: &Constraints,
        hard_penalty: f64,
    ) -> Self {
        let report = validate_solution(assignments, rooms, constraints);
        let hard = HardViolationCounts::from_violations(&report.violations);
        let soft = SoftMetrics::for_constraints(assignments, constraints);
        let fitness = hard.total() as f64 * hard_penalty + soft.weighted_sum(&constraints.soft);

        let timetable = Timetable::from_assignments(assignments.to_vec());
        let mut room_utilization: BTreeMap<String, f64> =
            rooms.iter().map(|r| (r.id.clone(), 0.0)).collect();
        room_utilization.extend(timetable.room_utilization(slot_count));

        Self {
            total_assignments: assignments.len(),
            fitness,
            hard,
            soft,
            teacher_workload: timetable.teacher_loads(),
            room_utilization,
        }
    }
}

/// Result envelope shared by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableResult {
    /// Whether a hard-constraint-valid timetable was produced.
    pub success: bool,
    /// The timetable; empty on failure.
    pub assignments: Vec<Assignment>,
    /// Quality statistics of `assignments`.
    pub statistics: TimetableStatistics,
    /// Strategy requested.
    pub approach: Approach,
    /// Wall-clock time of the run.
    pub execution_time: Duration,
    /// Why the run failed; empty on success.
    pub errors: Vec<String>,
}

impl TimetableResult {
    /// A successful result.
    pub fn success(
        approach: Approach,
        assignments: Vec<Assignment>,
        statistics: TimetableStatistics,
        execution_time: Duration,
    ) -> Self {
        Self {
            success: true,
            assignments,
            statistics,
            approach,
            execution_time,
            errors: Vec::new(),
        }
    }

    /// A failed result with no assignments.
    pub fn failure(approach: Approach, errors: Vec<String>, execution_time: Duration) -> Self {
        Self {
            success: false,
            assignments: Vec::new(),
            statistics: TimetableStatistics::default(),
            approach,
            execution_time,
            errors,
        }
    }

    /// Fitness of the timetable (lower is better).
    pub fn fitness(&self) -> f64 {
        self.statistics.fitness
    }

    /// The assignments as a queryable [`Timetable`].
    pub fn timetable(&self) -> Timetable {
        Timetable::from_assignments(self.assignments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseSession, SoftConstraints, TimeSlot, TimeWindow};
    use approx::assert_relative_eq;
    use chrono::Weekday;

    fn grid() -> Vec<TimeSlot> {
        TimeSlot::weekly_grid(
            &[Weekday::Mon],
            &[
                TimeWindow::from_hm((9, 0), (10, 0)),
                TimeWindow::from_hm((10, 0), (11, 0)),
            ],
        )
    }

    #[test]
    fn test_statistics_conflict_free() {
        let slots = grid();
        let rooms = vec![Room::theory("R1"), Room::theory("R2")];
        let assignments = vec![
            Assignment::new(&CourseSession::theory("A", "T1"), &slots[0], &rooms[0]),
            Assignment::new(&CourseSession::theory("B", "T2"), &slots[1], &rooms[0]),
        ];
        let constraints = Constraints::default().with_soft(SoftConstraints::none());
        let stats = TimetableStatistics::calculate(&assignments, &rooms, slots.len(), &constraints, 1000.0);

        assert_eq!(stats.total_assignments, 2);
        assert_eq!(stats.hard.total(), 0);
        assert_relative_eq!(stats.fitness, 0.0);
        assert_eq!(stats.teacher_workload["T1"], 1);
        assert_relative_eq!(stats.room_utilization["R1"], 1.0);
        assert_relative_eq!(stats.room_utilization["R2"], 0.0);
    }

    #[test]
    fn test_statistics_counts_conflicts() {
        let slots = grid();
        let rooms = vec![Room::theory("R1")];
        let assignments = vec![
            Assignment::new(&CourseSession::theory("A", "T1"), &slots[0], &rooms[0]),
            Assignment::new(&CourseSession::theory("B", "T1").with_cohort(2, "A"), &slots[0], &rooms[0]),
        ];
        let constraints = Constraints::default().with_soft(SoftConstraints::none());
        let stats = TimetableStatistics::calculate(&assignments, &rooms, slots.len(), &constraints, 10.0);

        assert_eq!(stats.hard.teacher_conflicts, 1);
        assert_eq!(stats.hard.room_conflicts, 1);
        assert_eq!(stats.hard.student_conflicts, 0);
        assert_relative_eq!(stats.fitness, 20.0);
    }

    #[test]
    fn test_failure_envelope() {
        let result = TimetableResult::failure(
            Approach::Hybrid,
            vec!["No rooms supplied".into()],
            Duration::from_millis(3),
        );
        assert!(!result.success);
        assert!(result.assignments.is_empty());
        assert_eq!(result.statistics.total_assignments, 0);
        assert!(result.timetable().is_empty());
    }

    #[test]
    fn test_result_serializes() {
        let result = TimetableResult::failure(Approach::Genetic, vec![], Duration::from_millis(1));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"approach\":\"genetic\""));
    }
}
