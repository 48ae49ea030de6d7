//! Timetable quality metrics (KPIs).
//!
//! Computes the soft-constraint metrics of an assignment set. The same
//! formulas feed the constraint solver's statistics, both genetic
//! optimizers' fitness, and the standalone validator.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Lunch overlaps | Assignments overlapping the lunch window |
//! | Back-to-back labs | Same teacher, same day, adjacent slot indices, both labs |
//! | Afternoon theory | Theory sessions starting at or after 14:00 |
//! | Workload imbalance | Population std. deviation of per-teacher assignment counts |
//! | Student gaps | Empty slot indices between consecutive classes of a cohort's day |
//!
//! Fitness is `Σ weight × metric` over enabled soft constraints; lower is better.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::time_slot::hm;
use crate::models::{Assignment, Constraints, SessionType, SoftConstraints, TimeWindow};

/// Theory sessions starting at or after this time count as afternoon.
pub fn afternoon_start() -> NaiveTime {
    hm(14, 0)
}

/// Soft-constraint metrics of one assignment set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftMetrics {
    /// Assignments overlapping the lunch window.
    pub lunch_overlaps: usize,
    /// Adjacent lab pairs per teacher and day.
    pub back_to_back_labs: usize,
    /// Theory sessions starting at or after 14:00.
    pub afternoon_theory: usize,
    /// Population standard deviation of per-teacher assignment counts.
    pub workload_imbalance: f64,
    /// Idle periods summed over every cohort's days.
    pub student_gaps: usize,
}

impl SoftMetrics {
    /// Computes every metric.
    ///
    /// `lunch` = `None` disables lunch overlap counting.
    pub fn calculate(assignments: &[Assignment], lunch: Option<TimeWindow>) -> Self {
        Self {
            lunch_overlaps: lunch.map_or(0, |w| lunch_overlaps(assignments, &w)),
            back_to_back_labs: back_to_back_labs(assignments),
            afternoon_theory: afternoon_theory(assignments),
            workload_imbalance: workload_imbalance(assignments),
            student_gaps: student_gaps(assignments),
        }
    }

    /// Computes the metrics under a constraint configuration.
    pub fn for_constraints(assignments: &[Assignment], constraints: &Constraints) -> Self {
        Self::calculate(assignments, constraints.lunch_window())
    }

    /// Weighted sum over enabled soft constraints.
    pub fn weighted_sum(&self, soft: &SoftConstraints) -> f64 {
        soft.lunch_break_mandatory.penalty(self.lunch_overlaps as f64)
            + soft.avoid_back_to_back_labs.penalty(self.back_to_back_labs as f64)
            + soft.morning_theory_preference.penalty(self.afternoon_theory as f64)
            + soft.teacher_workload_balance.penalty(self.workload_imbalance)
            + soft.minimize_gaps.penalty(self.student_gaps as f64)
    }
}

/// Soft fitness of an assignment set (lower is better).
pub fn soft_fitness(assignments: &[Assignment], constraints: &Constraints) -> f64 {
    SoftMetrics::for_constraints(assignments, constraints).weighted_sum(&constraints.soft)
}

/// Number of assignments overlapping the window.
pub fn lunch_overlaps(assignments: &[Assignment], lunch: &TimeWindow) -> usize {
    assignments
        .iter()
        .filter(|a| lunch.overlaps(a.start_time, a.end_time))
        .count()
}

/// Number of adjacent lab pairs taught by the same teacher on the same day.
pub fn back_to_back_labs(assignments: &[Assignment]) -> usize {
    let mut by_teacher_day: HashMap<(&str, Weekday), Vec<u32>> = HashMap::new();
    for a in assignments.iter().filter(|a| a.session_type == SessionType::Lab) {
        by_teacher_day
            .entry((a.teacher_id.as_str(), a.day))
            .or_default()
            .push(a.slot_index);
    }

    by_teacher_day
        .values()
        .map(|indices| {
            let mut pairs = 0;
            for (i, &x) in indices.iter().enumerate() {
                for &y in &indices[i + 1..] {
                    if x.abs_diff(y) == 1 {
                        pairs += 1;
                    }
                }
            }
            pairs
        })
        .sum()
}

/// Number of theory sessions starting at or after 14:00.
pub fn afternoon_theory(assignments: &[Assignment]) -> usize {
    let cutoff = afternoon_start();
    assignments
        .iter()
        .filter(|a| a.session_type == SessionType::Theory && a.start_time >= cutoff)
        .count()
}

/// Population standard deviation of per-teacher assignment counts.
///
/// Only teachers with at least one assignment are counted. Teachers are
/// summed in ID order so equal inputs give bit-identical results.
pub fn workload_imbalance(assignments: &[Assignment]) -> f64 {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for a in assignments {
        *counts.entry(a.teacher_id.as_str()).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return 0.0;
    }

    let n = counts.len() as f64;
    let mean = counts.values().sum::<usize>() as f64 / n;
    let variance = counts
        .values()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Sum of idle slot indices between consecutive classes, per cohort and day.
pub fn student_gaps(assignments: &[Assignment]) -> usize {
    let mut by_cohort_day: HashMap<(u32, &str, Weekday), Vec<u32>> = HashMap::new();
    for a in assignments {
        by_cohort_day
            .entry((a.semester, a.section.as_str(), a.day))
            .or_default()
            .push(a.slot_index);
    }

    by_cohort_day
        .values_mut()
        .map(|indices| {
            indices.sort_unstable();
            indices
                .windows(2)
                .map(|w| w[1].saturating_sub(w[0]).saturating_sub(1) as usize)
                .sum::<usize>()
        })
        .sum()
}
