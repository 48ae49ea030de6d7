//! Timetabling constraints.
//!
//! Hard constraints decide feasibility: a timetable violating any enabled
//! hard constraint is invalid. Soft constraints never invalidate a
//! timetable; each contributes `weight × metric` to its fitness score.
//!
//! All fields carry serde defaults so a partially specified JSON/TOML
//! document yields the stock configuration for the missing parts.

use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Feasibility rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HardConstraints {
    /// A teacher teaches at most one session per time slot.
    pub no_teacher_conflict: bool,
    /// A room hosts at most one session per time slot.
    pub no_room_conflict: bool,
    /// A (semester, section) cohort attends at most one session per time slot.
    pub no_student_conflict: bool,
    /// Lab sessions only use lab-capable rooms.
    pub respect_session_room_type: bool,
    /// Cap on sessions per teacher per day. `None` = unlimited.
    pub max_teacher_hours_per_day: Option<u32>,
}

impl Default for HardConstraints {
    fn default() -> Self {
        Self {
            no_teacher_conflict: true,
            no_room_conflict: true,
            no_student_conflict: true,
            respect_session_room_type: true,
            max_teacher_hours_per_day: Some(6),
        }
    }
}

impl HardConstraints {
    /// All hard constraints disabled.
    pub fn none() -> Self {
        Self {
            no_teacher_conflict: false,
            no_room_conflict: false,
            no_student_conflict: false,
            respect_session_room_type: false,
            max_teacher_hours_per_day: None,
        }
    }

    /// Sets the per-teacher daily cap.
    pub fn with_max_teacher_hours_per_day(mut self, cap: Option<u32>) -> Self {
        self.max_teacher_hours_per_day = cap;
        self
    }
}

/// A toggleable, weighted preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoftConstraint {
    /// Whether the preference is scored at all.
    pub enabled: bool,
    /// Penalty per unit of the underlying metric.
    pub weight: f64,
}

impl SoftConstraint {
    /// An enabled preference with the given weight.
    pub fn weighted(weight: f64) -> Self {
        Self {
            enabled: true,
            weight,
        }
    }

    /// A disabled preference.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            weight: 0.0,
        }
    }

    /// Contribution of `metric` to the fitness score.
    #[inline]
    pub fn penalty(&self, metric: f64) -> f64 {
        if self.enabled {
            self.weight * metric
        } else {
            0.0
        }
    }
}

/// Quality preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoftConstraints {
    /// Keep the lunch window free. When enabled, the constraint solver
    /// also removes lunch-overlapping slots from every domain.
    pub lunch_break_mandatory: SoftConstraint,
    /// Avoid adjacent lab periods for the same teacher on the same day.
    pub avoid_back_to_back_labs: SoftConstraint,
    /// Prefer theory sessions before 14:00.
    pub morning_theory_preference: SoftConstraint,
    /// Spread sessions evenly across teachers.
    pub teacher_workload_balance: SoftConstraint,
    /// Minimize idle periods in each cohort's day.
    pub minimize_gaps: SoftConstraint,
}

impl Default for SoftConstraints {
    fn default() -> Self {
        Self {
            lunch_break_mandatory: SoftConstraint::weighted(10.0),
            avoid_back_to_back_labs: SoftConstraint::weighted(5.0),
            morning_theory_preference: SoftConstraint::weighted(2.0),
            teacher_workload_balance: SoftConstraint::weighted(3.0),
            minimize_gaps: SoftConstraint::weighted(4.0),
        }
    }
}

impl SoftConstraints {
    /// All preferences disabled.
    pub fn none() -> Self {
        Self {
            lunch_break_mandatory: SoftConstraint::disabled(),
            avoid_back_to_back_labs: SoftConstraint::disabled(),
            morning_theory_preference: SoftConstraint::disabled(),
            teacher_workload_balance: SoftConstraint::disabled(),
            minimize_gaps: SoftConstraint::disabled(),
        }
    }
}

/// Complete constraint configuration for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Constraints {
    /// Feasibility rules.
    pub hard: HardConstraints,
    /// Weighted preferences.
    pub soft: SoftConstraints,
    /// Lunch window. Defaults to 12:00–13:00 when lunch is mandatory.
    pub lunch_break: Option<TimeWindow>,
}

impl Constraints {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hard constraints.
    pub fn with_hard(mut self, hard: HardConstraints) -> Self {
        self.hard = hard;
        self
    }

    /// Sets the soft constraints.
    pub fn with_soft(mut self, soft: SoftConstraints) -> Self {
        self.soft = soft;
        self
    }

    /// Sets the lunch window.
    pub fn with_lunch_break(mut self, window: TimeWindow) -> Self {
        self.lunch_break = Some(window);
        self
    }

    /// Enables or disables the mandatory lunch break.
    pub fn with_lunch_mandatory(mut self, mandatory: bool) -> Self {
        self.soft.lunch_break_mandatory.enabled = mandatory;
        self
    }

    /// The lunch window used for metrics.
    ///
    /// Returns the configured window, or the default lunch hour when
    /// lunch is mandatory and no window was given.
    pub fn lunch_window(&self) -> Option<TimeWindow> {
        match self.lunch_break {
            Some(window) => Some(window),
            None if self.soft.lunch_break_mandatory.enabled => Some(TimeWindow::default_lunch()),
            None => None,
        }
    }

    /// The window that must be kept free of sessions, if lunch is mandatory.
    pub fn blocked_lunch_window(&self) -> Option<TimeWindow> {
        if self.soft.lunch_break_mandatory.enabled {
            self.lunch_window()
        } else {
            None
        }
    }
}
