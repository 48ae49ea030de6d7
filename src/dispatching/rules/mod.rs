//! Built-in ordering rules.
//!
//! # Score Convention
//! All rules return lower scores for sessions that should be placed first.

use super::{DispatchingRule, RuleScore};
use crate::models::{CourseSession, SessionType};

/// Session kind rank: lab (0) < tutorial (1) < theory (2).
///
/// Labs have the smallest room domain, tutorials usually share
/// a teacher with the theory part of the course.
#[derive(Debug, Clone, Copy)]
pub struct SessionKindRank;

impl DispatchingRule for SessionKindRank {
    fn name(&self) -> &'static str {
        "KIND"
    }

    fn evaluate(&self, session: &CourseSession) -> RuleScore {
        match session.session_type {
            SessionType::Lab => 0.0,
            SessionType::Tutorial => 1.0,
            SessionType::Theory => 2.0,
        }
    }

    fn description(&self) -> &'static str {
        "Lab, then tutorial, then theory"
    }
}

/// Most weekly occurrences first.
#[derive(Debug, Clone, Copy)]
pub struct MostSessionsPerWeek;

impl DispatchingRule for MostSessionsPerWeek {
    fn name(&self) -> &'static str {
        "MSPW"
    }

    fn evaluate(&self, session: &CourseSession) -> RuleScore {
        -f64::from(session.sessions_per_week)
    }

    fn description(&self) -> &'static str {
        "Most Sessions Per Week"
    }
}
