//! Ordering rules for session placement.
//!
//! The constraint solver places the hardest sessions first
//! (most-constrained-variable heuristic). Each criterion is a
//! [`DispatchingRule`]; the [`RuleEngine`] chains them with a
//! final tie-breaker.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::RuleEngine;
//! use u_timetable::models::{expand_sessions, CourseSession};
//!
//! let sessions = vec![
//!     CourseSession::theory("Algebra", "T1"),
//!     CourseSession::lab("Chemistry", "T2"),
//! ];
//! let instances = expand_sessions(&sessions);
//! let engine = RuleEngine::most_constrained_first();
//! let order = engine.sort_indices(&instances);
//! assert_eq!(instances[order[0]].session.course_id, "Chemistry");
//! ```

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use crate::models::CourseSession;
use std::fmt::Debug;

/// Score returned by an ordering rule.
///
/// Lower scores = placed earlier.
pub type RuleScore = f64;

/// A rule that ranks sessions by how hard they are to place.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules return smaller values for
/// sessions that should be placed first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name.
    fn name(&self) -> &'static str;

    /// Evaluates the placement priority of a session.
    fn evaluate(&self, session: &CourseSession) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
