//! Constraint-satisfaction timetabling.
//!
//! Treats each weekly session instance as a variable over (slot, room)
//! pairs and searches for an assignment satisfying every enabled hard
//! constraint:
//!
//! | Constraint | Check |
//! |------------|-------|
//! | Teacher conflict | teacher + slot unique |
//! | Room conflict | room + slot unique |
//! | Student conflict | semester + section + slot unique |
//! | Room type | labs only in lab-capable rooms (domain filter) |
//! | Daily cap | sessions per teacher per day ≤ cap |
//! | Lunch break | lunch-overlapping slots removed from domains when mandatory |
//!
//! Failing to find a solution within budget is an expected outcome and is
//! reported through [`SearchStatus`], not as an error.
//!
//! # Reference
//! - Bessiere (2006), "Constraint Propagation", Handbook of Constraint Programming
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod domain;
mod solver;

pub use domain::{room_domain, slot_domain, Domains};
pub use solver::{solve, CspOutcome, CspSolver, SearchStatus, DEFAULT_MAX_ITERATIONS};
