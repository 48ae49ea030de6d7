//! Timetable generation and quality evaluation.
//!
//! [`TimetableGenerator`] is the entry point: it validates input, runs the
//! chosen strategy (constraint solver, repair-enhanced GA, or both), and
//! wraps the outcome in a [`TimetableResult`] with statistics.
//!
//! # KPI
//!
//! [`SoftMetrics`] computes the soft-constraint metrics shared by the
//! solver statistics and the GA fitness: lunch overlaps, back-to-back labs,
//! afternoon theory, workload imbalance, and student gaps.
//!
//! # Cancellation
//!
//! A [`CancelToken`] (flag plus optional deadline) is checked once per CSP
//! node and once per GA generation. A cancelled run returns no timetable.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod cancel;
mod generator;
pub mod kpi;
mod result;

pub use cancel::CancelToken;
pub use generator::{Approach, GenerationConfig, TimetableGenerator};
pub use kpi::SoftMetrics;
pub use result::{HardViolationCounts, TimetableResult, TimetableStatistics};
