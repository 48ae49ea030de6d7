//! GA-based timetable optimization.
//!
//! The timetabling encoding implements `u_metaheur::ga::{Individual,
//! GaProblem}`; both optimizers run on `u_metaheur::ga::GaRunner`.
//!
//! # Encoding
//!
//! One gene per expanded session instance holding a (slot, room) pair of
//! indices. Gene *i* always encodes instance *i*, so every operator
//! preserves each session's weekly multiplicity.
//!
//! # Optimizers
//!
//! | Entry point | Ranking | Repair | Returns |
//! |-------------|---------|--------|---------|
//! | [`TimetableGaProblem::optimize`] | penalty | no | best individual |
//! | [`TimetableGaProblem::optimize_with_repair`] | feasible first, then penalty | seeding + offspring | best feasible individual, or no solution |
//!
//! # Submodules
//!
//! - [`repair`]: first-fit conflict relocation
//!
//! # Reference
//! - Burke, Elliman & Weare (1995), "A Hybrid Genetic Algorithm for Highly
//!   Constrained Timetabling Problems"
//! - Abramson & Abela (1992), "A Parallel Genetic Algorithm for Solving the
//!   School Timetabling Problem"

mod chromosome;
mod config;
mod fitness;
mod problem;
pub mod repair;
mod repairing;

pub use chromosome::{reassign_mutation, single_point_crossover, Gene, TimetableChromosome};
pub use config::GaConfig;
pub use fitness::{GenerationObserver, GenerationReport, Ranking, TimetableFitness};
pub use problem::{OptimizedTimetable, TimetableGaProblem};
pub use repairing::RepairingProblem;
