//! Integrated timetable generator.
//!
//! Dispatches one generation request to a strategy and normalizes the
//! outcome into a [`TimetableResult`].
//!
//! # Strategies
//!
//! | Approach | Runs | Falls back |
//! |----------|------|------------|
//! | `constraint` | backtracking CSP, `max_iterations` | no |
//! | `genetic` | repair-enhanced GA, `ga.max_generations` | no |
//! | `hybrid` | CSP with `hybrid_max_iterations`, then GA with `hybrid_generations`; keeps the lower fitness | to `genetic` when the CSP finds nothing |
//!
//! Input is validated before any strategy runs. Every failure (invalid
//! input, invalid configuration, exhausted budget, cancellation) becomes a
//! result with `success = false`, no assignments, and the error messages.

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::cancel::CancelToken;
use super::result::{TimetableResult, TimetableStatistics};
use crate::cp::{CspSolver, SearchStatus, DEFAULT_MAX_ITERATIONS};
use crate::error::GenerationError;
use crate::ga::{GaConfig, GenerationObserver, TimetableGaProblem};
use crate::models::{Assignment, Constraints, CourseSession, Room, TimeSlot};
use crate::validation::{validate_input, validate_solution, SolutionReport};

/// Generation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Backtracking constraint solver only.
    Constraint,
    /// Repair-enhanced genetic algorithm only.
    Genetic,
    /// Constraint solver, then genetic algorithm; best of both.
    #[default]
    Hybrid,
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constraint => write!(f, "constraint"),
            Self::Genetic => write!(f, "genetic"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Configuration of one generation request.
///
/// ```
/// use u_timetable::scheduler::{Approach, GenerationConfig};
///
/// let config = GenerationConfig::default()
///     .with_approach(Approach::Constraint)
///     .with_max_iterations(2_000);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.hybrid_generations, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Strategy to run.
    pub approach: Approach,
    /// CSP iteration budget for the `constraint` approach.
    pub max_iterations: usize,
    /// Reduced CSP budget used by the `hybrid` approach.
    pub hybrid_max_iterations: usize,
    /// GA generations used by the `hybrid` approach.
    pub hybrid_generations: usize,
    /// GA parameters for the `genetic` and `hybrid` approaches.
    pub ga: GaConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            approach: Approach::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            hybrid_max_iterations: 5_000,
            hybrid_generations: 30,
            ga: GaConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Creates a configuration for the given approach with default tuning.
    pub fn new(approach: Approach) -> Self {
        Self::default().with_approach(approach)
    }

    /// Sets the strategy.
    pub fn with_approach(mut self, approach: Approach) -> Self {
        self.approach = approach;
        self
    }

    /// Sets the CSP iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the hybrid CSP iteration budget.
    pub fn with_hybrid_max_iterations(mut self, n: usize) -> Self {
        self.hybrid_max_iterations = n;
        self
    }

    /// Sets the hybrid GA generation count.
    pub fn with_hybrid_generations(mut self, n: usize) -> Self {
        self.hybrid_generations = n;
        self
    }

    /// Replaces the GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the random seed of the GA.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ga.seed = Some(seed);
        self
    }

    /// Validates the parameters the chosen approach uses.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let fail = |msg: &str| Err(GenerationError::InvalidConfig(msg.into()));
        match self.approach {
            Approach::Constraint if self.max_iterations == 0 => {
                return fail("max_iterations must be at least 1");
            }
            Approach::Hybrid if self.hybrid_max_iterations == 0 => {
                return fail("hybrid_max_iterations must be at least 1");
            }
            Approach::Hybrid if self.hybrid_generations == 0 => {
                return fail("hybrid_generations must be at least 1");
            }
            _ => {}
        }
        if self.approach != Approach::Constraint {
            self.ga.validate()?;
        }
        Ok(())
    }
}

/// Generates timetables for one fixed problem instance.
///
/// # Example
/// ```
/// use chrono::Weekday;
/// use u_timetable::models::{Constraints, CourseSession, Room, TimeSlot, TimeWindow};
/// use u_timetable::scheduler::{Approach, GenerationConfig, TimetableGenerator};
///
/// let slots = TimeSlot::weekly_grid(
///     &[Weekday::Mon, Weekday::Tue],
///     &[TimeWindow::from_hm((9, 0), (10, 0)), TimeWindow::from_hm((10, 0), (11, 0))],
/// );
/// let sessions = vec![
///     CourseSession::theory("Algebra", "T1").with_sessions_per_week(2),
///     CourseSession::lab("Physics Lab", "T2"),
/// ];
/// let rooms = vec![Room::theory("R1"), Room::lab("L1")];
/// let constraints = Constraints::default();
///
/// let generator = TimetableGenerator::new(&slots, &sessions, &rooms, &constraints);
/// let result = generator.generate(&GenerationConfig::new(Approach::Constraint));
/// assert!(result.success);
/// assert_eq!(result.assignments.len(), 3);
/// assert!(generator.validate_solution(&result.assignments).is_valid());
/// ```
#[derive(Clone)]
pub struct TimetableGenerator<'a> {
    slots: &'a [TimeSlot],
    sessions: &'a [CourseSession],
    rooms: &'a [Room],
    constraints: &'a Constraints,
    observer: Option<GenerationObserver>,
    cancel: CancelToken,
}

impl<'a> TimetableGenerator<'a> {
    /// Creates a generator over borrowed inputs.
    pub fn new(
        slots: &'a [TimeSlot],
        sessions: &'a [CourseSession],
        rooms: &'a [Room],
        constraints: &'a Constraints,
    ) -> Self {
        Self {
            slots,
            sessions,
            rooms,
            constraints,
            observer: None,
            cancel: CancelToken::default(),
        }
    }

    /// Attaches a per-generation progress observer to the GA strategies.
    pub fn with_observer(mut self, observer: GenerationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attaches a cancel token honored by every strategy.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the configured strategy once.
    #[instrument(
        name = "generate",
        skip_all,
        fields(
            approach = %config.approach,
            sessions = self.sessions.len(),
            rooms = self.rooms.len(),
            slots = self.slots.len(),
        )
    )]
    pub fn generate(&self, config: &GenerationConfig) -> TimetableResult {
        let started = Instant::now();
        info!("generation started");

        match self.run(config) {
            Ok(assignments) => {
                let statistics = self.statistics(&assignments, config.ga.hard_penalty);
                info!(
                    assignments = statistics.total_assignments,
                    fitness = statistics.fitness,
                    "generation finished"
                );
                TimetableResult::success(config.approach, assignments, statistics, started.elapsed())
            }
            Err(err) => {
                warn!(error = %err, "generation failed");
                TimetableResult::failure(config.approach, err.messages(), started.elapsed())
            }
        }
    }

    /// Runs the configured strategy `n` times in parallel.
    ///
    /// Each run gets its own seed (`seed + run index`) when a base seed is
    /// set. Only successful runs are kept, ordered by ascending fitness.
    pub fn generate_multiple_solutions(
        &self,
        n: usize,
        config: &GenerationConfig,
    ) -> Vec<TimetableResult> {
        let mut results: Vec<TimetableResult> = (0..n)
            .into_par_iter()
            .map(|run| {
                let mut config = config.clone();
                config.ga.seed = config.ga.seed.map(|seed| seed.wrapping_add(run as u64));
                self.generate(&config)
            })
            .filter(|result| result.success)
            .collect();

        results.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        info!(requested = n, successful = results.len(), "multi-run finished");
        results
    }

    /// Checks an arbitrary assignment list against this generator's rooms
    /// and constraints.
    pub fn validate_solution(&self, assignments: &[Assignment]) -> SolutionReport {
        validate_solution(assignments, self.rooms, self.constraints)
    }

    fn run(&self, config: &GenerationConfig) -> Result<Vec<Assignment>, GenerationError> {
        config.validate()?;
        validate_input(self.slots, self.sessions, self.rooms, self.constraints)
            .map_err(GenerationError::InvalidInput)?;

        match config.approach {
            Approach::Constraint => self.run_constraint(config.max_iterations),
            Approach::Genetic => self.run_genetic(&config.ga),
            Approach::Hybrid => self.run_hybrid(config),
        }
    }

    fn run_constraint(&self, max_iterations: usize) -> Result<Vec<Assignment>, GenerationError> {
        let outcome = CspSolver::new(self.slots, self.sessions, self.rooms, self.constraints)
            .with_max_iterations(max_iterations)
            .with_cancel_token(self.cancel.clone())
            .solve_detailed();

        match outcome.status {
            SearchStatus::Solved => Ok(outcome.assignments),
            SearchStatus::Cancelled => Err(GenerationError::Cancelled),
            status => {
                warn!(?status, iterations = outcome.iterations, "constraint solver gave up");
                Err(GenerationError::NoSolution {
                    approach: Approach::Constraint,
                })
            }
        }
    }

    fn run_genetic(&self, ga: &GaConfig) -> Result<Vec<Assignment>, GenerationError> {
        let mut problem =
            TimetableGaProblem::new(self.slots, self.sessions, self.rooms, self.constraints)
                .with_config(ga)
                .with_cancel_token(self.cancel.clone());
        if let Some(observer) = &self.observer {
            problem = problem.with_observer(observer.clone());
        }
        Ok(problem.optimize_with_repair(ga)?.assignments)
    }

    fn run_hybrid(&self, config: &GenerationConfig) -> Result<Vec<Assignment>, GenerationError> {
        let seeded = match self.run_constraint(config.hybrid_max_iterations) {
            Ok(assignments) => assignments,
            Err(GenerationError::NoSolution { .. }) => {
                info!("constraint stage failed, falling back to genetic");
                return self.run_genetic(&config.ga);
            }
            Err(err) => return Err(err),
        };

        let ga = config.ga.clone().with_max_generations(config.hybrid_generations);
        let evolved = match self.run_genetic(&ga) {
            Ok(assignments) => assignments,
            Err(GenerationError::NoSolution { .. }) => return Ok(seeded),
            Err(err) => return Err(err),
        };

        let penalty = config.ga.hard_penalty;
        let csp_fitness = self.statistics(&seeded, penalty).fitness;
        let ga_fitness = self.statistics(&evolved, penalty).fitness;
        info!(csp_fitness, ga_fitness, "hybrid stages compared");
        Ok(if ga_fitness < csp_fitness { evolved } else { seeded })
    }

    fn statistics(&self, assignments: &[Assignment], hard_penalty: f64) -> TimetableStatistics {
        TimetableStatistics::calculate(
            assignments,
            self.rooms,
            self.slots.len(),
            self.constraints,
            hard_penalty,
        )
    }
}

impl fmt::Debug for TimetableGenerator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimetableGenerator")
            .field("slots", &self.slots.len())
            .field("sessions", &self.sessions.len())
            .field("rooms", &self.rooms.len())
            .field("observer", &self.observer.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}
