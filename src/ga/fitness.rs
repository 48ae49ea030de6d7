//! Fitness value and progress reporting for the timetabling GA.
//!
//! [`TimetableFitness`] is the `u_metaheur` fitness type of
//! [`TimetableChromosome`](super::TimetableChromosome). It carries the
//! penalty score, the feasibility verdict, and the [`Ranking`] the
//! producing problem uses, so the runner's plain `<` comparisons order a
//! repair-enhanced population feasible-first.

use std::cmp::Ordering;
use std::sync::Arc;

use u_metaheur::ga::Fitness;

/// How individuals are ranked during sorting and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranking {
    /// Penalty only.
    #[default]
    FitnessOnly,
    /// Feasible individuals before infeasible ones, then penalty.
    FeasibleFirst,
}

/// Penalty score plus feasibility. Lower ranks better.
#[derive(Debug, Clone, Copy)]
pub struct TimetableFitness {
    /// `hard × hard_penalty + soft fitness`.
    pub penalty: f64,
    /// No hard violation.
    pub feasible: bool,
    /// Ordering applied by comparisons.
    pub ranking: Ranking,
}

impl TimetableFitness {
    /// Creates a fitness value.
    pub fn new(penalty: f64, feasible: bool, ranking: Ranking) -> Self {
        Self {
            penalty,
            feasible,
            ranking,
        }
    }

    fn feasible_first(&self, other: &Self) -> bool {
        self.ranking == Ranking::FeasibleFirst || other.ranking == Ranking::FeasibleFirst
    }
}

impl PartialEq for TimetableFitness {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for TimetableFitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.feasible_first(other) && self.feasible != other.feasible {
            return Some(other.feasible.cmp(&self.feasible));
        }
        self.penalty.partial_cmp(&other.penalty)
    }
}

impl Fitness for TimetableFitness {
    fn worst() -> Self {
        Self::new(f64::INFINITY, false, Ranking::FitnessOnly)
    }

    fn to_f64(self) -> f64 {
        self.penalty
    }
}

/// Progress snapshot passed to observers after each generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// Generation number (1-based).
    pub generation: usize,
    /// Penalty of the best individual seen so far.
    pub best_fitness: f64,
    /// Whether that individual is feasible.
    pub best_feasible: bool,
}

/// Callback receiving a [`GenerationReport`] per generation.
pub type GenerationObserver = Arc<dyn Fn(&GenerationReport) + Send + Sync>;
