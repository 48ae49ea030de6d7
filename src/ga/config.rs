//! GA configuration.
//!
//! [`GaConfig`] is the serializable parameter set of both timetabling
//! optimizers. [`GaConfig::runner_config`] maps it onto the
//! `u_metaheur` runner configuration; the per-gene mutation rate, the
//! repair fields, and the hard penalty stay with the problem. The repair
//! fields are ignored by the baseline.

use serde::{Deserialize, Serialize};
use u_metaheur::ga::{GaConfig as RunnerConfig, Selection};

use crate::error::GenerationError;

/// Configuration for the genetic optimizers.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(80)
///     .with_tournament_size(4)
///     .with_repair_probability(0.8)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,

    /// Individuals sampled per tournament.
    pub tournament_size: usize,

    /// Probability that a gene of an offspring is reassigned (0.0–1.0).
    pub mutation_rate: f64,

    /// Generations without improvement before stopping. 0 disables.
    pub stagnation_limit: usize,

    /// Probability of repairing a new offspring (0.0–1.0).
    pub repair_probability: f64,

    /// Create-then-repair attempts per seeded individual.
    pub seeding_attempts: usize,

    /// Fitness penalty per hard violation.
    pub hard_penalty: f64,

    /// Random seed for reproducibility. `None` uses OS entropy.
    pub seed: Option<u64>,

    /// Evaluate the population on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            elite_count: 2,
            tournament_size: 3,
            mutation_rate: 0.1,
            stagnation_limit: 20,
            repair_probability: 0.5,
            seeding_attempts: 3,
            hard_penalty: 1000.0,
            seed: None,
            parallel: true,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the offspring repair probability.
    pub fn with_repair_probability(mut self, p: f64) -> Self {
        self.repair_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the number of seeding attempts per individual.
    pub fn with_seeding_attempts(mut self, n: usize) -> Self {
        self.seeding_attempts = n;
        self
    }

    /// Sets the hard-violation penalty.
    pub fn with_hard_penalty(mut self, penalty: f64) -> Self {
        self.hard_penalty = penalty;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runner configuration for `u_metaheur::ga::GaRunner`.
    ///
    /// Every pair of parents is recombined and every offspring goes
    /// through the problem's mutation, which applies `mutation_rate` per
    /// gene. The elite ratio is chosen so that the runner keeps exactly
    /// `elite_count` elites.
    pub fn runner_config(&self) -> RunnerConfig {
        let elite_ratio = (self.elite_count as f64 + 0.5) / self.population_size.max(1) as f64;
        let mut config = RunnerConfig::default()
            .with_population_size(self.population_size)
            .with_max_generations(self.max_generations)
            .with_selection(Selection::Tournament(self.tournament_size))
            .with_elite_ratio(elite_ratio)
            .with_crossover_rate(1.0)
            .with_mutation_rate(1.0)
            .with_stagnation_limit(self.stagnation_limit)
            .with_parallel(self.parallel);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let fail = |msg: &str| Err(GenerationError::InvalidConfig(msg.into()));
        if self.elite_count >= self.population_size {
            return fail("elite_count must be smaller than population_size");
        }
        if self.tournament_size == 0 {
            return fail("tournament_size must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return fail("mutation_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.repair_probability) {
            return fail("repair_probability must be within [0, 1]");
        }
        if self.seeding_attempts == 0 {
            return fail("seeding_attempts must be at least 1");
        }
        if self.hard_penalty.is_nan() || self.hard_penalty <= 0.0 {
            return fail("hard_penalty must be positive");
        }
        self.runner_config()
            .validate()
            .map_err(GenerationError::InvalidConfig)
    }
}
