//! Repair-enhanced GA.
//!
//! [`RepairingProblem`] wraps a [`TimetableGaProblem`] for the same
//! `u_metaheur` runner the baseline uses, adding:
//!
//! - **Feasible-first ranking**: fitness values carry
//!   [`Ranking::FeasibleFirst`], so sorting, elitism, and tournaments
//!   prefer feasible individuals before comparing penalties.
//! - **Seeding repair**: each initial individual gets up to
//!   `seeding_attempts` create-then-repair attempts; the last attempt is
//!   accepted regardless.
//! - **Offspring repair**: after mutation, each offspring is repaired with
//!   probability `repair_probability`.
//!
//! The result is the best *feasible* individual ever observed. If none
//! was ever feasible, the run ends with
//! [`GenerationError::NoSolution`](crate::error::GenerationError::NoSolution).

use rand::Rng;
use tracing::warn;
use u_metaheur::ga::GaProblem;

use super::chromosome::TimetableChromosome;
use super::config::GaConfig;
use super::fitness::{Ranking, TimetableFitness};
use super::problem::{OptimizedTimetable, TimetableGaProblem};
use super::repair::repair_chromosome;
use crate::error::GenerationError;
use crate::scheduler::Approach;

/// A [`TimetableGaProblem`] with repair and feasible-first ranking.
#[derive(Debug, Clone, Copy)]
pub struct RepairingProblem<'p, 'a> {
    inner: &'p TimetableGaProblem<'a>,
    repair_probability: f64,
    seeding_attempts: usize,
}

impl<'p, 'a> RepairingProblem<'p, 'a> {
    /// Wraps `inner` with the repair settings of `config`.
    pub fn new(inner: &'p TimetableGaProblem<'a>, config: &GaConfig) -> Self {
        Self {
            inner,
            repair_probability: config.repair_probability.clamp(0.0, 1.0),
            seeding_attempts: config.seeding_attempts.max(1),
        }
    }
}

impl GaProblem for RepairingProblem<'_, '_> {
    type Individual = TimetableChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        let mut chromosome = self.inner.create_individual(rng);
        for attempt in 1..=self.seeding_attempts {
            repair_chromosome(self.inner, &mut chromosome, rng);
            if attempt == self.seeding_attempts
                || self.inner.fitness_of(&chromosome, Ranking::FeasibleFirst).feasible
            {
                break;
            }
            chromosome = self.inner.create_individual(rng);
        }
        chromosome
    }

    fn evaluate(&self, individual: &TimetableChromosome) -> TimetableFitness {
        self.inner.fitness_of(individual, Ranking::FeasibleFirst)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &TimetableChromosome,
        parent2: &TimetableChromosome,
        rng: &mut R,
    ) -> Vec<TimetableChromosome> {
        self.inner.crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut TimetableChromosome, rng: &mut R) {
        self.inner.mutate(individual, rng);
        if rng.random_bool(self.repair_probability) {
            repair_chromosome(self.inner, individual, rng);
        }
    }

    fn on_generation(&self, generation: usize, best: TimetableFitness) {
        self.inner.report(generation, best);
    }
}

impl TimetableGaProblem<'_> {
    /// Runs the repair-enhanced GA and decodes the best valid individual.
    pub fn optimize_with_repair(
        &self,
        config: &GaConfig,
    ) -> Result<OptimizedTimetable, GenerationError> {
        let repairing = RepairingProblem::new(self, config);
        let result = self.evolve(&repairing, config, Ranking::FeasibleFirst)?;

        if !result.best_fitness.feasible {
            warn!(
                generations = result.generations,
                best_fitness = result.best_fitness.penalty,
                "no feasible individual found"
            );
            return Err(GenerationError::NoSolution {
                approach: Approach::Genetic,
            });
        }
        Ok(self.finish(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Gene;
    use crate::models::{Constraints, CourseSession, Room, TimeSlot, TimeWindow};
    use crate::validation::is_conflict_free;
    use chrono::Weekday;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn slots(days: &[Weekday], hours: &[u32]) -> Vec<TimeSlot> {
        let windows: Vec<_> = hours
            .iter()
            .map(|&h| TimeWindow::from_hm((h, 0), (h + 1, 0)))
            .collect();
        TimeSlot::weekly_grid(days, &windows)
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(20)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_returns_feasible() {
        let slots = slots(&[Weekday::Mon, Weekday::Tue], &[9, 10, 11]);
        let sessions = vec![
            CourseSession::theory("Algebra", "T1").with_sessions_per_week(3),
            CourseSession::theory("Poetry", "T1").with_sessions_per_week(2),
            CourseSession::lab("Optics Lab", "T2").with_cohort(2, "B"),
        ];
        let rooms = vec![Room::theory("R1"), Room::lab("L1")];
        let constraints = Constraints::default();
        let problem = TimetableGaProblem::new(&slots, &sessions, &rooms, &constraints)
            .with_config(&config());

        let result = problem.optimize_with_repair(&config()).unwrap();
        assert!(result.valid);
        assert_eq!(result.assignments.len(), 6);
        assert!(is_conflict_free(&result.assignments, &constraints.hard));
    }

    #[test]
    fn test_overbooked_teacher_is_no_solution() {
        // Three sessions of one teacher, two slots: never feasible.
        let slots = slots(&[Weekday::Mon], &[9, 10]);
        let sessions = vec![CourseSession::theory("Algebra", "T1").with_sessions_per_week(3)];
        let rooms = vec![Room::theory("R1"), Room::theory("R2")];
        let constraints = Constraints::default();
        let problem = TimetableGaProblem::new(&slots, &sessions, &rooms, &constraints);

        assert_eq!(
            problem.optimize_with_repair(&config()).unwrap_err(),
            GenerationError::NoSolution {
                approach: Approach::Genetic
            }
        );
    }

    #[test]
    fn test_seeding_repairs_initial_individuals() {
        let slots = slots(&[Weekday::Mon, Weekday::Tue], &[9, 10, 11, 14]);
        let sessions = vec![
            CourseSession::theory("Algebra", "T1").with_sessions_per_week(4),
            CourseSession::theory("Poetry", "T2").with_sessions_per_week(4),
        ];
        let rooms = vec![Room::theory("R1")];
        let constraints = Constraints::default();
        let problem = TimetableGaProblem::new(&slots, &sessions, &rooms, &constraints);
        let repairing = RepairingProblem::new(&problem, &config().with_seeding_attempts(5));
        let mut rng = SmallRng::seed_from_u64(11);

        // Eight sessions over eight slots, one room: every seed must be repaired.
        for _ in 0..5 {
            let individual = repairing.create_individual(&mut rng);
            assert_eq!(individual.len(), 8);
            assert!(repairing.evaluate(&individual).feasible);
        }
    }

    #[test]
    fn test_zero_repair_probability_leaves_mutation_alone() {
        let slots = slots(&[Weekday::Mon], &[9, 10, 11]);
        let sessions = vec![CourseSession::theory("Algebra", "T1").with_sessions_per_week(3)];
        let rooms = vec![Room::theory("R1")];
        let constraints = Constraints::default();
        let problem = TimetableGaProblem::new(&slots, &sessions, &rooms, &constraints)
            .with_mutation_rate(0.0);
        let repairing =
            RepairingProblem::new(&problem, &config().with_repair_probability(0.0));
        let mut rng = SmallRng::seed_from_u64(3);

        let mut clash = TimetableChromosome::new(vec![Gene::new(0, 0); 3]);
        let before = clash.clone();
        repairing.mutate(&mut clash, &mut rng);
        assert_eq!(clash.genes, before.genes);

        let always = RepairingProblem::new(&problem, &config().with_repair_probability(1.0));
        always.mutate(&mut clash, &mut rng);
        assert!(always.evaluate(&clash).feasible);
    }
}
