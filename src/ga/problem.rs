//! Timetabling GA problem definition.
//!
//! Implements `u_metaheur::ga::GaProblem` over the slot/room vector
//! encoding and drives `u_metaheur::ga::GaRunner`. Bridges domain models
//! (sessions, slots, rooms, constraints) to the evolutionary loop.
//!
//! # Fitness
//!
//! `fitness = hard_violations × hard_penalty + Σ weight × soft metric`
//!
//! where `hard_violations` counts, over the enabled hard constraints:
//! - for each composite-key group with `m > 1` members, `m − 1`
//! - each lab in a room that cannot host labs
//! - each session beyond a teacher's daily cap
//! - each session instance without a gene

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};
use u_metaheur::ga::{GaProblem, GaResult, GaRunner};

use super::chromosome::{reassign_mutation, single_point_crossover, Gene, TimetableChromosome};
use super::config::GaConfig;
use super::fitness::{GenerationObserver, GenerationReport, Ranking, TimetableFitness};
use crate::cp::Domains;
use crate::error::GenerationError;
use crate::models::{
    expand_sessions, Assignment, Constraints, CourseSession, Room, SessionInstance, TimeSlot,
};
use crate::scheduler::kpi::soft_fitness;
use crate::scheduler::{Approach, CancelToken};
use crate::validation::count_hard_violations;

/// Random draws tried per gene before a loosely checked placement is given up.
const PLACEMENT_ATTEMPTS: usize = 20;

/// GA problem definition for timetable optimization.
///
/// # Example
/// ```
/// use chrono::Weekday;
/// use u_timetable::ga::{GaConfig, TimetableGaProblem};
/// use u_timetable::models::{Constraints, CourseSession, Room, TimeSlot, TimeWindow};
///
/// let slots = TimeSlot::weekly_grid(
///     &[Weekday::Mon, Weekday::Tue],
///     &[TimeWindow::from_hm((9, 0), (10, 0)), TimeWindow::from_hm((10, 0), (11, 0))],
/// );
/// let sessions = vec![CourseSession::theory("Algebra", "T1").with_sessions_per_week(2)];
/// let rooms = vec![Room::theory("R1")];
/// let constraints = Constraints::default();
///
/// let config = GaConfig::default().with_population_size(10).with_seed(42);
/// let problem = TimetableGaProblem::new(&slots, &sessions, &rooms, &constraints)
///     .with_config(&config);
/// let best = problem.optimize_with_repair(&config).expect("feasible");
/// assert!(best.valid);
/// assert_eq!(best.assignments.len(), 2);
/// ```
#[derive(Clone)]
pub struct TimetableGaProblem<'a> {
    slots: &'a [TimeSlot],
    rooms: &'a [Room],
    constraints: &'a Constraints,
    instances: Vec<SessionInstance<'a>>,
    domains: Domains,
    mutation_rate: f64,
    hard_penalty: f64,
    observer: Option<GenerationObserver>,
    cancel: CancelToken,
}

/// Decoded result of a GA run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedTimetable {
    /// Assignments of the best individual.
    pub assignments: Vec<Assignment>,
    /// Its fitness.
    pub fitness: f64,
    /// Whether it satisfies every hard constraint.
    pub valid: bool,
    /// Generations run.
    pub generations: usize,
}

impl<'a> TimetableGaProblem<'a> {
    /// Creates a problem from domain models.
    pub fn new(
        slots: &'a [TimeSlot],
        sessions: &'a [CourseSession],
        rooms: &'a [Room],
        constraints: &'a Constraints,
    ) -> Self {
        let instances = expand_sessions(sessions);
        let domains = Domains::build(&instances, slots, rooms, constraints);
        Self {
            slots,
            rooms,
            constraints,
            instances,
            domains,
            mutation_rate: 0.1,
            hard_penalty: 1000.0,
            observer: None,
            cancel: CancelToken::new(),
        }
    }

    /// Takes mutation rate and hard penalty from a GA configuration.
    pub fn with_config(self, config: &GaConfig) -> Self {
        self.with_mutation_rate(config.mutation_rate)
            .with_hard_penalty(config.hard_penalty)
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the penalty per hard violation.
    pub fn with_hard_penalty(mut self, penalty: f64) -> Self {
        self.hard_penalty = penalty;
        self
    }

    /// Attaches a per-generation progress observer.
    pub fn with_observer(mut self, observer: GenerationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attaches a cancel token, polled once per generation.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Expanded session instances, in gene order.
    pub fn instances(&self) -> &[SessionInstance<'a>] {
        &self.instances
    }

    /// Filtered slot and room domains.
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Time slots.
    pub fn slots(&self) -> &'a [TimeSlot] {
        self.slots
    }

    /// Rooms.
    pub fn rooms(&self) -> &'a [Room] {
        self.rooms
    }

    /// Constraint configuration.
    pub fn constraints(&self) -> &'a Constraints {
        self.constraints
    }

    /// Decodes a chromosome into assignments, in gene order.
    pub fn decode(&self, chromosome: &TimetableChromosome) -> Vec<Assignment> {
        self.instances
            .iter()
            .zip(&chromosome.genes)
            .map(|(inst, gene)| {
                Assignment::new(inst.session, &self.slots[gene.slot], &self.rooms[gene.room])
            })
            .collect()
    }

    /// Number of hard violations of a decoded chromosome.
    pub fn hard_violations(&self, chromosome: &TimetableChromosome, assignments: &[Assignment]) -> usize {
        let hard = &self.constraints.hard;
        let mut count = count_hard_violations(assignments, hard)
            + self.instances.len().saturating_sub(chromosome.genes.len());

        if hard.respect_session_room_type {
            count += chromosome
                .genes
                .iter()
                .zip(assignments)
                .filter(|(gene, a)| !self.rooms[gene.room].supports(a.session_type))
                .count();
        }

        if let Some(cap) = hard.max_teacher_hours_per_day {
            let mut per_day: HashMap<(&str, u32), usize> = HashMap::new();
            for a in assignments {
                *per_day
                    .entry((a.teacher_id.as_str(), a.day.num_days_from_monday()))
                    .or_insert(0) += 1;
            }
            count += per_day
                .values()
                .map(|&n| n.saturating_sub(cap as usize))
                .sum::<usize>();
        }
        count
    }

    /// Builds a random chromosome with loose local checks.
    ///
    /// Each gene is drawn at random, preferring draws whose teacher, room,
    /// and cohort are still free in that slot among the genes built so far.
    /// Returns `None` if some instance has an empty domain.
    pub fn random_chromosome<R: Rng>(&self, rng: &mut R) -> Option<TimetableChromosome> {
        if self.domains.find_empty().is_some() {
            return None;
        }

        let mut teacher_busy: HashSet<(&str, usize)> = HashSet::new();
        let mut room_busy: HashSet<(usize, usize)> = HashSet::new();
        let mut cohort_busy: HashSet<(u32, &str, usize)> = HashSet::new();
        let mut genes = Vec::with_capacity(self.instances.len());

        for (inst, rooms) in self.instances.iter().zip(&self.domains.rooms) {
            let session = inst.session;
            let draw = |rng: &mut R| -> Option<Gene> {
                Some(Gene::new(*self.domains.slots.choose(rng)?, *rooms.choose(rng)?))
            };
            let is_free = |g: &Gene| {
                !teacher_busy.contains(&(session.teacher_id.as_str(), g.slot))
                    && !room_busy.contains(&(g.room, g.slot))
                    && !cohort_busy.contains(&(session.semester, session.section.as_str(), g.slot))
            };

            let mut gene = draw(&mut *rng)?;
            for _ in 1..PLACEMENT_ATTEMPTS {
                if is_free(&gene) {
                    break;
                }
                gene = draw(&mut *rng)?;
            }

            teacher_busy.insert((session.teacher_id.as_str(), gene.slot));
            room_busy.insert((gene.room, gene.slot));
            cohort_busy.insert((session.semester, session.section.as_str(), gene.slot));
            genes.push(gene);
        }

        Some(TimetableChromosome::new(genes))
    }

    /// Scores a chromosome under the given ranking.
    pub fn fitness_of(&self, chromosome: &TimetableChromosome, ranking: Ranking) -> TimetableFitness {
        let assignments = self.decode(chromosome);
        let hard = self.hard_violations(chromosome, &assignments);
        TimetableFitness::new(
            hard as f64 * self.hard_penalty + soft_fitness(&assignments, self.constraints),
            hard == 0,
            ranking,
        )
    }

    /// Runs the baseline GA and decodes the best individual.
    ///
    /// The best individual ever observed is returned, feasible or not.
    pub fn optimize(&self, config: &GaConfig) -> Result<OptimizedTimetable, GenerationError> {
        let result = self.evolve(self, config, Ranking::FitnessOnly)?;
        Ok(self.finish(result))
    }

    /// Runs `problem` on the `u_metaheur` runner under this problem's
    /// cancel token.
    ///
    /// A deadline becomes the runner's time limit. Cancellation and
    /// timeouts yield [`GenerationError::Cancelled`].
    #[instrument(
        name = "ga",
        skip_all,
        fields(
            ranking = ?ranking,
            population = config.population_size,
            max_generations = config.max_generations,
        )
    )]
    pub(super) fn evolve<P>(
        &self,
        problem: &P,
        config: &GaConfig,
        ranking: Ranking,
    ) -> Result<GaResult<TimetableChromosome>, GenerationError>
    where
        P: GaProblem<Individual = TimetableChromosome>,
    {
        config.validate()?;
        if let Some(index) = self.domains.find_empty() {
            warn!(instance = index, "no candidate placement, no individual can be built");
            return Err(GenerationError::NoSolution {
                approach: Approach::Genetic,
            });
        }
        if self.cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let mut runner_config = config.runner_config();
        if let Some(remaining) = self.cancel.remaining() {
            let ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
            runner_config = runner_config.with_time_limit_ms(ms.max(1));
        }

        let result = GaRunner::run_with_cancel(problem, &runner_config, Some(self.cancel.flag()));
        if result.cancelled || result.timed_out {
            debug!(generations = result.generations, "cancelled");
            return Err(GenerationError::Cancelled);
        }

        debug!(
            generations = result.generations,
            stagnated = result.stagnated,
            best_fitness = result.best_fitness.penalty,
            feasible = result.best_fitness.feasible,
            "evolution finished"
        );
        Ok(result)
    }

    pub(super) fn finish(&self, result: GaResult<TimetableChromosome>) -> OptimizedTimetable {
        let fitness = self.fitness_of(&result.best, Ranking::FitnessOnly);
        info!(
            generations = result.generations,
            best_fitness = fitness.penalty,
            valid = fitness.feasible,
            "ga finished"
        );
        OptimizedTimetable {
            assignments: self.decode(&result.best),
            fitness: fitness.penalty,
            valid: fitness.feasible,
            generations: result.generations,
        }
    }

    pub(super) fn report(&self, generation: usize, best: TimetableFitness) {
        let report = GenerationReport {
            generation,
            best_fitness: best.penalty,
            best_feasible: best.feasible,
        };
        debug!(
            generation,
            best_fitness = report.best_fitness,
            best_feasible = report.best_feasible,
            "generation"
        );
        if let Some(observer) = &self.observer {
            observer(&report);
        }
    }
}

impl fmt::Debug for TimetableGaProblem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimetableGaProblem")
            .field("instances", &self.instances.len())
            .field("slots", &self.slots.len())
            .field("rooms", &self.rooms.len())
            .field("mutation_rate", &self.mutation_rate)
            .field("hard_penalty", &self.hard_penalty)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl GaProblem for TimetableGaProblem<'_> {
    type Individual = TimetableChromosome;

    /// An instance with an empty domain leaves the chromosome short;
    /// every missing gene counts as a hard violation.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        self.random_chromosome(rng)
            .unwrap_or_else(|| TimetableChromosome::new(Vec::new()))
    }

    fn evaluate(&self, individual: &TimetableChromosome) -> TimetableFitness {
        self.fitness_of(individual, Ranking::FitnessOnly)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &TimetableChromosome,
        parent2: &TimetableChromosome,
        rng: &mut R,
    ) -> Vec<TimetableChromosome> {
        let (c1, c2) = single_point_crossover(parent1, parent2, rng);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut TimetableChromosome, rng: &mut R) {
        reassign_mutation(
            individual,
            &self.domains.slots,
            &self.domains.rooms,
            self.mutation_rate,
            rng,
        );
    }

    fn on_generation(&self, generation: usize, best: TimetableFitness) {
        self.report(generation, best);
    }
}
