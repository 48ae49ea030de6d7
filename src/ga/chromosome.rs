//! Slot/room vector chromosome for timetabling.
//!
//! # Encoding
//!
//! One [`Gene`] per expanded session instance, in a fixed instance order.
//! Each gene holds the index of the assigned time slot and room. Because
//! position *i* always encodes instance *i*, crossover and mutation can
//! never add or drop an occurrence: a session with `k` weekly occurrences
//! always decodes to exactly `k` assignments.

use rand::prelude::IndexedRandom;
use rand::Rng;

use u_metaheur::ga::{Fitness, Individual};

use super::fitness::TimetableFitness;

/// Slot and room indices for one session instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gene {
    /// Index into the problem's time slots.
    pub slot: usize,
    /// Index into the problem's rooms.
    pub room: usize,
}

impl Gene {
    /// Creates a gene.
    pub fn new(slot: usize, room: usize) -> Self {
        Self { slot, room }
    }
}

/// A complete candidate timetable.
///
/// Lower fitness = better timetable (minimization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableChromosome {
    /// One gene per session instance.
    pub genes: Vec<Gene>,
    /// Last evaluation.
    pub fitness: TimetableFitness,
}

impl Individual for TimetableChromosome {
    type Fitness = TimetableFitness;

    fn fitness(&self) -> TimetableFitness {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: TimetableFitness) {
        self.fitness = fitness;
    }
}

impl TimetableChromosome {
    /// Wraps genes into an unevaluated chromosome.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: TimetableFitness::worst(),
        }
    }

    /// Whether the last evaluation found no hard violation.
    pub fn is_valid(&self) -> bool {
        self.fitness.feasible
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Single-point crossover.
///
/// Picks a cut point in `1..len` and swaps the tails. Chromosomes shorter
/// than two genes are returned as clones.
pub fn single_point_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    rng: &mut R,
) -> (TimetableChromosome, TimetableChromosome) {
    let n = p1.len().min(p2.len());
    if n < 2 {
        return (
            TimetableChromosome::new(p1.genes.clone()),
            TimetableChromosome::new(p2.genes.clone()),
        );
    }

    let cut = rng.random_range(1..n);
    let mut c1 = p1.genes[..cut].to_vec();
    c1.extend_from_slice(&p2.genes[cut..]);
    let mut c2 = p2.genes[..cut].to_vec();
    c2.extend_from_slice(&p1.genes[cut..]);

    (TimetableChromosome::new(c1), TimetableChromosome::new(c2))
}

/// Reassignment mutation.
///
/// Each gene mutates with probability `rate`; a mutating gene receives
/// either a new slot from `slot_domain` or a new room from its own room
/// domain, with equal probability. Empty domains leave the gene unchanged.
pub fn reassign_mutation<R: Rng>(
    chromosome: &mut TimetableChromosome,
    slot_domain: &[usize],
    room_domains: &[Vec<usize>],
    rate: f64,
    rng: &mut R,
) {
    for (gene, rooms) in chromosome.genes.iter_mut().zip(room_domains) {
        if !rng.random_bool(rate) {
            continue;
        }
        if rng.random_bool(0.5) {
            if let Some(&slot) = slot_domain.choose(rng) {
                gene.slot = slot;
            }
        } else if let Some(&room) = rooms.choose(rng) {
            gene.room = room;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn chromosome(genes: &[(usize, usize)]) -> TimetableChromosome {
        TimetableChromosome::new(genes.iter().map(|&(s, r)| Gene::new(s, r)).collect())
    }

    #[test]
    fn test_new_is_unevaluated() {
        let c = chromosome(&[(0, 0)]);
        assert!(c.fitness.penalty.is_infinite());
        assert!(!c.is_valid());
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_crossover_preserves_length_and_positions() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = chromosome(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let p2 = chromosome(&[(9, 1), (8, 1), (7, 1), (6, 1)]);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);

        assert_eq!(c1.len(), 4);
        assert_eq!(c2.len(), 4);
        // Heads come from one parent, tails from the other.
        assert_eq!(c1.genes[0], p1.genes[0]);
        assert_eq!(c2.genes[0], p2.genes[0]);
        assert_eq!(c1.genes[3], p2.genes[3]);
        assert_eq!(c2.genes[3], p1.genes[3]);
        for i in 0..4 {
            assert!(c1.genes[i] == p1.genes[i] || c1.genes[i] == p2.genes[i]);
        }
    }

    #[test]
    fn test_crossover_single_gene() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = chromosome(&[(0, 0)]);
        let p2 = chromosome(&[(1, 1)]);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.genes, p1.genes);
        assert_eq!(c2.genes, p2.genes);
    }

    #[test]
    fn test_mutation_stays_in_domain() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut c = chromosome(&[(0, 0), (0, 2), (1, 0)]);
        let slots = vec![0, 1, 3];
        let rooms = vec![vec![0, 1], vec![2], vec![0]];
        reassign_mutation(&mut c, &slots, &rooms, 1.0, &mut rng);

        for (gene, domain) in c.genes.iter().zip(&rooms) {
            assert!(slots.contains(&gene.slot));
            assert!(domain.contains(&gene.room));
        }
    }

    #[test]
    fn test_zero_rate_is_noop() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut c = chromosome(&[(0, 0), (1, 1)]);
        let before = c.genes.clone();
        reassign_mutation(&mut c, &[0, 1, 2], &[vec![0, 1], vec![0, 1]], 0.0, &mut rng);
        assert_eq!(c.genes, before);
    }
}
