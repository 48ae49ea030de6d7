//! Repair operator.
//!
//! Relocates conflicting genes to restore feasibility.
//!
//! # Algorithm
//!
//! 1. Decode the chromosome and group assignments on the composite keys
//!    (teacher+slot, room+slot, semester+section+slot).
//! 2. In every group keep the first member; every other member, and every
//!    lab sitting in a non-lab room, becomes a relocation target.
//! 3. For each target still in conflict, scan its domain first-fit
//!    (slots in random order, rooms preferred-first) and move it to the
//!    first (slot, room) that clashes with nothing else, respects room
//!    type, and keeps the teacher under the daily cap.
//!
//! No backtracking: a target without a conflict-free alternative stays
//! where it is, and the chromosome remains infeasible.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::chromosome::{Gene, TimetableChromosome};
use super::problem::TimetableGaProblem;
use crate::models::Assignment;
use crate::validation::find_conflict_groups;

/// Repairs a chromosome in place. Returns the number of relocated genes.
pub fn repair_chromosome<R: Rng>(
    problem: &TimetableGaProblem<'_>,
    chromosome: &mut TimetableChromosome,
    rng: &mut R,
) -> usize {
    let hard = &problem.constraints().hard;
    let rooms = problem.rooms();
    let mut assignments = problem.decode(chromosome);

    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    for group in find_conflict_groups(&assignments, hard) {
        for &member in &group.members[1..] {
            if seen.insert(member) {
                targets.push(member);
            }
        }
    }
    if hard.respect_session_room_type {
        for (i, gene) in chromosome.genes.iter().enumerate() {
            if !rooms[gene.room].supports(assignments[i].session_type) && seen.insert(i) {
                targets.push(i);
            }
        }
    }

    let mut moved = 0;
    for i in targets {
        let current = chromosome.genes[i];
        if is_placeable(problem, i, &assignments[i], current, &assignments) {
            continue;
        }
        if let Some(gene) = find_relocation(problem, i, &assignments, rng) {
            chromosome.genes[i] = gene;
            assignments[i].move_to_slot(&problem.slots()[gene.slot]);
            assignments[i].move_to_room(&rooms[gene.room]);
            moved += 1;
        }
    }
    moved
}

/// First conflict-free (slot, room) for gene `i`, if any.
fn find_relocation<R: Rng>(
    problem: &TimetableGaProblem<'_>,
    i: usize,
    assignments: &[Assignment],
    rng: &mut R,
) -> Option<Gene> {
    let domains = problem.domains();
    let mut slots = domains.slots.clone();
    slots.shuffle(rng);

    for &slot in &slots {
        for &room in &domains.rooms[i] {
            let gene = Gene::new(slot, room);
            let mut candidate = assignments[i].clone();
            candidate.move_to_slot(&problem.slots()[slot]);
            candidate.move_to_room(&problem.rooms()[room]);
            if is_placeable(problem, i, &candidate, gene, assignments) {
                return Some(gene);
            }
        }
    }
    None
}

/// Whether `candidate` at position `i` satisfies every enabled hard
/// constraint against all other assignments.
fn is_placeable(
    problem: &TimetableGaProblem<'_>,
    i: usize,
    candidate: &Assignment,
    gene: Gene,
    assignments: &[Assignment],
) -> bool {
    let hard = &problem.constraints().hard;

    if hard.respect_session_room_type && !problem.rooms()[gene.room].supports(candidate.session_type) {
        return false;
    }

    let others = assignments
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, a)| a);

    let mut same_day = 0usize;
    for other in others {
        if candidate.clashes_with(other, hard).is_some() {
            return false;
        }
        if other.teacher_id == candidate.teacher_id && other.day == candidate.day {
            same_day += 1;
        }
    }

    hard.max_teacher_hours_per_day
        .map_or(true, |cap| same_day < cap as usize)
}
