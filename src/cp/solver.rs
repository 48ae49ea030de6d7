//! Backtracking constraint solver.
//!
//! # Algorithm
//!
//! 1. Expand sessions into weekly instances.
//! 2. Order instances most-constrained-first via the [`RuleEngine`].
//! 3. Build filtered domains; fail immediately if any instance has none.
//! 4. Depth-first search over an explicit stack: each depth keeps a cursor
//!    into its candidate list. A candidate consistent with every accepted
//!    assignment is pushed and the search descends; when a depth runs out
//!    of candidates its cursor is reset and the previous assignment popped.
//!
//! Each accepted placement counts as one iteration. Exceeding the
//! iteration budget ends the search with [`SearchStatus::IterationLimit`].
//!
//! # Reference
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", ch. 6
//! - Haralick & Elliott (1980), "Increasing tree search efficiency for
//!   constraint satisfaction problems"

use tracing::{debug, instrument};

use super::domain::Domains;
use crate::dispatching::RuleEngine;
use crate::models::{expand_sessions, Assignment, Constraints, CourseSession, Room, TimeSlot};
use crate::scheduler::CancelToken;

/// Default search budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Every instance was placed.
    Solved,
    /// The whole search tree was explored without a solution.
    Exhausted,
    /// The iteration budget ran out.
    IterationLimit,
    /// The cancel token fired.
    Cancelled,
    /// Some instance had no candidate before search started.
    EmptyDomain,
}

/// Detailed search result.
#[derive(Debug, Clone, PartialEq)]
pub struct CspOutcome {
    /// Accepted assignments; complete only when `status` is `Solved`.
    pub assignments: Vec<Assignment>,
    /// How the search ended.
    pub status: SearchStatus,
    /// Placements performed.
    pub iterations: usize,
    /// Placements undone.
    pub backtracks: usize,
}

impl CspOutcome {
    /// Whether every instance was placed.
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    fn unsolved(status: SearchStatus, iterations: usize, backtracks: usize) -> Self {
        Self {
            assignments: Vec::new(),
            status,
            iterations,
            backtracks,
        }
    }
}

/// Backtracking solver with most-constrained-first ordering and
/// domain filtering.
///
/// # Example
/// ```
/// use chrono::Weekday;
/// use u_timetable::cp::CspSolver;
/// use u_timetable::models::{Constraints, CourseSession, Room, TimeSlot, TimeWindow};
///
/// let slots = TimeSlot::weekly_grid(
///     &[Weekday::Mon],
///     &[TimeWindow::from_hm((9, 0), (10, 0)), TimeWindow::from_hm((10, 0), (11, 0))],
/// );
/// let sessions = vec![
///     CourseSession::theory("Algebra", "T1"),
///     CourseSession::theory("Geometry", "T1"),
/// ];
/// let rooms = vec![Room::theory("R1")];
/// let constraints = Constraints::default();
///
/// let assignments = CspSolver::new(&slots, &sessions, &rooms, &constraints)
///     .solve()
///     .expect("two slots fit two sessions");
/// assert_eq!(assignments.len(), 2);
/// assert_ne!(assignments[0].time_slot_id, assignments[1].time_slot_id);
/// ```
#[derive(Debug, Clone)]
pub struct CspSolver<'a> {
    slots: &'a [TimeSlot],
    sessions: &'a [CourseSession],
    rooms: &'a [Room],
    constraints: &'a Constraints,
    max_iterations: usize,
    cancel: CancelToken,
}

impl<'a> CspSolver<'a> {
    /// Creates a solver with the default budget.
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
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cancel: CancelToken::default(),
        }
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Attaches a cancel token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Searches for a complete, hard-constraint-valid assignment set.
    ///
    /// Returns `None` when no solution was found within budget.
    pub fn solve(&self) -> Option<Vec<Assignment>> {
        let outcome = self.solve_detailed();
        outcome.is_solved().then_some(outcome.assignments)
    }

    /// Searches and reports how the search ended.
    #[instrument(
        name = "csp",
        skip(self),
        fields(sessions = self.sessions.len(), max_iterations = self.max_iterations)
    )]
    pub fn solve_detailed(&self) -> CspOutcome {
        let instances = expand_sessions(self.sessions);
        let order = RuleEngine::most_constrained_first().sort(&instances);
        let domains = Domains::build(&order, self.slots, self.rooms, self.constraints);

        if let Some(i) = domains.find_empty() {
            debug!(
                course = %order[i].session.course_name,
                session_type = %order[i].session.session_type,
                "empty domain"
            );
            return CspOutcome::unsolved(SearchStatus::EmptyDomain, 0, 0);
        }

        let n = order.len();
        let mut accepted: Vec<Assignment> = Vec::with_capacity(n);
        let mut cursors = vec![0usize; n];
        let mut iterations = 0usize;
        let mut backtracks = 0usize;
        let mut depth = 0usize;

        while depth < n {
            if self.cancel.is_cancelled() {
                debug!(iterations, backtracks, "cancelled");
                return CspOutcome::unsolved(SearchStatus::Cancelled, iterations, backtracks);
            }

            let session = order[depth].session;
            let total = domains.candidate_count(depth);
            let mut placed = false;

            while cursors[depth] < total {
                let (slot, room) = domains.candidate(depth, cursors[depth]);
                cursors[depth] += 1;

                let candidate = Assignment::new(session, &self.slots[slot], &self.rooms[room]);
                if !self.is_consistent(&candidate, &self.rooms[room], &accepted) {
                    continue;
                }
                if iterations >= self.max_iterations {
                    debug!(iterations, backtracks, "iteration limit reached");
                    return CspOutcome::unsolved(
                        SearchStatus::IterationLimit,
                        iterations,
                        backtracks,
                    );
                }
                iterations += 1;
                accepted.push(candidate);
                placed = true;
                break;
            }

            if placed {
                depth += 1;
            } else if depth == 0 {
                debug!(iterations, backtracks, "search space exhausted");
                return CspOutcome::unsolved(SearchStatus::Exhausted, iterations, backtracks);
            } else {
                cursors[depth] = 0;
                depth -= 1;
                accepted.pop();
                backtracks += 1;
            }
        }

        debug!(iterations, backtracks, assignments = accepted.len(), "solved");
        CspOutcome {
            assignments: accepted,
            status: SearchStatus::Solved,
            iterations,
            backtracks,
        }
    }

    /// Checks every enabled hard constraint against the accepted set.
    fn is_consistent(&self, candidate: &Assignment, room: &Room, accepted: &[Assignment]) -> bool {
        let hard = &self.constraints.hard;

        if hard.respect_session_room_type && !room.supports(candidate.session_type) {
            return false;
        }
        if accepted
            .iter()
            .any(|a| candidate.clashes_with(a, hard).is_some())
        {
            return false;
        }
        if let Some(cap) = hard.max_teacher_hours_per_day {
            let load = accepted
                .iter()
                .filter(|a| a.teacher_id == candidate.teacher_id && a.day == candidate.day)
                .count();
            if load >= cap as usize {
                return false;
            }
        }
        true
    }
}

/// Runs the solver with the given budget.
///
/// Shorthand for `CspSolver::new(..).with_max_iterations(..).solve()`.
pub fn solve(
    slots: &[TimeSlot],
    sessions: &[CourseSession],
    rooms: &[Room],
    constraints: &Constraints,
    max_iterations: usize,
) -> Option<Vec<Assignment>> {
    CspSolver::new(slots, sessions, rooms, constraints)
        .with_max_iterations(max_iterations)
        .solve()
}
