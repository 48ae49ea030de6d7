//! Lexicographic rule chain.
//!
//! Rules are consulted in the order they were added; a rule only decides
//! pairs every earlier rule scored equally. Pairs no rule separates fall
//! to the final [`TieBreaker`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{rules, DispatchingRule};
use crate::models::{CourseSession, SessionInstance};

/// Scores closer than this count as equal.
const SCORE_EPSILON: f64 = 1e-9;

/// Order of sessions every rule scores equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Alphabetical by course name.
    ByCourseName,
}

/// Orders session instances by placement priority.
///
/// # Example
/// ```
/// use u_timetable::dispatching::{rules, RuleEngine, TieBreaker};
/// use u_timetable::models::{expand_sessions, CourseSession};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::SessionKindRank)
///     .with_final_tie_breaker(TieBreaker::ByCourseName);
/// let sessions = vec![
///     CourseSession::theory("B", "T1").with_course_name("Biology"),
///     CourseSession::theory("A", "T2").with_course_name("Anatomy"),
/// ];
/// let instances = expand_sessions(&sessions);
/// assert_eq!(engine.sort_indices(&instances), vec![1, 0]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an engine with no rules (input order is kept).
    pub fn new() -> Self {
        Self::default()
    }

    /// Most-constrained-first ordering used by the constraint solver.
    ///
    /// Lab before tutorial before theory, then more weekly occurrences
    /// first, then alphabetical by course name.
    pub fn most_constrained_first() -> Self {
        Self::new()
            .with_rule(rules::SessionKindRank)
            .with_rule(rules::MostSessionsPerWeek)
            .with_final_tie_breaker(TieBreaker::ByCourseName)
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets what decides ties no rule breaks.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Compares two sessions; `Less` means `a` is placed first.
    pub fn compare(&self, a: &CourseSession, b: &CourseSession) -> Ordering {
        for rule in &self.rules {
            let (sa, sb) = (rule.evaluate(a), rule.evaluate(b));
            if (sa - sb).abs() > SCORE_EPSILON {
                return sa.total_cmp(&sb);
            }
        }
        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ByCourseName => a.course_name.cmp(&b.course_name),
        }
    }

    /// Indices of `instances` in placement order.
    ///
    /// The sort is stable, so occurrences of the same session stay in
    /// occurrence order.
    pub fn sort_indices(&self, instances: &[SessionInstance<'_>]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..instances.len()).collect();
        indices.sort_by(|&a, &b| self.compare(instances[a].session, instances[b].session));
        indices
    }

    /// The instances reordered by placement priority.
    pub fn sort<'a>(&self, instances: &[SessionInstance<'a>]) -> Vec<SessionInstance<'a>> {
        self.sort_indices(instances)
            .into_iter()
            .map(|i| instances[i])
            .collect()
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("RuleEngine")
            .field("rules", &names)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expand_sessions;

    fn course_ids(engine: &RuleEngine, sessions: &[CourseSession]) -> Vec<String> {
        let instances = expand_sessions(sessions);
        engine
            .sort(&instances)
            .iter()
            .map(|i| i.session.course_id.clone())
            .collect()
    }

    #[test]
    fn test_kind_ordering() {
        let sessions = vec![
            CourseSession::theory("theory", "T1"),
            CourseSession::tutorial("tutorial", "T2"),
            CourseSession::lab("lab", "T3"),
        ];
        let ids = course_ids(&RuleEngine::most_constrained_first(), &sessions);
        assert_eq!(ids, vec!["lab", "tutorial", "theory"]);
    }

    #[test]
    fn test_multiplicity_breaks_kind_tie() {
        let sessions = vec![
            CourseSession::theory("once", "T1"),
            CourseSession::theory("twice", "T2").with_sessions_per_week(2),
        ];
        let ids = course_ids(&RuleEngine::most_constrained_first(), &sessions);
        assert_eq!(ids, vec!["twice", "twice", "once"]);
    }

    #[test]
    fn test_kind_outranks_multiplicity() {
        let sessions = vec![
            CourseSession::theory("heavy", "T1").with_sessions_per_week(4),
            CourseSession::lab("lab", "T2"),
        ];
        let ids = course_ids(&RuleEngine::most_constrained_first(), &sessions);
        assert_eq!(ids, vec!["lab", "heavy", "heavy", "heavy", "heavy"]);
    }

    #[test]
    fn test_course_name_breaks_remaining_ties() {
        let sessions = vec![
            CourseSession::theory("c2", "T1").with_course_name("Physics"),
            CourseSession::theory("c1", "T2").with_course_name("Algebra"),
        ];
        let ids = course_ids(&RuleEngine::most_constrained_first(), &sessions);
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_input_order_tie_breaker() {
        let sessions = vec![
            CourseSession::theory("b", "T1"),
            CourseSession::theory("a", "T2"),
        ];
        let engine = RuleEngine::new().with_rule(rules::SessionKindRank);
        assert_eq!(course_ids(&engine, &sessions), vec!["b", "a"]);
    }

    #[test]
    fn test_empty_instances() {
        let engine = RuleEngine::most_constrained_first();
        assert!(engine.sort_indices(&[]).is_empty());
    }
}
