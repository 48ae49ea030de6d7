//! Error types.
//!
//! "No solution within budget" is an expected outcome, not a fault; it is
//! still carried as [`GenerationError::NoSolution`] so strategies can
//! propagate it with `?`. The integrated generator folds every error into
//! a failed [`TimetableResult`](crate::scheduler::TimetableResult).

use thiserror::Error;

use crate::scheduler::Approach;
use crate::validation::ValidationError;

/// Why a generation strategy produced no timetable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The input cannot be scheduled as given.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
    /// A tuning parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The search budget ran out without a valid timetable.
    #[error("no valid timetable found by the {approach} approach")]
    NoSolution {
        /// Strategy that gave up.
        approach: Approach,
    },
    /// The caller cancelled the run or its deadline passed.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Human-readable messages, one per underlying problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::InvalidInput(errors) => errors.iter().map(|e| e.message.clone()).collect(),
            other => vec![other.to_string()],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display() {
        let err = GenerationError::NoSolution {
            approach: Approach::Constraint,
        };
        assert_eq!(err.to_string(), "no valid timetable found by the constraint approach");
        assert_eq!(GenerationError::Cancelled.to_string(), "generation cancelled");
    }

    #[test]
    fn test_invalid_input_messages() {
        let err = GenerationError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::EmptyInput, "No rooms supplied"),
            ValidationError::new(ValidationErrorKind::EmptyInput, "No time slots supplied"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: No rooms supplied; No time slots supplied"
        );
        assert_eq!(err.messages().len(), 2);
    }
}
