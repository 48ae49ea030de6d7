//! Course session model.
//!
//! A [`CourseSession`] is a recurring weekly teaching need: one course,
//! one teacher, one session type, repeated `sessions_per_week` times.
//! Solvers never place a `CourseSession` directly; they expand it into
//! independent [`SessionInstance`]s, one per weekly occurrence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Lecture.
    Theory,
    /// Laboratory practical. Needs a lab-capable room.
    Lab,
    /// Small-group tutorial.
    Tutorial,
}

impl SessionType {
    /// Whether this session needs a lab-capable room.
    #[inline]
    pub fn is_lab(self) -> bool {
        matches!(self, Self::Lab)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Theory => "theory",
            Self::Lab => "lab",
            Self::Tutorial => "tutorial",
        };
        f.write_str(name)
    }
}

/// A recurring teaching need to be placed on the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseSession {
    /// Course identifier.
    pub course_id: String,
    /// Course display name.
    pub course_name: String,
    /// Course catalog code (e.g. "CS101").
    pub course_code: String,
    /// Teacher identifier.
    pub teacher_id: String,
    /// Teacher display name.
    pub teacher_name: String,
    /// Session kind.
    pub session_type: SessionType,
    /// Number of independent weekly occurrences.
    pub sessions_per_week: u32,
    /// Length of one occurrence in minutes.
    pub duration_minutes: u32,
    /// Student cohort semester.
    pub semester: u32,
    /// Student cohort section within the semester.
    pub section: String,
    /// Preferred room ID, tried first when compatible.
    pub preferred_room_id: Option<String>,
}

impl CourseSession {
    /// Creates a session with one weekly occurrence of 60 minutes.
    ///
    /// Names default to the IDs until set explicitly.
    pub fn new(
        course_id: impl Into<String>,
        teacher_id: impl Into<String>,
        session_type: SessionType,
    ) -> Self {
        let course_id = course_id.into();
        let teacher_id = teacher_id.into();
        Self {
            course_name: course_id.clone(),
            course_code: course_id.clone(),
            teacher_name: teacher_id.clone(),
            course_id,
            teacher_id,
            session_type,
            sessions_per_week: 1,
            duration_minutes: 60,
            semester: 1,
            section: "A".into(),
            preferred_room_id: None,
        }
    }

    /// Creates a theory session.
    pub fn theory(course_id: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self::new(course_id, teacher_id, SessionType::Theory)
    }

    /// Creates a lab session.
    pub fn lab(course_id: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self::new(course_id, teacher_id, SessionType::Lab)
    }

    /// Creates a tutorial session.
    pub fn tutorial(course_id: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self::new(course_id, teacher_id, SessionType::Tutorial)
    }

    /// Sets the course name.
    pub fn with_course_name(mut self, name: impl Into<String>) -> Self {
        self.course_name = name.into();
        self
    }

    /// Sets the course code.
    pub fn with_course_code(mut self, code: impl Into<String>) -> Self {
        self.course_code = code.into();
        self
    }

    /// Sets the teacher name.
    pub fn with_teacher_name(mut self, name: impl Into<String>) -> Self {
        self.teacher_name = name.into();
        self
    }

    /// Sets the weekly multiplicity.
    pub fn with_sessions_per_week(mut self, count: u32) -> Self {
        self.sessions_per_week = count;
        self
    }

    /// Sets the occurrence length in minutes.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the student cohort.
    pub fn with_cohort(mut self, semester: u32, section: impl Into<String>) -> Self {
        self.semester = semester;
        self.section = section.into();
        self
    }

    /// Sets the preferred room.
    pub fn with_preferred_room(mut self, room_id: impl Into<String>) -> Self {
        self.preferred_room_id = Some(room_id.into());
        self
    }

    /// Expands this session into one instance per weekly occurrence.
    pub fn expand(&self) -> Vec<SessionInstance<'_>> {
        (1..=self.sessions_per_week)
            .map(|occurrence| SessionInstance {
                session: self,
                occurrence,
            })
            .collect()
    }
}

/// One weekly occurrence of a [`CourseSession`].
#[derive(Debug, Clone, Copy)]
pub struct SessionInstance<'a> {
    /// The recurring session this occurrence belongs to.
    pub session: &'a CourseSession,
    /// Occurrence number within the week (1-based).
    pub occurrence: u32,
}

/// Expands every session into its weekly instances, preserving input order.
pub fn expand_sessions(sessions: &[CourseSession]) -> Vec<SessionInstance<'_>> {
    sessions.iter().flat_map(CourseSession::expand).collect()
}
