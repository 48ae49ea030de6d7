//! Academic timetable generation.
//!
//! Assigns weekly course sessions to rooms and time slots so that no
//! teacher, room, or student cohort is double-booked and every lab sits in
//! a lab-capable room, while minimizing soft-constraint penalties.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `CourseSession`, `Room`,
//!   `Constraints`, `Assignment`, `Timetable`
//! - **`dispatching`**: Rule-based session ordering (most-constrained-first)
//! - **`cp`**: Backtracking constraint solver with domain filtering
//! - **`ga`**: Genetic optimizers, baseline and repair-enhanced
//! - **`scheduler`**: Integrated generator, result envelope, soft-constraint KPIs
//! - **`validation`**: Input checks and the standalone solution validator
//! - **`error`**: Generation error types
//!
//! # Quick start
//!
//! ```
//! use chrono::Weekday;
//! use u_timetable::models::{Constraints, CourseSession, Room, TimeSlot, TimeWindow};
//! use u_timetable::scheduler::{GenerationConfig, TimetableGenerator};
//!
//! let slots = TimeSlot::weekly_grid(
//!     &[Weekday::Mon, Weekday::Wed],
//!     &[TimeWindow::from_hm((9, 0), (10, 0)), TimeWindow::from_hm((10, 0), (11, 0))],
//! );
//! let sessions = vec![CourseSession::theory("Algebra", "T1").with_sessions_per_week(2)];
//! let rooms = vec![Room::theory("R1")];
//! let constraints = Constraints::default();
//!
//! let result = TimetableGenerator::new(&slots, &sessions, &rooms, &constraints)
//!     .generate(&GenerationConfig::default().with_seed(42));
//! assert!(result.success);
//! assert_eq!(result.assignments.len(), 2);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", ch. 6

pub mod cp;
pub mod dispatching;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;
