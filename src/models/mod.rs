//! Timetabling domain models.
//!
//! Pure data types describing a weekly academic timetabling problem
//! and its solutions. Entities are created fresh per generation run
//! and carry no identity across runs.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling | Role |
//! |-------------|--------------------|------|
//! | CourseSession | Task | Recurring teaching need |
//! | SessionInstance | Activity | One weekly occurrence |
//! | Room | Resource | Where it happens |
//! | TimeSlot | Time bucket | When it happens |
//! | Timetable | Schedule | Solution |

mod constraint;
mod room;
mod schedule;
mod session;
pub(crate) mod time_slot;

pub use constraint::{Constraints, HardConstraints, SoftConstraint, SoftConstraints};
pub use room::{Room, RoomType};
pub use schedule::{Assignment, Timetable, Violation, ViolationType};
pub use session::{expand_sessions, CourseSession, SessionInstance, SessionType};
pub use time_slot::{TimeSlot, TimeWindow};
