//! Variable domains.
//!
//! Every session instance is a variable whose values are (slot, room)
//! pairs. Domains are filtered before search:
//!
//! - **Slots**: every slot, minus those overlapping a mandatory lunch break.
//! - **Rooms**: rooms able to host the session kind (when room types are
//!   enforced), with the session's preferred room moved to the front.
//!
//! Candidates are enumerated slot-major: all rooms of the first slot,
//! then all rooms of the second slot, and so on.

use crate::models::{Constraints, CourseSession, HardConstraints, Room, SessionInstance, TimeSlot};

/// Indices of the slots any session may use.
pub fn slot_domain(slots: &[TimeSlot], constraints: &Constraints) -> Vec<usize> {
    let lunch = constraints.blocked_lunch_window();
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| !lunch.is_some_and(|w| slot.overlaps(&w)))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of the rooms a session may use, preferred room first.
pub fn room_domain(session: &CourseSession, rooms: &[Room], hard: &HardConstraints) -> Vec<usize> {
    let mut domain: Vec<usize> = rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| !hard.respect_session_room_type || room.supports(session.session_type))
        .map(|(i, _)| i)
        .collect();

    if let Some(preferred) = &session.preferred_room_id {
        if let Some(pos) = domain.iter().position(|&i| rooms[i].id == *preferred) {
            let room = domain.remove(pos);
            domain.insert(0, room);
        }
    }
    domain
}

/// Filtered domains for an ordered list of instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Domains {
    /// Slot indices shared by every instance.
    pub slots: Vec<usize>,
    /// Room indices per instance, parallel to the instance list.
    pub rooms: Vec<Vec<usize>>,
}

impl Domains {
    /// Builds the domains of every instance.
    pub fn build(
        instances: &[SessionInstance<'_>],
        slots: &[TimeSlot],
        rooms: &[Room],
        constraints: &Constraints,
    ) -> Self {
        Self {
            slots: slot_domain(slots, constraints),
            rooms: instances
                .iter()
                .map(|inst| room_domain(inst.session, rooms, &constraints.hard))
                .collect(),
        }
    }

    /// Number of (slot, room) candidates of instance `i`.
    #[inline]
    pub fn candidate_count(&self, i: usize) -> usize {
        self.slots.len() * self.rooms[i].len()
    }

    /// The `c`-th candidate of instance `i` as (slot index, room index).
    #[inline]
    pub fn candidate(&self, i: usize, c: usize) -> (usize, usize) {
        let rooms = &self.rooms[i];
        (self.slots[c / rooms.len()], rooms[c % rooms.len()])
    }

    /// First instance with no candidate at all.
    pub fn find_empty(&self) -> Option<usize> {
        (0..self.rooms.len()).find(|&i| self.candidate_count(i) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time_slot::hm;
    use crate::models::{expand_sessions, SoftConstraints, TimeWindow};
    use chrono::Weekday;

    fn slots() -> Vec<TimeSlot> {
        TimeSlot::weekly_grid(
            &[Weekday::Mon],
            &[
                TimeWindow::from_hm((11, 0), (12, 0)),
                TimeWindow::from_hm((12, 0), (13, 0)),
                TimeWindow::from_hm((13, 0), (14, 0)),
            ],
        )
    }

    #[test]
    fn test_slot_domain_excludes_lunch() {
        let domain = slot_domain(&slots(), &Constraints::default());
        assert_eq!(domain, vec![0, 2]);

        let relaxed = Constraints::default().with_soft(SoftConstraints::none());
        assert_eq!(slot_domain(&slots(), &relaxed), vec![0, 1, 2]);
    }

    #[test]
    fn test_slot_domain_custom_lunch() {
        let c = Constraints::default().with_lunch_break(TimeWindow::new(hm(12, 30), hm(13, 30)));
        assert_eq!(slot_domain(&slots(), &c), vec![0]);
    }

    #[test]
    fn test_room_domain_filters_labs() {
        let rooms = vec![Room::theory("R1"), Room::lab("L1"), Room::theory("R2")];
        let hard = HardConstraints::default();
        assert_eq!(room_domain(&CourseSession::lab("C", "T"), &rooms, &hard), vec![1]);
        assert_eq!(room_domain(&CourseSession::theory("C", "T"), &rooms, &hard), vec![0, 1, 2]);
        assert_eq!(
            room_domain(&CourseSession::lab("C", "T"), &rooms, &HardConstraints::none()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_preferred_room_first() {
        let rooms = vec![Room::theory("R1"), Room::theory("R2"), Room::lab("L1")];
        let hard = HardConstraints::default();
        let session = CourseSession::theory("C", "T").with_preferred_room("R2");
        assert_eq!(room_domain(&session, &rooms, &hard), vec![1, 0, 2]);

        // An incompatible preference is ignored.
        let lab = CourseSession::lab("C", "T").with_preferred_room("R1");
        assert_eq!(room_domain(&lab, &rooms, &hard), vec![2]);
    }

    #[test]
    fn test_candidates_slot_major() {
        let sessions = vec![CourseSession::theory("C", "T")];
        let instances = expand_sessions(&sessions);
        let rooms = vec![Room::theory("R1"), Room::theory("R2")];
        let relaxed = Constraints::default().with_soft(SoftConstraints::none());
        let domains = Domains::build(&instances, &slots(), &rooms, &relaxed);

        assert_eq!(domains.candidate_count(0), 6);
        assert_eq!(domains.candidate(0, 0), (0, 0));
        assert_eq!(domains.candidate(0, 1), (0, 1));
        assert_eq!(domains.candidate(0, 2), (1, 0));
        assert_eq!(domains.find_empty(), None);
    }

    #[test]
    fn test_find_empty() {
        let sessions = vec![CourseSession::theory("A", "T"), CourseSession::lab("B", "T")];
        let instances = expand_sessions(&sessions);
        let rooms = vec![Room::theory("R1")];
        let domains = Domains::build(&instances, &slots(), &rooms, &Constraints::default());
        assert_eq!(domains.find_empty(), Some(1));
    }
}
