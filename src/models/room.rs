//! Room model.
//!
//! Rooms are the spatial resource of a timetable. A room's type decides
//! which session kinds it can host: lab sessions need a `Lab` or `Both`
//! room, theory and tutorial sessions may use any room.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SessionType;

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    /// Lecture room.
    Theory,
    /// Laboratory.
    Lab,
    /// Equipped for both lectures and labs.
    Both,
}

impl RoomType {
    /// Whether a room of this type can host labs.
    #[inline]
    pub fn supports_labs(self) -> bool {
        matches!(self, Self::Lab | Self::Both)
    }

    /// Whether a room of this type can host the given session kind.
    #[inline]
    pub fn supports(self, session_type: SessionType) -> bool {
        !session_type.is_lab() || self.supports_labs()
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Theory => "theory",
            Self::Lab => "lab",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}

/// A bookable room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
    /// Room classification.
    pub room_type: RoomType,
}

impl Room {
    /// Creates a room; the name defaults to the ID.
    pub fn new(id: impl Into<String>, room_type: RoomType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            capacity: 60,
            room_type,
        }
    }

    /// Creates a lecture room.
    pub fn theory(id: impl Into<String>) -> Self {
        Self::new(id, RoomType::Theory)
    }

    /// Creates a laboratory.
    pub fn lab(id: impl Into<String>) -> Self {
        Self::new(id, RoomType::Lab)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seating capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Whether this room can host the given session kind.
    #[inline]
    pub fn supports(&self, session_type: SessionType) -> bool {
        self.room_type.supports(session_type)
    }
}
