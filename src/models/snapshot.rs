//! Statistics snapshot handed over by the statistics source
//!
//! The snapshot is already validated upstream; the renderer only checks the
//! shape constraints it depends on (see [`crate::plan`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityRef;
use crate::mode::GameMode;

/// One end-game cycle worth of statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: GameMode,
    /// Schedule name, used for default section titles
    pub group_name: String,
    pub window: CycleWindow,
    /// Total medals/stars earned across every section
    #[serde(default)]
    pub total_stars: u32,
    /// Per-rating clear counts (rating-based modes only)
    #[serde(default)]
    pub ratings: Vec<RatingTally>,
    /// Ranked "most used" entities, drawn as a highlight roster
    #[serde(default)]
    pub most_used: Vec<EntityRef>,
    /// Clear records keyed by their 1-based index
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

impl Snapshot {
    /// Find the record for a 1-based section number.
    pub fn section(&self, number: u32) -> Option<&SectionRecord> {
        self.sections.iter().find(|s| s.index == number)
    }
}

/// Date range the snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Clear rating grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    S,
    A,
    B,
}

impl Rating {
    /// Ratings in the order they are drawn in a tally.
    pub const ALL: [Rating; 3] = [Rating::S, Rating::A, Rating::B];
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::S => write!(f, "S"),
            Rating::A => write!(f, "A"),
            Rating::B => write!(f, "B"),
        }
    }
}

/// How many times a rating was achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    pub rating: Rating,
    pub times: u32,
}

/// One stage/floor/frontier clear record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// 1-based section number
    pub index: u32,
    /// Display name; a mode-specific default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Medals achieved
    #[serde(default)]
    pub stars: u32,
    /// Cleared through the fast/trivial path
    #[serde(default)]
    pub quick: bool,
    /// Cycles/rounds used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// Battle nodes (at most two are drawn)
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl SectionRecord {
    /// True when no node carries a populated roster.
    pub fn has_empty_rosters(&self) -> bool {
        self.nodes.iter().all(|n| n.roster.is_empty())
    }
}

/// One battle node within a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub roster: Vec<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// Buff icon id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buff: Option<u32>,
    #[serde(default)]
    pub boss_defeated: bool,
    /// Battle duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_secs: Option<u32>,
}
