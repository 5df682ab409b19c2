//! Entity references and the profile header

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to one in-game entity as it appears in a snapshot.
///
/// Equality covers every field, so the same portrait at a different level,
/// rarity or decoration count is a different chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    /// Numeric entity id; also selects the portrait asset
    pub id: u32,
    /// Character level shown on the chip label
    pub level: u32,
    /// Rarity tier (4 and 5 are styled, anything else is neutral)
    pub rarity: u8,
    /// Rank, constellation or awaken count
    #[serde(default)]
    pub decoration: u8,
}

impl EntityRef {
    pub fn new(id: u32, level: u32, rarity: u8, decoration: u8) -> Self {
        Self {
            id,
            level,
            rarity,
            decoration,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} (Lv. {}, {}*, +{})",
            self.id, self.level, self.rarity, self.decoration
        )
    }
}

/// Player profile drawn in the card header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileHeader {
    pub display_name: String,
    pub numeric_id: u64,
    pub level: u32,
}
