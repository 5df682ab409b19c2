//! Roster slots: up to four chips centred in a fixed 650x200 strip

use crate::assets::AssetStore;
use crate::chip::CHIP_WIDTH;
use crate::draw::{DrawList, ImageSource, Rasterizer};
use crate::error::LayoutViolation;
use crate::ledger::{ImageHandle, ResourceKind, ResourceLedger};

pub const ROSTER_WIDTH: u32 = 650;
pub const ROSTER_HEIGHT: u32 = 200;
pub const CHIP_SPACING: u32 = 10;
pub const MAX_ROSTER: usize = 4;

/// X offset of every chip in a roster of `count` chips.
///
/// ```
/// use statcard::roster::chip_offsets;
///
/// assert_eq!(chip_offsets(4).unwrap(), vec![10, 170, 330, 490]);
/// assert_eq!(chip_offsets(1).unwrap(), vec![235]);
/// ```
pub fn chip_offsets(count: usize) -> Result<Vec<i32>, LayoutViolation> {
    check_count(count)?;
    let offset = ((MAX_ROSTER - count) as u32 * CHIP_WIDTH / 2 + CHIP_SPACING) as i32;
    let stride = (CHIP_WIDTH + CHIP_SPACING) as i32;
    Ok((0..count as i32).map(|i| offset + i * stride).collect())
}

pub fn check_count(count: usize) -> Result<(), LayoutViolation> {
    if count > MAX_ROSTER {
        return Err(LayoutViolation::RosterOverflow {
            count,
            max: MAX_ROSTER,
        });
    }
    Ok(())
}

/// Draw sequence for a roster of already-styled chips.
pub fn roster_commands(chips: &[ImageHandle]) -> Result<DrawList, LayoutViolation> {
    let mut list = DrawList::new(ROSTER_WIDTH, ROSTER_HEIGHT);
    for (chip, x) in chips.iter().zip(chip_offsets(chips.len())?) {
        list.blit(ImageSource::Tracked(*chip), x, 0);
    }
    Ok(list)
}

/// Lays out chips into roster bitmaps tracked in the ledger.
#[derive(Debug, Default)]
pub struct RosterLayoutEngine;

impl RosterLayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render a roster slot. An empty roster is a fully transparent slot.
    pub fn layout(
        &self,
        chips: &[ImageHandle],
        ledger: &mut ResourceLedger,
        assets: &AssetStore,
    ) -> Result<ImageHandle, LayoutViolation> {
        let list = roster_commands(chips)?;
        let image = Rasterizer::new(ledger, assets).render(&list)?;
        Ok(ledger.track(ResourceKind::Roster, image))
    }
}
