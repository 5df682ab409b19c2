//! Styled entity chips
//!
//! A chip is a 150x180 bitmap: the portrait on a rarity-tinted plate, a level
//! strip along the bottom, a decoration badge in the top-right corner, a
//! rarity border and rounded corners.

use image::{Rgba, RgbaImage};
use std::collections::HashMap;

use crate::assets::{cover, AssetStore};
use crate::color::{BLACK, WHITE};
use crate::config::Theme;
use crate::draw::{size, Align, DrawCommand, DrawList, ImageSource, Rasterizer, Rect};
use crate::error::LayoutViolation;
use crate::ledger::{ImageHandle, ResourceKind, ResourceLedger};
use crate::models::EntityRef;
use crate::resolve::ResolvedEntity;

pub const CHIP_WIDTH: u32 = 150;
pub const CHIP_HEIGHT: u32 = 180;
pub const PORTRAIT_SIZE: u32 = 150;
pub const CORNER_RADIUS: u32 = 15;
/// Decoration count that earns the gold badge
pub const MAX_DECORATION: u8 = 6;

const BADGE_SIZE: u32 = 30;
const BADGE_X: i32 = 115;
const BADGE_Y: i32 = 5;
const BORDER_WIDTH: u32 = 3;

const PURPLE: Rgba<u8> = Rgba([132, 104, 173, 255]);
const GOLD_PLATE: Rgba<u8> = Rgba([183, 125, 76, 255]);
const NEUTRAL: Rgba<u8> = Rgba([96, 96, 96, 255]);
const BADGE_FILL: Rgba<u8> = Rgba([69, 69, 69, 200]);
const BADGE_GOLD: Rgba<u8> = Rgba([255, 215, 0, 255]);
const BADGE_GOLD_TEXT: Rgba<u8> = Rgba([138, 101, 0, 255]);

/// Plate and border colour for a rarity tier.
pub fn rarity_color(rarity: u8) -> Rgba<u8> {
    match rarity {
        5 => GOLD_PLATE,
        4 => PURPLE,
        _ => NEUTRAL,
    }
}

/// Fade the rightmost quarter of an image to transparent.
///
/// For `x >= 0.75w`, alpha is scaled by `(1 - t)^5` with
/// `t = (x - 0.75w) / (w - 0.75w)`.
pub fn fade_right_edge(image: &mut RgbaImage) {
    let width = image.width();
    let start = width * 3 / 4;
    let span = (width - start).max(1) as f32;
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        if x < start {
            continue;
        }
        let t = (x - start) as f32 / span;
        let factor = (1.0 - t).clamp(0.0, 1.0).powi(5);
        pixel[3] = (pixel[3] as f32 * factor).round() as u8;
    }
}

/// Crop/scale a decoded portrait to the chip's portrait square and fade it.
pub fn prepare_portrait(source: &RgbaImage) -> RgbaImage {
    let mut portrait = cover(source, PORTRAIT_SIZE, PORTRAIT_SIZE);
    fade_right_edge(&mut portrait);
    portrait
}

/// Draw sequence for one chip, given the prepared portrait.
pub fn chip_commands(entity: EntityRef, portrait: ImageHandle, theme: &Theme) -> DrawList {
    let plate = rarity_color(entity.rarity);
    let mut list = DrawList::new(CHIP_WIDTH, CHIP_HEIGHT);

    list.clear(plate);
    list.blit(ImageSource::Tracked(portrait), 0, 0);
    list.fill(
        Rect::new(0, PORTRAIT_SIZE as i32, CHIP_WIDTH, CHIP_HEIGHT - PORTRAIT_SIZE),
        theme.accent,
        0,
    );
    list.text(
        format!("Lv. {}", entity.level),
        (10, (PORTRAIT_SIZE + (CHIP_HEIGHT - PORTRAIT_SIZE) / 2) as i32),
        size::CHIP,
        Align::MIDDLE_LEFT,
        BLACK,
    );

    if entity.decoration > 0 {
        let (fill, ink) = if entity.decoration >= MAX_DECORATION {
            (BADGE_GOLD, BADGE_GOLD_TEXT)
        } else {
            (BADGE_FILL, WHITE)
        };
        list.fill(Rect::new(BADGE_X, BADGE_Y, BADGE_SIZE, BADGE_SIZE), fill, 5);
        let half = (BADGE_SIZE / 2) as i32;
        list.text(
            entity.decoration.to_string(),
            (BADGE_X + half, BADGE_Y + half),
            size::BADGE,
            Align::CENTER,
            ink,
        );
    }

    list.stroke(
        Rect::new(0, 0, CHIP_WIDTH, CHIP_HEIGHT),
        plate,
        BORDER_WIDTH,
        CORNER_RADIUS,
    );
    list.push(DrawCommand::RoundCorners {
        radius: CORNER_RADIUS,
    });
    list
}

/// Builds chips, caching them by full entity identity for one render call.
#[derive(Debug)]
pub struct StyledEntityRenderer {
    theme: Theme,
    chips: HashMap<EntityRef, ImageHandle>,
    /// Decoded portrait -> prepared 150x150 portrait
    portraits: HashMap<ImageHandle, ImageHandle>,
}

impl StyledEntityRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            chips: HashMap::new(),
            portraits: HashMap::new(),
        }
    }

    /// Chip for a resolved entity. Equal entities return the same handle;
    /// entities differing only in decoration get distinct chips but share
    /// the prepared portrait.
    pub fn style(
        &mut self,
        resolved: ResolvedEntity,
        ledger: &mut ResourceLedger,
        assets: &AssetStore,
    ) -> Result<ImageHandle, LayoutViolation> {
        if let Some(&chip) = self.chips.get(&resolved.entity) {
            return Ok(chip);
        }

        let portrait = match self.portraits.get(&resolved.portrait) {
            Some(&prepared) => prepared,
            None => {
                let prepared = prepare_portrait(ledger.get(resolved.portrait)?);
                let handle = ledger.track(ResourceKind::Derived, prepared);
                self.portraits.insert(resolved.portrait, handle);
                handle
            }
        };

        let list = chip_commands(resolved.entity, portrait, &self.theme);
        let image = Rasterizer::new(ledger, assets).render(&list)?;
        let chip = ledger.track(ResourceKind::Chip, image);
        self.chips.insert(resolved.entity, chip);
        Ok(chip)
    }

    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portrait(ledger: &mut ResourceLedger) -> ImageHandle {
        ledger.track(
            ResourceKind::Portrait,
            RgbaImage::from_pixel(200, 300, Rgba([20, 140, 220, 255])),
        )
    }

    #[test]
    fn test_fade_profile() {
        let mut img = RgbaImage::from_pixel(100, 1, Rgba([0, 0, 0, 255]));
        fade_right_edge(&mut img);
        assert_eq!(img.get_pixel(74, 0)[3], 255);
        assert_eq!(img.get_pixel(75, 0)[3], 255);
        assert!(img.get_pixel(80, 0)[3] < 255);
        assert!(img.get_pixel(90, 0)[3] < img.get_pixel(80, 0)[3]);
        assert!(img.get_pixel(99, 0)[3] <= 1);
    }

    #[test]
    fn test_chip_commands_order() {
        let mut ledger = ResourceLedger::new();
        let handle = portrait(&mut ledger);
        let list = chip_commands(EntityRef::new(1205, 80, 5, 2), handle, &Theme::default());

        let cmds = list.commands();
        assert_eq!(cmds[0], DrawCommand::Clear(GOLD_PLATE));
        assert!(matches!(cmds[1], DrawCommand::Blit { x: 0, y: 0, .. }));
        assert!(matches!(
            cmds[2],
            DrawCommand::Fill { rect, .. } if rect == Rect::new(0, 150, 150, 30)
        ));
        assert!(matches!(cmds.last(), Some(DrawCommand::RoundCorners { radius: 15 })));
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["Lv. 80", "2"]);
    }

    #[test]
    fn test_no_badge_without_decoration() {
        let mut ledger = ResourceLedger::new();
        let handle = portrait(&mut ledger);
        let list = chip_commands(EntityRef::new(1, 60, 4, 0), handle, &Theme::default());
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["Lv. 60"]);
        assert_eq!(list.commands()[0], DrawCommand::Clear(PURPLE));
    }

    #[test]
    fn test_gold_badge_at_max() {
        let mut ledger = ResourceLedger::new();
        let handle = portrait(&mut ledger);
        let entity = EntityRef::new(1, 80, 5, MAX_DECORATION);
        let list = chip_commands(entity, handle, &Theme::default());
        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Fill { color, radius: 5, .. } if *color == BADGE_GOLD
        )));
    }

    #[test]
    fn test_style_caches_by_full_identity() {
        let mut ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let handle = portrait(&mut ledger);
        let mut renderer = StyledEntityRenderer::new(Theme::default());

        let e2 = ResolvedEntity {
            entity: EntityRef::new(1205, 80, 5, 2),
            portrait: handle,
        };
        let e3 = ResolvedEntity {
            entity: EntityRef::new(1205, 80, 5, 3),
            portrait: handle,
        };

        let a = renderer.style(e2, &mut ledger, &assets).unwrap();
        let b = renderer.style(e3, &mut ledger, &assets).unwrap();
        let again = renderer.style(e2, &mut ledger, &assets).unwrap();

        assert_ne!(a, b);
        assert_eq!(a, again);
        assert_eq!(renderer.chip_count(), 2);
        assert_ne!(ledger.get(a).unwrap(), ledger.get(b).unwrap());
        // portrait + one prepared portrait + two chips
        assert_eq!(ledger.tracked_count(), 4);
        assert_eq!(ledger.get(a).unwrap().dimensions(), (CHIP_WIDTH, CHIP_HEIGHT));
    }

    #[test]
    fn test_chip_corners_are_transparent() {
        let mut ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let handle = portrait(&mut ledger);
        let mut renderer = StyledEntityRenderer::new(Theme::default());
        let chip = renderer
            .style(
                ResolvedEntity {
                    entity: EntityRef::new(7, 1, 4, 0),
                    portrait: handle,
                },
                &mut ledger,
                &assets,
            )
            .unwrap();
        let img = ledger.get(chip).unwrap();
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(75, 90)[3], 255);
    }
}
