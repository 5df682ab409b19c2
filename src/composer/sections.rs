//! Section stage: one overlay panel per planned section

use crate::assets::{AssetId, ICON_HEIGHT};
use crate::color::{BLACK, WHITE};
use crate::draw::{size, Align, DrawCommand, DrawList, ImageSource, Rect};
use crate::ledger::ImageHandle;
use crate::mode::NodeStyle;
use crate::models::{NodeRecord, SectionRecord};
use crate::plan::SectionSlot;

use super::{Stage, PANEL_RADIUS};

/// Placeholder baseline in tall and short panels
const PLACEHOLDER_TALL: i32 = 280;
const PLACEHOLDER_SHORT: i32 = 110;
/// Distance between the two node blocks of a detailed section
const NODE_STRIDE: i32 = 270;
/// Space between the cycle icon and the medal row
const CYCLE_GAP: i32 = 30;
/// Radius of the circle behind a buff icon
pub const BUFF_RADIUS: u32 = 55;
/// Width buff icons are scaled to before drawing
pub const BUFF_ICON_WIDTH: u32 = 110;

/// Pre-rendered bitmaps for one node of a detailed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeArt {
    pub roster: ImageHandle,
    pub buff: Option<ImageHandle>,
}

/// `MMm SSs`
pub fn battle_time(secs: u32) -> String {
    format!("{:02}m {:02}s", secs / 60, secs % 60)
}

/// Append the commands for one section panel.
///
/// `nodes` holds one entry per drawn node of a detailed section and is
/// ignored for placeholders.
pub fn section_commands(
    list: &mut DrawList,
    stage: &Stage<'_>,
    slot: &SectionSlot,
    record: Option<&SectionRecord>,
    nodes: &[NodeArt],
) {
    let theme = stage.theme;
    let (x, y) = (slot.x as i32, slot.y as i32);
    let right = x + slot.panel_width as i32;

    list.fill(
        Rect::new(x, y, slot.panel_width, slot.panel_height),
        theme.overlay,
        PANEL_RADIUS,
    );
    list.text(&slot.title, (x + 20, y + 20), size::NORMAL, Align::TOP_LEFT, theme.text);

    medal_row(list, stage, slot, record.map(|r| r.stars).unwrap_or(0));

    if let Some(record) = record {
        if stage.profile.show_cycles {
            if let Some(cycles) = record.cycles {
                cycle_count(list, stage, slot, cycles);
            }
        }
        if stage.profile.show_rating {
            if let Some(rating) = record.rating {
                let id = AssetId::RatingSmall(rating);
                let width = stage.assets.image(id).map(|i| i.width()).unwrap_or(ICON_HEIGHT) as i32;
                list.blit(ImageSource::Asset(id), right - 20 - width, y + 10);
            }
        }
    }

    if let Some(text) = slot.shape.placeholder() {
        let baseline = if slot.tall { PLACEHOLDER_TALL } else { PLACEHOLDER_SHORT };
        list.text(
            text,
            ((x + right) / 2, y + baseline),
            size::NORMAL,
            Align::CENTER,
            theme.text,
        );
        return;
    }

    let Some(record) = record else {
        return;
    };
    match stage.profile.node_style {
        NodeStyle::Plain => plain_nodes(list, stage, slot, nodes),
        NodeStyle::Scored { buff, boss } => {
            scored_nodes(list, stage, slot, &record.nodes, nodes, buff, boss)
        }
        NodeStyle::Timed => timed_nodes(list, stage, slot, &record.nodes, nodes),
    }
}

/// `min(stars, max)` lit medals, then unlit ones, right-aligned.
fn medal_row(list: &mut DrawList, stage: &Stage<'_>, slot: &SectionSlot, stars: u32) {
    let max = stage.profile.max_medals;
    if max == 0 {
        return;
    }
    let lit = stars.min(max);
    let spacing = stage.profile.medal_spacing as i32;
    let right = (slot.x + slot.panel_width) as i32;
    for i in 0..max {
        let id = if i < lit {
            AssetId::MedalLit
        } else {
            AssetId::MedalUnlit
        };
        let x = right - 20 - (max - i) as i32 * spacing;
        list.blit(ImageSource::Asset(id), x, slot.y as i32 + 5);
    }
}

/// Cycle icon and count, anchored left of the medal row so the title never
/// moves them.
fn cycle_count(list: &mut DrawList, stage: &Stage<'_>, slot: &SectionSlot, cycles: u32) {
    let y = slot.y as i32;
    let icon_width = stage
        .assets
        .image(AssetId::CycleIcon)
        .map(|i| i.width())
        .unwrap_or(ICON_HEIGHT) as i32;
    let icon_x = cycle_anchor(stage, slot) - icon_width;
    list.text(
        cycles.to_string(),
        (icon_x - 5, y + 34),
        size::NORMAL,
        Align::MIDDLE_RIGHT,
        stage.theme.text,
    );
    list.blit(ImageSource::Asset(AssetId::CycleIcon), icon_x, y + 9);
}

/// Right edge of the cycle icon: a fixed gap before the first medal.
fn cycle_anchor(stage: &Stage<'_>, slot: &SectionSlot) -> i32 {
    let right = (slot.x + slot.panel_width) as i32;
    let medals = (stage.profile.max_medals * stage.profile.medal_spacing) as i32;
    right - 20 - medals - CYCLE_GAP
}

fn plain_nodes(list: &mut DrawList, stage: &Stage<'_>, slot: &SectionSlot, nodes: &[NodeArt]) {
    let (x, y) = (slot.x as i32, slot.y as i32);
    let right = x + slot.panel_width as i32;
    for (i, node) in nodes.iter().take(2).enumerate() {
        list.blit(ImageSource::Tracked(node.roster), x + 25, y + 65 + i as i32 * 230);
    }
    list.line((x + 20, y + 280), (right - 20, y + 280), stage.theme.text, 2);
}

/// Header row shared by scored and timed nodes: rule plus "Node N" label.
/// Returns the top of the node block and the label's right edge.
fn node_header(
    list: &mut DrawList,
    stage: &Stage<'_>,
    slot: &SectionSlot,
    index: usize,
) -> (i32, i32) {
    let (x, y) = (slot.x as i32, slot.y as i32);
    let right = x + slot.panel_width as i32;
    let top = y + 65 + index as i32 * NODE_STRIDE;
    let label = format!("Node {}", index + 1);
    let (label_width, _) = stage.typeface().measure(&label, size::NORMAL);

    list.line((x + 20, top), (right - 20, top), stage.theme.text, 2);
    list.text(label, (x + 20, top + 35), size::NORMAL, Align::MIDDLE_LEFT, stage.theme.text);
    (top, x + 20 + label_width as i32)
}

fn scored_nodes(
    list: &mut DrawList,
    stage: &Stage<'_>,
    slot: &SectionSlot,
    records: &[NodeRecord],
    nodes: &[NodeArt],
    buff: bool,
    boss: bool,
) {
    let (x, y) = (slot.x as i32, slot.y as i32);
    let right = x + slot.panel_width as i32;

    let scores: Vec<u32> = records.iter().filter_map(|n| n.score).collect();
    if !scores.is_empty() {
        let total: u32 = scores.iter().sum();
        list.text(
            total.to_string(),
            (right - 190, y + 20),
            size::NORMAL,
            Align::TOP_RIGHT,
            stage.theme.text,
        );
    }

    for (i, (record, art)) in records.iter().zip(nodes).take(2).enumerate() {
        let (top, label_right) = node_header(list, stage, slot, i);

        if boss && record.boss_defeated {
            list.blit(ImageSource::Asset(AssetId::BossCheck), label_right + 20, top + 10);
        }
        if let Some(score) = record.score {
            list.text(
                format!("Score: {}", score),
                (right - 20, top + 35),
                size::NORMAL,
                Align::MIDDLE_RIGHT,
                stage.theme.text,
            );
        }
        list.blit(ImageSource::Tracked(art.roster), x + 55, top + 60);

        if let (true, Some(icon)) = (buff, art.buff) {
            list.push(DrawCommand::Circle {
                center: (right - 120, top + 155),
                radius: BUFF_RADIUS,
                fill: Some(BLACK),
                stroke: Some((WHITE, 2)),
            });
            list.blit(
                ImageSource::Tracked(icon),
                right - 120 - (BUFF_ICON_WIDTH / 2) as i32,
                top + 105,
            );
        }
    }
}

fn timed_nodes(
    list: &mut DrawList,
    stage: &Stage<'_>,
    slot: &SectionSlot,
    records: &[NodeRecord],
    nodes: &[NodeArt],
) {
    let x = slot.x as i32;
    let right = x + slot.panel_width as i32;
    for (i, (record, art)) in records.iter().zip(nodes).take(2).enumerate() {
        let (top, _) = node_header(list, stage, slot, i);
        if let Some(secs) = record.battle_secs {
            list.text(
                battle_time(secs),
                (right - 20, top + 35),
                size::NORMAL,
                Align::MIDDLE_RIGHT,
                stage.theme.text,
            );
        }
        list.blit(ImageSource::Tracked(art.roster), x + 25, top + 60);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;
    use crate::config::Theme;
    use crate::ledger::{ResourceKind, ResourceLedger};
    use crate::mode::GameMode;
    use crate::models::{CycleWindow, EntityRef, Rating, Snapshot};
    use crate::plan::{CanvasPlanner, SectionShape};
    use chrono::NaiveDate;
    use image::RgbaImage;

    fn snapshot(mode: GameMode, sections: Vec<SectionRecord>) -> Snapshot {
        Snapshot {
            mode,
            group_name: "Nameless".to_string(),
            window: CycleWindow {
                start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            },
            total_stars: 0,
            ratings: vec![],
            most_used: vec![],
            sections,
        }
    }

    fn detailed(index: u32) -> SectionRecord {
        let node = NodeRecord {
            roster: vec![EntityRef::new(1, 80, 5, 0)],
            score: Some(20000),
            buff: Some(3),
            boss_defeated: true,
            battle_secs: Some(125),
        };
        SectionRecord {
            index,
            stars: 2,
            cycles: Some(4),
            rating: Some(Rating::A),
            nodes: vec![node.clone(), node],
            ..Default::default()
        }
    }

    fn art(ledger: &mut ResourceLedger) -> Vec<NodeArt> {
        let roster = ledger.track(ResourceKind::Roster, RgbaImage::new(650, 200));
        let buff = ledger.track(ResourceKind::Derived, RgbaImage::new(110, 110));
        vec![NodeArt { roster, buff: Some(buff) }; 2]
    }

    fn build(snap: &Snapshot, number: u32, nodes: &[NodeArt]) -> DrawList {
        let assets = AssetStore::empty();
        let theme = Theme::default();
        let profile = snap.mode.profile();
        let stage = Stage::new(profile, &theme, &assets);
        let plan = CanvasPlanner::new(profile).plan(snap).unwrap();
        let slot = plan.section(number).unwrap();
        let mut list = DrawList::new(plan.width, plan.height);
        section_commands(&mut list, &stage, slot, snap.section(number), nodes);
        list
    }

    fn medals(list: &DrawList) -> (usize, usize) {
        let lit = list
            .blits()
            .filter(|(s, _, _)| *s == ImageSource::Asset(AssetId::MedalLit))
            .count();
        let unlit = list
            .blits()
            .filter(|(s, _, _)| *s == ImageSource::Asset(AssetId::MedalUnlit))
            .count();
        (lit, unlit)
    }

    #[test]
    fn test_battle_time_format() {
        assert_eq!(battle_time(125), "02m 05s");
        assert_eq!(battle_time(0), "00m 00s");
        assert_eq!(battle_time(3599), "59m 59s");
    }

    #[test]
    fn test_absent_section_in_tall_band() {
        let snap = snapshot(
            GameMode::PureFiction,
            vec![detailed(1), detailed(2), detailed(4)],
        );
        let list = build(&snap, 3, &[]);

        let texts: Vec<_> = list.texts().collect();
        assert_eq!(texts, vec!["Nameless (III)", "No Clear Records"]);
        assert_eq!(medals(&list), (0, 3));
        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Fill { rect, .. } if rect.h == 600 && rect.y == 770
        )));
        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, origin, .. }
                if text == "No Clear Records" && origin.1 == 770 + 280
        )));
    }

    #[test]
    fn test_medals_lit_left_to_right() {
        let snap = snapshot(GameMode::MemoryOfChaos, vec![detailed(1)]);
        let mut ledger = ResourceLedger::new();
        let list = build(&snap, 1, &art(&mut ledger));

        assert_eq!(medals(&list), (2, 1));
        let xs: Vec<_> = list
            .blits()
            .filter(|(s, _, _)| {
                matches!(s, ImageSource::Asset(AssetId::MedalLit | AssetId::MedalUnlit))
            })
            .map(|(_, x, _)| x)
            .collect();
        assert_eq!(xs, vec![50 + 700 - 170, 50 + 700 - 120, 50 + 700 - 70]);
    }

    #[test]
    fn test_quick_clear_placeholder_is_short() {
        let quick = SectionRecord {
            index: 1,
            quick: true,
            stars: 3,
            ..Default::default()
        };
        let snap = snapshot(GameMode::MemoryOfChaos, vec![quick]);
        let list = build(&snap, 1, &[]);
        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, origin, .. } if text == "Quick Clear" && origin.1 == 150 + 110
        )));
        assert_eq!(medals(&list), (3, 0));
    }

    #[test]
    fn test_cycle_count_ignores_title_width() {
        let mut snap = snapshot(GameMode::MemoryOfChaos, vec![detailed(1), detailed(2)]);
        snap.group_name = "The Voyage of Navis Astriger, Part Two".to_string();
        let mut ledger = ResourceLedger::new();
        let nodes = art(&mut ledger);

        let short = {
            let mut s = snap.clone();
            s.group_name = "X".to_string();
            build(&s, 2, &nodes)
        };
        let long = build(&snap, 2, &nodes);
        let icon = |list: &DrawList| {
            list.blits()
                .find(|(s, _, _)| *s == ImageSource::Asset(AssetId::CycleIcon))
                .map(|(_, x, y)| (x, y))
        };

        // right column panel spans 800..1500, medals start at 1330
        assert_eq!(icon(&long), Some((1500 - 200 - ICON_HEIGHT as i32, 159)));
        assert_eq!(icon(&long), icon(&short));
        assert!(1500 - 200 < list_medal_x(&long));
    }

    fn list_medal_x(list: &DrawList) -> i32 {
        list.blits()
            .filter(|(s, _, _)| {
                matches!(s, ImageSource::Asset(AssetId::MedalLit | AssetId::MedalUnlit))
            })
            .map(|(_, x, _)| x)
            .min()
            .unwrap()
    }

    #[test]
    fn test_plain_nodes() {
        let snap = snapshot(GameMode::MemoryOfChaos, vec![detailed(2)]);
        let mut ledger = ResourceLedger::new();
        let nodes = art(&mut ledger);
        let list = build(&snap, 2, &nodes);

        let rosters: Vec<_> = list
            .blits()
            .filter(|(s, _, _)| *s == ImageSource::Tracked(nodes[0].roster))
            .map(|(_, x, y)| (x, y))
            .collect();
        assert_eq!(rosters, vec![(825, 215), (825, 445)]);
        assert!(list.texts().any(|t| t == "4"));
        assert!(!list.texts().any(|t| t.starts_with("Score")));
    }

    #[test]
    fn test_scored_nodes_with_buff_and_boss() {
        let snap = snapshot(GameMode::ApocalypticShadow, vec![detailed(1)]);
        let mut ledger = ResourceLedger::new();
        let nodes = art(&mut ledger);
        let list = build(&snap, 1, &nodes);

        let texts: Vec<_> = list.texts().collect();
        assert!(texts.contains(&"40000"));
        assert!(texts.contains(&"Node 1"));
        assert!(texts.contains(&"Node 2"));
        assert_eq!(texts.iter().filter(|t| **t == "Score: 20000").count(), 2);
        // cycle counts are not shown for this mode
        assert!(!texts.contains(&"4"));

        let circles = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { radius: BUFF_RADIUS, .. }))
            .count();
        assert_eq!(circles, 2);
        assert_eq!(
            list.blits()
                .filter(|(s, _, _)| *s == ImageSource::Asset(AssetId::BossCheck))
                .count(),
            2
        );
    }

    #[test]
    fn test_timed_nodes_with_rating() {
        let snap = snapshot(GameMode::ShiyuDefense, vec![detailed(1)]);
        let mut ledger = ResourceLedger::new();
        let list = build(&snap, 1, &art(&mut ledger));

        let texts: Vec<_> = list.texts().collect();
        assert_eq!(texts.iter().filter(|t| **t == "02m 05s").count(), 2);
        assert!(list
            .blits()
            .any(|(s, _, _)| s == ImageSource::Asset(AssetId::RatingSmall(Rating::A))));
        assert_eq!(medals(&list), (0, 0));
    }

    #[test]
    fn test_detailed_without_art_draws_no_rosters() {
        let snap = snapshot(GameMode::ShiyuDefense, vec![detailed(1)]);
        let list = build(&snap, 1, &[]);
        assert!(!list.texts().any(|t| t == "02m 05s"));
        let assets = AssetStore::empty();
        let theme = Theme::default();
        let stage = Stage::new(snap.mode.profile(), &theme, &assets);
        let plan = CanvasPlanner::new(snap.mode.profile()).plan(&snap).unwrap();
        assert_eq!(plan.section(1).unwrap().shape, SectionShape::Detailed);
        assert_eq!(stage.profile.node_style, NodeStyle::Timed);
    }
}
