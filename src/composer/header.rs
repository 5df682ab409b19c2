//! Header stage: title, cycle window, mode statistic and player profile

use crate::assets::AssetId;
use crate::draw::{size, Align, DrawList, ImageSource, Rect};
use crate::ledger::ImageHandle;
use crate::mode::HeaderStat;
use crate::models::{CycleWindow, ProfileHeader, RatingTally, Rating, Snapshot};
use crate::plan::{CanvasPlan, HighlightSlot};

use super::{Stage, PANEL_RADIUS};

pub const TITLE_ORIGIN: (i32, i32) = (50, 80);
pub const DATE_ORIGIN: (i32, i32) = (50, 120);
/// Gap between the title and the mode statistic
const STAT_GAP: i32 = 30;
/// Horizontal stride between rating tally entries
const TALLY_STRIDE: i32 = 160;

/// `d/m/yyyy - d/m/yyyy`
pub fn date_range(window: &CycleWindow) -> String {
    format!(
        "{} - {}",
        window.start.format("%-d/%-m/%Y"),
        window.end.format("%-d/%-m/%Y")
    )
}

/// Append the header commands. `highlight` is the pre-rendered "Most Used"
/// roster when the plan reserves a highlight band.
pub fn header_commands(
    list: &mut DrawList,
    stage: &Stage<'_>,
    snapshot: &Snapshot,
    profile: &ProfileHeader,
    plan: &CanvasPlan,
    highlight: Option<ImageHandle>,
) {
    let theme = stage.theme;
    let title = stage.profile.title;

    list.text(title, TITLE_ORIGIN, size::TITLE, Align::BOTTOM_LEFT, theme.text);
    list.text(
        date_range(&snapshot.window),
        DATE_ORIGIN,
        size::NORMAL,
        Align::BOTTOM_LEFT,
        theme.text,
    );

    let (title_width, _) = stage.typeface().measure(title, size::TITLE);
    let stat_x = TITLE_ORIGIN.0 + title_width as i32 + STAT_GAP;
    match stage.profile.header_stat {
        HeaderStat::StarTotal => star_total(list, stage, snapshot.total_stars, stat_x),
        HeaderStat::RatingTally => rating_tally(list, stage, &snapshot.ratings, stat_x),
    }

    let right = plan.width as i32 - 50;
    list.text(
        format!(
            "{} • {} {}",
            profile.display_name,
            stage.profile.game.level_prefix(),
            profile.level
        ),
        (right, TITLE_ORIGIN.1),
        size::NORMAL,
        Align::BOTTOM_RIGHT,
        theme.text,
    );
    list.text(
        profile.numeric_id.to_string(),
        (right, DATE_ORIGIN.1),
        size::NORMAL,
        Align::BOTTOM_RIGHT,
        theme.text,
    );

    if let (Some(slot), Some(roster)) = (plan.highlight, highlight) {
        highlight_commands(list, stage, slot, roster);
    }
}

fn star_total(list: &mut DrawList, stage: &Stage<'_>, stars: u32, x: i32) {
    let theme = stage.theme;
    list.line((x, 45), (x, DATE_ORIGIN.1), theme.text, 2);

    let count = stars.to_string();
    let (count_width, _) = stage.typeface().measure(&count, size::TITLE);
    list.text(count, (x + 20, TITLE_ORIGIN.1), size::TITLE, Align::BOTTOM_LEFT, theme.text);
    list.blit(
        ImageSource::Asset(AssetId::MedalLit),
        x + 30 + count_width as i32,
        30,
    );
}

fn rating_tally(list: &mut DrawList, stage: &Stage<'_>, ratings: &[RatingTally], x: i32) {
    for (i, rating) in Rating::ALL.into_iter().enumerate() {
        let times = ratings
            .iter()
            .find(|t| t.rating == rating)
            .map(|t| t.times)
            .unwrap_or(0);
        let icon_x = x + i as i32 * TALLY_STRIDE;
        list.blit(ImageSource::Asset(AssetId::RatingLarge(rating)), icon_x, 30);
        list.text(
            format!("x{}", times),
            (icon_x + 90, 70),
            size::NORMAL,
            Align::MIDDLE_LEFT,
            stage.theme.text,
        );
    }
}

fn highlight_commands(
    list: &mut DrawList,
    stage: &Stage<'_>,
    slot: HighlightSlot,
    roster: ImageHandle,
) {
    let (x, y) = (slot.x as i32, slot.y as i32);
    list.fill(Rect::new(x, y, slot.width, slot.height), stage.theme.overlay, PANEL_RADIUS);
    list.text("Most Used", (x + 20, y + 20), size::NORMAL, Align::TOP_LEFT, stage.theme.text);
    list.blit(ImageSource::Tracked(roster), x + 25, y + 65);
}
