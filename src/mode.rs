//! Per-mode card profiles
//!
//! Every supported game mode renders through the same composer; the
//! differences (section count, band heights, badge vocabulary) live in a
//! [`ModeProfile`] table instead of separate drawing code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported end-game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    MemoryOfChaos,
    PureFiction,
    ApocalypticShadow,
    ShiyuDefense,
    SpiralAbyss,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::MemoryOfChaos,
        GameMode::PureFiction,
        GameMode::ApocalypticShadow,
        GameMode::ShiyuDefense,
        GameMode::SpiralAbyss,
    ];

    /// Parse a mode from its snake_case or display name.
    pub fn from_str(s: &str) -> Option<GameMode> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "memory_of_chaos" | "moc" => Some(GameMode::MemoryOfChaos),
            "pure_fiction" | "pf" => Some(GameMode::PureFiction),
            "apocalyptic_shadow" | "as" => Some(GameMode::ApocalypticShadow),
            "shiyu_defense" | "shiyu" => Some(GameMode::ShiyuDefense),
            "spiral_abyss" | "abyss" => Some(GameMode::SpiralAbyss),
            _ => None,
        }
    }

    /// The layout and badge profile for this mode.
    pub fn profile(&self) -> &'static ModeProfile {
        match self {
            GameMode::MemoryOfChaos => &MEMORY_OF_CHAOS,
            GameMode::PureFiction => &PURE_FICTION,
            GameMode::ApocalypticShadow => &APOCALYPTIC_SHADOW,
            GameMode::ShiyuDefense => &SHIYU_DEFENSE,
            GameMode::SpiralAbyss => &SPIRAL_ABYSS,
        }
    }

    pub fn game(&self) -> Game {
        self.profile().game
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().title)
    }
}

/// Game a mode belongs to; selects portrait keys and the level prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Game {
    StarRail,
    Zenless,
    Genshin,
}

impl Game {
    /// Prefix for the account level in the header.
    pub fn level_prefix(&self) -> &'static str {
        match self {
            Game::StarRail => "TB",
            Game::Zenless => "IK",
            Game::Genshin => "AR",
        }
    }
}

/// What the header shows next to the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStat {
    /// Total stars followed by a lit medal icon
    StarTotal,
    /// S/A/B rating icons with their counts
    RatingTally,
}

/// How a detailed section draws its battle nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    /// Two rosters separated by a rule, no per-node text
    Plain,
    /// "Node N" label, per-node score, optional buff and boss badges
    Scored { buff: bool, boss: bool },
    /// "Node N" label with the battle duration
    Timed,
}

/// Default section title vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLabel {
    /// `"{group} (IV)"`
    Roman,
    /// `"{group}: Difficulty 4"`
    Difficulty,
    /// `"Fourth Frontier"`
    Frontier,
    /// `"Chamber 2"`
    Chamber,
}

impl SectionLabel {
    /// Title for a section without an explicit name.
    pub fn title(&self, group: &str, number: u32) -> String {
        match self {
            SectionLabel::Roman => format!("{} ({})", group, roman_numeral(number)),
            SectionLabel::Difficulty => format!("{}: Difficulty {}", group, number),
            SectionLabel::Frontier => format!("{} Frontier", ordinal_word(number)),
            SectionLabel::Chamber => format!("Chamber {}", number),
        }
    }
}

/// Background plate treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Used as loaded
    Plain,
    /// Brightness halved
    Dimmed,
    /// Brightness halved, then blurred
    DimmedBlurred,
}

/// Static layout and badge configuration for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeProfile {
    pub title: &'static str,
    pub game: Game,
    /// Number of sections the mode always shows
    pub section_count: u32,
    pub canvas_width: u32,
    /// Header height including the bottom margin below the last band
    pub header_height: u32,
    /// Y of the first band
    pub band_origin: u32,
    /// Left margin of the first column
    pub margin: u32,
    /// Sections side by side in one band (1 or 2)
    pub columns: u32,
    pub panel_width: u32,
    pub column_stride: u32,
    pub tall_band: u32,
    pub short_band: u32,
    /// Vertical gap between a panel and the next band
    pub band_gap: u32,
    /// Medal icons per section (0 hides the medal row)
    pub max_medals: u32,
    pub medal_spacing: u32,
    pub header_stat: HeaderStat,
    pub node_style: NodeStyle,
    pub section_label: SectionLabel,
    /// Draw the cycle count next to the section medals
    pub show_cycles: bool,
    /// Draw the section rating badge
    pub show_rating: bool,
    /// A missing record followed by any later record counts as a quick clear
    pub infer_quick_from_later: bool,
    /// Treatment applied to the background plate at load time
    pub backdrop: Backdrop,
}

impl ModeProfile {
    pub fn tall_panel(&self) -> u32 {
        self.tall_band - self.band_gap
    }

    pub fn short_panel(&self) -> u32 {
        self.short_band - self.band_gap
    }

    /// X of the panel in the given column (`0..columns`).
    pub fn column_x(&self, column: u32) -> u32 {
        self.margin + column * self.column_stride
    }
}

pub static MEMORY_OF_CHAOS: ModeProfile = ModeProfile {
    title: "Memory of Chaos",
    game: Game::StarRail,
    section_count: 12,
    canvas_width: 1550,
    header_height: 180,
    band_origin: 150,
    margin: 50,
    columns: 2,
    panel_width: 700,
    column_stride: 750,
    tall_band: 520,
    short_band: 200,
    band_gap: 20,
    max_medals: 3,
    medal_spacing: 50,
    header_stat: HeaderStat::StarTotal,
    node_style: NodeStyle::Plain,
    section_label: SectionLabel::Roman,
    show_cycles: true,
    show_rating: false,
    infer_quick_from_later: false,
    backdrop: Backdrop::DimmedBlurred,
};

pub static PURE_FICTION: ModeProfile = ModeProfile {
    title: "Pure Fiction",
    game: Game::StarRail,
    section_count: 4,
    canvas_width: 1950,
    header_height: 180,
    band_origin: 150,
    margin: 50,
    columns: 2,
    panel_width: 900,
    column_stride: 950,
    tall_band: 620,
    short_band: 200,
    band_gap: 20,
    max_medals: 3,
    medal_spacing: 50,
    header_stat: HeaderStat::StarTotal,
    node_style: NodeStyle::Scored {
        buff: true,
        boss: false,
    },
    section_label: SectionLabel::Roman,
    show_cycles: true,
    show_rating: false,
    infer_quick_from_later: false,
    backdrop: Backdrop::Dimmed,
};

pub static APOCALYPTIC_SHADOW: ModeProfile = ModeProfile {
    title: "Apocalyptic Shadow",
    game: Game::StarRail,
    section_count: 4,
    canvas_width: 1950,
    header_height: 180,
    band_origin: 150,
    margin: 50,
    columns: 2,
    panel_width: 900,
    column_stride: 950,
    tall_band: 620,
    short_band: 200,
    band_gap: 20,
    max_medals: 3,
    medal_spacing: 50,
    header_stat: HeaderStat::StarTotal,
    node_style: NodeStyle::Scored {
        buff: true,
        boss: true,
    },
    section_label: SectionLabel::Difficulty,
    show_cycles: false,
    show_rating: false,
    infer_quick_from_later: false,
    backdrop: Backdrop::Dimmed,
};

pub static SHIYU_DEFENSE: ModeProfile = ModeProfile {
    title: "Shiyu Defense",
    game: Game::Zenless,
    section_count: 6,
    canvas_width: 1550,
    header_height: 180,
    band_origin: 150,
    margin: 50,
    columns: 2,
    panel_width: 700,
    column_stride: 750,
    tall_band: 620,
    short_band: 200,
    band_gap: 20,
    max_medals: 0,
    medal_spacing: 50,
    header_stat: HeaderStat::RatingTally,
    node_style: NodeStyle::Timed,
    section_label: SectionLabel::Frontier,
    show_cycles: false,
    show_rating: true,
    infer_quick_from_later: true,
    backdrop: Backdrop::Plain,
};

pub static SPIRAL_ABYSS: ModeProfile = ModeProfile {
    title: "Spiral Abyss",
    game: Game::Genshin,
    section_count: 3,
    canvas_width: 1050,
    header_height: 180,
    band_origin: 150,
    margin: 50,
    columns: 1,
    panel_width: 950,
    column_stride: 950,
    tall_band: 520,
    short_band: 200,
    band_gap: 20,
    max_medals: 3,
    medal_spacing: 50,
    header_stat: HeaderStat::StarTotal,
    node_style: NodeStyle::Plain,
    section_label: SectionLabel::Chamber,
    show_cycles: false,
    show_rating: false,
    infer_quick_from_later: false,
    backdrop: Backdrop::Dimmed,
};

/// Roman numeral for small positive numbers (0 renders as an empty string).
pub fn roman_numeral(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

fn ordinal_word(n: u32) -> String {
    const WORDS: [&str; 10] = [
        "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth", "Ninth",
        "Tenth",
    ];
    match n.checked_sub(1).and_then(|i| WORDS.get(i as usize)) {
        Some(word) => word.to_string(),
        None => format!("#{}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_numerals() {
        assert_eq!(roman_numeral(1), "I");
        assert_eq!(roman_numeral(4), "IV");
        assert_eq!(roman_numeral(9), "IX");
        assert_eq!(roman_numeral(12), "XII");
        assert_eq!(roman_numeral(0), "");
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(SectionLabel::Roman.title("Forgotten Hall", 3), "Forgotten Hall (III)");
        assert_eq!(SectionLabel::Difficulty.title("Duel", 4), "Duel: Difficulty 4");
        assert_eq!(SectionLabel::Frontier.title("ignored", 2), "Second Frontier");
        assert_eq!(SectionLabel::Frontier.title("ignored", 11), "#11 Frontier");
        assert_eq!(SectionLabel::Chamber.title("Floor 12", 3), "Chamber 3");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(GameMode::from_str("moc"), Some(GameMode::MemoryOfChaos));
        assert_eq!(GameMode::from_str("Pure Fiction"), Some(GameMode::PureFiction));
        assert_eq!(GameMode::from_str("apocalyptic-shadow"), Some(GameMode::ApocalypticShadow));
        assert_eq!(GameMode::from_str("shiyu"), Some(GameMode::ShiyuDefense));
        assert_eq!(GameMode::from_str("abyss"), Some(GameMode::SpiralAbyss));
        assert_eq!(GameMode::from_str("theater"), None);
    }

    #[test]
    fn test_profiles_fit_their_canvas() {
        for mode in GameMode::ALL {
            let p = mode.profile();
            let right = p.column_x(p.columns - 1) + p.panel_width;
            assert_eq!(right + p.margin, p.canvas_width, "{mode} columns do not fill the canvas");
            assert!(p.tall_panel() > p.short_panel());
        }
    }

    #[test]
    fn test_abyss_is_single_column_genshin() {
        let p = GameMode::SpiralAbyss.profile();
        assert_eq!(p.columns, 1);
        assert_eq!(p.game, Game::Genshin);
        assert_eq!(p.game.level_prefix(), "AR");
        assert_eq!(p.section_count, 3);
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&GameMode::ApocalypticShadow).unwrap();
        assert_eq!(json, "\"apocalyptic_shadow\"");
    }
}
