//! Configuration schema types for `statcard.toml`
//!
//! Every section is optional; an empty file yields the defaults used by the
//! bundled asset cache.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::{parse_color, ColorError};
use crate::mode::{Game, GameMode};
use crate::output::ArtifactFormat;

/// Repository keys for every static asset and the per-entity key formats.
///
/// Key formats use `{id}` as the placeholder for the numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub moc_background: String,
    pub pf_background: String,
    pub as_background: String,
    pub shiyu_background: String,
    pub abyss_background: String,
    /// Lit medal; the unlit variant is derived from it
    pub medal: String,
    pub cycle_icon: String,
    pub boss_check: String,
    pub rating_s: String,
    pub rating_a: String,
    pub rating_b: String,
    /// Optional TrueType font; the built-in pixel font is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    pub star_rail_portrait: String,
    pub zenless_portrait: String,
    pub genshin_portrait: String,
    pub buff_icon: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            moc_background: "hsr_moc_bg".to_string(),
            pf_background: "hsr_pf_bg".to_string(),
            as_background: "hsr_as_bg".to_string(),
            shiyu_background: "zzz_shiyu_bg".to_string(),
            abyss_background: "genshin_abyss_bg".to_string(),
            medal: "hsr_moc_star".to_string(),
            cycle_icon: "hsr_hourglass".to_string(),
            boss_check: "hsr_boss_check".to_string(),
            rating_s: "zzz_rating_s".to_string(),
            rating_a: "zzz_rating_a".to_string(),
            rating_b: "zzz_rating_b".to_string(),
            font: None,
            star_rail_portrait: "hsr_avatar_{id}".to_string(),
            zenless_portrait: "zzz_avatar_{id}".to_string(),
            genshin_portrait: "genshin_avatar_{id}".to_string(),
            buff_icon: "hsr_buff_{id}".to_string(),
        }
    }
}

impl AssetManifest {
    /// Background key for a mode.
    pub fn background(&self, mode: GameMode) -> &str {
        match mode {
            GameMode::MemoryOfChaos => &self.moc_background,
            GameMode::PureFiction => &self.pf_background,
            GameMode::ApocalypticShadow => &self.as_background,
            GameMode::ShiyuDefense => &self.shiyu_background,
            GameMode::SpiralAbyss => &self.abyss_background,
        }
    }

    /// Repository key of an entity portrait.
    ///
    /// ```
    /// use statcard::config::AssetManifest;
    /// use statcard::mode::Game;
    ///
    /// let manifest = AssetManifest::default();
    /// assert_eq!(manifest.portrait_key(Game::StarRail, 1205), "hsr_avatar_1205");
    /// ```
    pub fn portrait_key(&self, game: Game, id: u32) -> String {
        let format = match game {
            Game::StarRail => &self.star_rail_portrait,
            Game::Zenless => &self.zenless_portrait,
            Game::Genshin => &self.genshin_portrait,
        };
        format.replace("{id}", &id.to_string())
    }

    pub fn buff_key(&self, id: u32) -> String {
        self.buff_icon.replace("{id}", &id.to_string())
    }

    fn named_keys(&self) -> [(&'static str, &str); 11] {
        [
            ("moc_background", &self.moc_background),
            ("pf_background", &self.pf_background),
            ("as_background", &self.as_background),
            ("shiyu_background", &self.shiyu_background),
            ("abyss_background", &self.abyss_background),
            ("medal", &self.medal),
            ("cycle_icon", &self.cycle_icon),
            ("boss_check", &self.boss_check),
            ("rating_s", &self.rating_s),
            ("rating_a", &self.rating_a),
            ("rating_b", &self.rating_b),
        ]
    }
}

/// Output encoding settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub format: ArtifactFormat,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            format: ArtifactFormat::Jpeg,
            quality: 90,
        }
    }
}

/// Theme colours as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Panel overlay behind each section
    pub overlay: String,
    pub text: String,
    /// Chip level strip
    pub accent: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            overlay: "#00000080".to_string(),
            text: "#FFFFFF".to_string(),
            accent: "#FFDAB9".to_string(),
        }
    }
}

impl ThemeConfig {
    pub fn resolve(&self) -> Result<Theme, ColorError> {
        Ok(Theme {
            overlay: parse_color(&self.overlay)?,
            text: parse_color(&self.text)?,
            accent: parse_color(&self.accent)?,
        })
    }
}

/// Parsed theme colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub overlay: Rgba<u8>,
    pub text: Rgba<u8>,
    pub accent: Rgba<u8>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            overlay: Rgba([0, 0, 0, 128]),
            text: Rgba([255, 255, 255, 255]),
            accent: Rgba([255, 218, 185, 255]),
        }
    }
}

/// Complete statcard.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub assets: AssetManifest,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "encoding.quality")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "statcard.toml: '{}' {}", self.field, self.message)
    }
}

impl CardConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if !(1..=100).contains(&self.encoding.quality) {
            errors.push(ConfigValidationError {
                field: "encoding.quality".to_string(),
                message: format!("must be between 1 and 100, got {}", self.encoding.quality),
            });
        }

        for (field, value) in [
            ("theme.overlay", &self.theme.overlay),
            ("theme.text", &self.theme.text),
            ("theme.accent", &self.theme.accent),
        ] {
            if let Err(e) = parse_color(value) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: e.to_string(),
                });
            }
        }

        for (name, key) in self.assets.named_keys() {
            if key.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("assets.{}", name),
                    message: "must be a non-empty key".to_string(),
                });
            }
        }

        for (name, format) in [
            ("star_rail_portrait", &self.assets.star_rail_portrait),
            ("zenless_portrait", &self.assets.zenless_portrait),
            ("genshin_portrait", &self.assets.genshin_portrait),
            ("buff_icon", &self.assets.buff_icon),
        ] {
            if !format.contains("{id}") {
                errors.push(ConfigValidationError {
                    field: format!("assets.{}", name),
                    message: "must contain the {id} placeholder".to_string(),
                });
            }
        }

        errors
    }
}
