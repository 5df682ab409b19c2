//! Colour parsing and the card palette
//!
//! Theme colours in `statcard.toml` are written as hex strings:
//! `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`, plus a handful of names.

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input is neither a known name nor starts with '#'
    #[error("color must start with '#' or be a known name, got '{0}'")]
    Unknown(String),
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
/// Panel overlay behind every section
pub const OVERLAY: Rgba<u8> = Rgba([0, 0, 0, 128]);
/// Muted text, e.g. the "x" in a rating tally
pub const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Parse a colour string into RGBA.
///
/// # Examples
///
/// ```
/// use statcard::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("#00000080").unwrap(), image::Rgba([0, 0, 0, 128]));
/// assert_eq!(parse_color("white").unwrap(), image::Rgba([255, 255, 255, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    match s.strip_prefix('#') {
        Some(hex) => parse_hex_color(hex),
        None => named_color(s).ok_or_else(|| ColorError::Unknown(s.to_string())),
    }
}

fn named_color(name: &str) -> Option<Rgba<u8>> {
    match name.to_ascii_lowercase().as_str() {
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "transparent" => Some(TRANSPARENT),
        "gray" | "grey" => Some(GRAY),
        "gold" => Some(Rgba([255, 215, 0, 255])),
        "peachpuff" => Some(Rgba([255, 218, 185, 255])),
        _ => None,
    }
}

/// Parse the digits after '#'
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    let digits = hex
        .chars()
        .map(parse_hex_digit)
        .collect::<Result<Vec<u8>, ColorError>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits), alpha = 255
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        // #RGBA -> #RRGGBBAA (doubled digits)
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255])),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Rgba([
            r1 * 16 + r0,
            g1 * 16 + g0,
            b1 * 16 + b0,
            a1 * 16 + a0,
        ])),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Format a colour as `#RRGGBBAA`.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
}
