//! Draw-command model
//!
//! Every visual stage (chip, roster, header, sections) emits a [`DrawList`]
//! instead of touching pixels. The list is inspected in tests and executed by
//! the [`Rasterizer`] into a bitmap.

pub mod blend;
mod glyphs;
pub mod raster;
pub mod shapes;
pub mod text;

pub use raster::Rasterizer;
pub use text::Typeface;

use image::Rgba;

use crate::assets::AssetId;
use crate::ledger::ImageHandle;

/// Text sizes used across the card.
pub mod size {
    pub const TITLE: u32 = 40;
    pub const NORMAL: u32 = 28;
    pub const CHIP: u32 = 24;
    pub const BADGE: u32 = 18;
}

/// Axis-aligned rectangle in target pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Where a text origin sits relative to the measured text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Align {
    pub h: HAlign,
    pub v: VAlign,
}

impl Align {
    pub const TOP_LEFT: Align = Align::new(HAlign::Left, VAlign::Top);
    pub const BOTTOM_LEFT: Align = Align::new(HAlign::Left, VAlign::Bottom);
    pub const BOTTOM_RIGHT: Align = Align::new(HAlign::Right, VAlign::Bottom);
    pub const TOP_RIGHT: Align = Align::new(HAlign::Right, VAlign::Top);
    pub const CENTER: Align = Align::new(HAlign::Center, VAlign::Middle);
    pub const MIDDLE_LEFT: Align = Align::new(HAlign::Left, VAlign::Middle);
    pub const MIDDLE_RIGHT: Align = Align::new(HAlign::Right, VAlign::Middle);

    pub const fn new(h: HAlign, v: VAlign) -> Self {
        Self { h, v }
    }
}

/// Bitmap a blit reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// A call-local bitmap owned by the ledger
    Tracked(ImageHandle),
    /// A static asset from the loaded store
    Asset(AssetId),
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Overwrite every pixel with a colour
    Clear(Rgba<u8>),
    Fill {
        rect: Rect,
        color: Rgba<u8>,
        radius: u32,
    },
    Stroke {
        rect: Rect,
        color: Rgba<u8>,
        width: u32,
        radius: u32,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        color: Rgba<u8>,
        width: u32,
    },
    Circle {
        center: (i32, i32),
        radius: u32,
        fill: Option<Rgba<u8>>,
        stroke: Option<(Rgba<u8>, u32)>,
    },
    /// Source-over copy of a bitmap with its top-left corner at (x, y)
    Blit { source: ImageSource, x: i32, y: i32 },
    Text {
        text: String,
        origin: (i32, i32),
        size: u32,
        align: Align,
        color: Rgba<u8>,
    },
    /// Make the target's corners transparent
    RoundCorners { radius: u32 },
}

/// Ordered drawing instructions for one target bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Append every command of another list (which must target the same size).
    pub fn extend(&mut self, other: DrawList) {
        self.commands.extend(other.commands);
    }

    pub fn clear(&mut self, color: Rgba<u8>) {
        self.push(DrawCommand::Clear(color));
    }

    pub fn fill(&mut self, rect: Rect, color: Rgba<u8>, radius: u32) {
        self.push(DrawCommand::Fill {
            rect,
            color,
            radius,
        });
    }

    pub fn stroke(&mut self, rect: Rect, color: Rgba<u8>, width: u32, radius: u32) {
        self.push(DrawCommand::Stroke {
            rect,
            color,
            width,
            radius,
        });
    }

    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgba<u8>, width: u32) {
        self.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    pub fn blit(&mut self, source: ImageSource, x: i32, y: i32) {
        self.push(DrawCommand::Blit { source, x, y });
    }

    pub fn text(
        &mut self,
        text: impl Into<String>,
        origin: (i32, i32),
        size: u32,
        align: Align,
        color: Rgba<u8>,
    ) {
        self.push(DrawCommand::Text {
            text: text.into(),
            origin,
            size,
            align,
            color,
        });
    }

    /// Every text string in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every blit in draw order as `(source, x, y)`.
    pub fn blits(&self) -> impl Iterator<Item = (ImageSource, i32, i32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Blit { source, x, y } => Some((*source, *x, *y)),
            _ => None,
        })
    }
}
