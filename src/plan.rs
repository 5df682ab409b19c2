//! Section shapes and canvas geometry
//!
//! The whole canvas is sized before anything is drawn. Two-column modes pair
//! sections into horizontal bands `(1, 2), (3, 4), ...`; single-column modes
//! give every section its own band. A band is short only when no member
//! carries detailed data.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::LayoutViolation;
use crate::mode::ModeProfile;
use crate::models::Snapshot;
use crate::roster::check_count;

/// Height of the optional "Most Used" band.
pub const HIGHLIGHT_BAND: u32 = 300;
/// Most nodes a section draws.
pub const MAX_NODES: usize = 2;

/// How a section is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionShape {
    /// Rosters and per-node details
    Detailed,
    /// Cleared without detail; drawn as a "Quick Clear" placeholder
    Quick,
    /// No record; drawn as a "No Clear Records" placeholder
    Absent,
}

impl SectionShape {
    pub fn is_detailed(&self) -> bool {
        matches!(self, SectionShape::Detailed)
    }

    /// Placeholder text for non-detailed sections.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            SectionShape::Detailed => None,
            SectionShape::Quick => Some("Quick Clear"),
            SectionShape::Absent => Some("No Clear Records"),
        }
    }
}

/// One horizontal band holding a row of sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Band {
    pub y: u32,
    pub height: u32,
    pub tall: bool,
}

/// Where and how one section is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSlot {
    /// 1-based section number
    pub number: u32,
    pub title: String,
    pub shape: SectionShape,
    /// 0 = left, 1 = right
    pub column: u32,
    pub x: u32,
    pub y: u32,
    pub panel_width: u32,
    pub panel_height: u32,
    /// Whether the slot sits in a tall band
    pub tall: bool,
}

/// Panel for the "Most Used" roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSlot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Complete canvas geometry, computed once per render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasPlan {
    pub width: u32,
    pub height: u32,
    pub highlight: Option<HighlightSlot>,
    pub bands: Vec<Band>,
    pub sections: Vec<SectionSlot>,
}

impl CanvasPlan {
    pub fn section(&self, number: u32) -> Option<&SectionSlot> {
        self.sections.iter().find(|s| s.number == number)
    }

    pub fn detailed_count(&self) -> usize {
        self.sections.iter().filter(|s| s.shape.is_detailed()).count()
    }
}

/// Classifies sections and checks the snapshot shape the drawing code relies on.
pub struct SectionShapePlanner<'a> {
    profile: &'a ModeProfile,
}

impl<'a> SectionShapePlanner<'a> {
    pub fn new(profile: &'a ModeProfile) -> Self {
        Self { profile }
    }

    /// Reject snapshots that would break layout: indices outside the mode's
    /// range, duplicates, more than two nodes, or more than four entities in
    /// any roster.
    pub fn validate(&self, snapshot: &Snapshot) -> Result<(), LayoutViolation> {
        check_count(snapshot.most_used.len())?;

        let mut seen = BTreeSet::new();
        for record in &snapshot.sections {
            if record.index == 0 || record.index > self.profile.section_count {
                return Err(LayoutViolation::SectionOutOfRange {
                    index: record.index,
                    count: self.profile.section_count,
                    mode: snapshot.mode,
                });
            }
            if !seen.insert(record.index) {
                return Err(LayoutViolation::DuplicateSection {
                    index: record.index,
                });
            }
            if record.nodes.len() > MAX_NODES {
                return Err(LayoutViolation::TooManyNodes {
                    index: record.index,
                    count: record.nodes.len(),
                });
            }
            for node in &record.nodes {
                check_count(node.roster.len())?;
            }
        }
        Ok(())
    }

    /// Shape of one section number.
    pub fn classify(&self, snapshot: &Snapshot, number: u32) -> SectionShape {
        match snapshot.section(number) {
            None => {
                let later = snapshot.sections.iter().any(|s| s.index > number);
                if self.profile.infer_quick_from_later && later {
                    SectionShape::Quick
                } else {
                    SectionShape::Absent
                }
            }
            Some(record) if record.quick || record.has_empty_rosters() => SectionShape::Quick,
            Some(_) => SectionShape::Detailed,
        }
    }

    /// Shapes of every section `1..=section_count`, in order.
    pub fn shapes(&self, snapshot: &Snapshot) -> Vec<SectionShape> {
        (1..=self.profile.section_count)
            .map(|n| self.classify(snapshot, n))
            .collect()
    }
}

/// Computes the canvas geometry for a snapshot.
pub struct CanvasPlanner<'a> {
    profile: &'a ModeProfile,
}

impl<'a> CanvasPlanner<'a> {
    pub fn new(profile: &'a ModeProfile) -> Self {
        Self { profile }
    }

    pub fn plan(&self, snapshot: &Snapshot) -> Result<CanvasPlan, LayoutViolation> {
        let p = self.profile;
        let shapes = SectionShapePlanner::new(p);
        shapes.validate(snapshot)?;
        let shapes = shapes.shapes(snapshot);

        let highlight = (!snapshot.most_used.is_empty()).then(|| HighlightSlot {
            x: p.margin,
            y: p.band_origin,
            width: p.canvas_width - 2 * p.margin,
            height: HIGHLIGHT_BAND - p.band_gap,
        });
        let highlight_height = highlight.map(|_| HIGHLIGHT_BAND).unwrap_or(0);

        let mut bands = Vec::new();
        let mut sections = Vec::with_capacity(shapes.len());
        let mut y = p.band_origin + highlight_height;

        let columns = p.columns.max(1) as usize;
        for (row_index, row) in shapes.chunks(columns).enumerate() {
            let tall = row.iter().any(|s| s.is_detailed());
            let height = if tall { p.tall_band } else { p.short_band };
            bands.push(Band { y, height, tall });

            for (column, shape) in row.iter().enumerate() {
                let number = (row_index * columns + column + 1) as u32;
                let title = snapshot
                    .section(number)
                    .and_then(|r| r.name.clone())
                    .unwrap_or_else(|| p.section_label.title(&snapshot.group_name, number));
                sections.push(SectionSlot {
                    number,
                    title,
                    shape: *shape,
                    column: column as u32,
                    x: p.column_x(column as u32),
                    y,
                    panel_width: p.panel_width,
                    panel_height: height - p.band_gap,
                    tall,
                });
            }
            y += height;
        }

        let bands_height: u32 = bands.iter().map(|b| b.height).sum();
        let height = p.header_height + highlight_height + bands_height;
        Ok(CanvasPlan {
            width: p.canvas_width,
            height,
            highlight,
            bands,
            sections,
        })
    }
}
