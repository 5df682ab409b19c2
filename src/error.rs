//! Error types for card composition
//!
//! Three failure kinds can occur while rendering a card. All of them reach
//! the caller wrapped in a single [`CompositionError`].

use thiserror::Error;

use crate::assets::RepositoryError;
use crate::mode::GameMode;

/// An entity portrait or static asset could not be fetched or decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// The repository failed to produce bytes for a key
    #[error("failed to fetch '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: RepositoryError,
    },
    /// Bytes were fetched but are not a decodable image
    #[error("failed to decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },
    /// Font bytes could not be parsed
    #[error("failed to parse font '{key}'")]
    Font { key: String },
    /// The cancel signal fired before drawing started
    #[error("resolution cancelled before drawing started")]
    Cancelled,
    /// `render` was called before `load`
    #[error("static assets have not been loaded")]
    AssetsNotLoaded,
    /// The blocking decode task panicked or was aborted
    #[error("decode task failed: {0}")]
    DecodeTask(#[from] tokio::task::JoinError),
}

/// A roster, section or draw call received an out-of-contract shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LayoutViolation {
    #[error("roster has {count} entities, at most {max} fit in a slot")]
    RosterOverflow { count: usize, max: usize },
    #[error("section {index} is outside 1..={count} for {mode}")]
    SectionOutOfRange {
        index: u32,
        count: u32,
        mode: GameMode,
    },
    #[error("section {index} appears more than once")]
    DuplicateSection { index: u32 },
    #[error("section {index} has {count} nodes, at most 2 are drawn")]
    TooManyNodes { index: u32, count: usize },
    #[error("image handle {0} is not tracked or was already released")]
    UnknownHandle(usize),
    #[error("{what} at ({x}, {y}) sized {w}x{h} falls outside the {width}x{height} canvas")]
    OutOfBounds {
        what: &'static str,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },
    #[error("no resolved portrait for entity {0}")]
    MissingEntity(u32),
    #[error("no resolved icon for buff {0}")]
    MissingIcon(u32),
    #[error("static asset {0} is not loaded")]
    MissingAsset(String),
}

/// The finished canvas could not be serialized.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("encoder produced no bytes")]
    Empty,
}

/// Any failure inside one composition.
#[derive(Debug, Error)]
pub enum CardError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Layout(#[from] LayoutViolation),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl CardError {
    /// Short name of the failure kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CardError::Resolution(_) => "resolution",
            CardError::Layout(_) => "layout",
            CardError::Encoding(_) => "encoding",
        }
    }
}

/// Composition failure surfaced to the caller.
///
/// Carries the caller's correlation id and the serialized snapshot so the
/// failing input can be reproduced.
#[derive(Debug, Error)]
#[error("failed to generate {mode} card for '{correlation_id}': {cause}")]
pub struct CompositionError {
    pub correlation_id: String,
    pub mode: GameMode,
    /// JSON form of the snapshot that failed
    pub snapshot: String,
    #[source]
    pub cause: CardError,
}

impl CompositionError {
    pub fn cause(&self) -> &CardError {
        &self.cause
    }
}
