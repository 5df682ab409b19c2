//! Per-call ownership of every intermediate bitmap
//!
//! A [`ResourceLedger`] is created at the start of one `render` call. Every
//! decoded portrait, derived icon, chip, roster and the final canvas is
//! tracked in it and handed out by [`ImageHandle`]. `release_all` frees all
//! of them exactly once; dropping the ledger releases whatever is left, so an
//! early return cannot leak.

use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

use crate::error::LayoutViolation;

/// Opaque reference to a bitmap tracked in a [`ResourceLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(usize);

impl ImageHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a tracked bitmap is, for diagnostics and observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Decoded entity portrait
    Portrait,
    /// Decoded buff/badge icon
    Icon,
    /// Resized or filtered copy of another bitmap
    Derived,
    /// Styled entity chip
    Chip,
    /// Laid-out roster slot
    Roster,
    /// The card canvas
    Canvas,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Portrait => "portrait",
            ResourceKind::Icon => "icon",
            ResourceKind::Derived => "derived",
            ResourceKind::Chip => "chip",
            ResourceKind::Roster => "roster",
            ResourceKind::Canvas => "canvas",
        };
        f.write_str(name)
    }
}

/// Receives a callback for every track and release.
pub trait LedgerObserver: Send + Sync {
    fn tracked(&self, kind: ResourceKind);
    fn released(&self, kind: ResourceKind);
}

struct Tracked {
    kind: ResourceKind,
    image: RgbaImage,
}

/// Arena of call-local bitmaps with a single release step.
#[derive(Default)]
pub struct ResourceLedger {
    entries: Vec<Option<Tracked>>,
    observer: Option<Arc<dyn LedgerObserver>>,
    released: usize,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that reports to an observer.
    pub fn with_observer(observer: Arc<dyn LedgerObserver>) -> Self {
        Self {
            entries: Vec::new(),
            observer: Some(observer),
            released: 0,
        }
    }

    /// Take ownership of a bitmap until the ledger is released.
    pub fn track(&mut self, kind: ResourceKind, image: RgbaImage) -> ImageHandle {
        let handle = ImageHandle(self.entries.len());
        self.entries.push(Some(Tracked { kind, image }));
        if let Some(observer) = &self.observer {
            observer.tracked(kind);
        }
        handle
    }

    /// Borrow a tracked bitmap.
    pub fn get(&self, handle: ImageHandle) -> Result<&RgbaImage, LayoutViolation> {
        self.entries
            .get(handle.0)
            .and_then(|e| e.as_ref())
            .map(|t| &t.image)
            .ok_or(LayoutViolation::UnknownHandle(handle.0))
    }

    /// Kind of a live tracked bitmap.
    pub fn kind(&self, handle: ImageHandle) -> Option<ResourceKind> {
        self.entries.get(handle.0).and_then(|e| e.as_ref()).map(|t| t.kind)
    }

    /// Number of bitmaps tracked over the ledger's lifetime.
    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of bitmaps still held.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Number of bitmaps released so far.
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Release every live bitmap. Returns how many were released by this call;
    /// a second call releases nothing.
    pub fn release_all(&mut self) -> usize {
        let mut count = 0;
        for entry in self.entries.iter_mut() {
            if let Some(tracked) = entry.take() {
                if let Some(observer) = &self.observer {
                    observer.released(tracked.kind);
                }
                drop(tracked.image);
                count += 1;
            }
        }
        self.released += count;
        count
    }
}

impl Drop for ResourceLedger {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for ResourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLedger")
            .field("tracked", &self.tracked_count())
            .field("live", &self.live_count())
            .field("released", &self.released)
            .finish()
    }
}
