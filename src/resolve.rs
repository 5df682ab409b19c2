//! Entity image resolution
//!
//! Turns the entity references and buff ids of one snapshot into decoded
//! bitmaps tracked in the call's [`ResourceLedger`]. Each id is fetched exactly
//! once no matter how many rosters mention it.

use futures::future::try_join_all;
use image::RgbaImage;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::watch;
use tracing::debug;

use crate::assets::{decode_batch, ImageRepository};
use crate::config::AssetManifest;
use crate::error::{LayoutViolation, ResolutionError};
use crate::ledger::{ImageHandle, ResourceKind, ResourceLedger};
use crate::mode::Game;
use crate::models::EntityRef;

/// Cooperative cancellation for the resolution phase.
///
/// Wraps a `watch` channel; sending `true` cancels. Once drawing has started
/// the signal is no longer consulted.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// A new sender/signal pair.
    pub fn channel() -> (watch::Sender<bool>, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (tx, CancelSignal::new(rx))
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Completes when cancellation is requested. Never completes if the
    /// sender is dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

/// An entity paired with its decoded portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub entity: EntityRef,
    pub portrait: ImageHandle,
}

/// Everything resolved for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    portraits: BTreeMap<u32, ImageHandle>,
    icons: BTreeMap<u32, ImageHandle>,
}

impl ResolvedSet {
    /// Pair an entity with its portrait. Variants of the same id share one
    /// decoded bitmap.
    pub fn entity(&self, entity: EntityRef) -> Result<ResolvedEntity, LayoutViolation> {
        self.portraits
            .get(&entity.id)
            .map(|&portrait| ResolvedEntity { entity, portrait })
            .ok_or(LayoutViolation::MissingEntity(entity.id))
    }

    pub fn icon(&self, id: u32) -> Result<ImageHandle, LayoutViolation> {
        self.icons.get(&id).copied().ok_or(LayoutViolation::MissingIcon(id))
    }

    pub fn portrait_count(&self) -> usize {
        self.portraits.len()
    }

    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Target {
    Portrait(u32),
    Icon(u32),
}

/// Fetches and decodes entity portraits and buff icons for one game.
pub struct EntityImageResolver<'a> {
    repo: &'a dyn ImageRepository,
    manifest: &'a AssetManifest,
    game: Game,
}

impl<'a> EntityImageResolver<'a> {
    pub fn new(repo: &'a dyn ImageRepository, manifest: &'a AssetManifest, game: Game) -> Self {
        Self { repo, manifest, game }
    }

    fn key(&self, target: Target) -> String {
        match target {
            Target::Portrait(id) => self.manifest.portrait_key(self.game, id),
            Target::Icon(id) => self.manifest.buff_key(id),
        }
    }

    /// Resolve every unique entity id and buff id.
    ///
    /// Fetches run concurrently and the first failure aborts the call. The
    /// cancel signal is honoured until the decoded bitmaps are tracked.
    pub async fn resolve(
        &self,
        entities: impl IntoIterator<Item = EntityRef>,
        buffs: impl IntoIterator<Item = u32>,
        cancel: &CancelSignal,
        ledger: &mut ResourceLedger,
    ) -> Result<ResolvedSet, ResolutionError> {
        if cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }

        let targets: BTreeSet<Target> = entities
            .into_iter()
            .map(|e| Target::Portrait(e.id))
            .chain(buffs.into_iter().map(Target::Icon))
            .collect();
        debug!(unique = targets.len(), game = ?self.game, "resolving entity images");

        let fetch = try_join_all(targets.iter().map(|&target| async move {
            let key = self.key(target);
            match self.repo.open_stream(&key).await {
                Ok(bytes) => Ok((target, key, bytes)),
                Err(source) => Err(ResolutionError::Fetch { key, source }),
            }
        }));

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResolutionError::Cancelled),
            result = fetch => result?,
        };

        let decoded: Vec<(Target, RgbaImage)> = decode_batch(fetched).await?;

        if cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }

        // `decoded` follows the BTreeSet order, so handles are numbered by
        // ascending id, portraits before icons.
        let mut set = ResolvedSet::default();
        for (target, image) in decoded {
            match target {
                Target::Portrait(id) => {
                    set.portraits.insert(id, ledger.track(ResourceKind::Portrait, image));
                }
                Target::Icon(id) => {
                    set.icons.insert(id, ledger.track(ResourceKind::Icon, image));
                }
            }
        }
        debug!(
            portraits = set.portrait_count(),
            icons = set.icon_count(),
            "entity images resolved"
        );
        Ok(set)
    }
}
