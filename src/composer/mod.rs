//! Card composition
//!
//! [`CardEngine`] drives one render through three phases. The header and
//! every section are appended to a single canvas-sized [`DrawList`] which is
//! rasterized once and handed to the configured encoder. Every call-local
//! bitmap lives in a [`ResourceLedger`] that is released exactly once, on
//! success and failure alike.

pub mod header;
pub mod sections;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::assets::{cover, fit_width, AssetId, AssetStore, ImageRepository};
use crate::chip::StyledEntityRenderer;
use crate::color::BLACK;
use crate::config::{CardConfig, ConfigError, Theme};
use crate::draw::{DrawList, ImageSource, Rasterizer, Typeface};
use crate::error::{CardError, CompositionError, EncodingError, LayoutViolation, ResolutionError};
use crate::ledger::{ImageHandle, LedgerObserver, ResourceKind, ResourceLedger};
use crate::mode::{ModeProfile, NodeStyle};
use crate::models::{EntityRef, ProfileHeader, Snapshot};
use crate::output::{encoder_for, ArtifactEncoder, CardArtifact};
use crate::plan::{CanvasPlan, CanvasPlanner};
use crate::resolve::{CancelSignal, EntityImageResolver, ResolvedSet};
use crate::roster::RosterLayoutEngine;

use sections::{NodeArt, BUFF_ICON_WIDTH};

/// Corner radius of every overlay panel
pub const PANEL_RADIUS: u32 = 15;

/// Everything a drawing stage reads while appending commands.
pub struct Stage<'a> {
    pub profile: &'static ModeProfile,
    pub theme: &'a Theme,
    pub assets: &'a AssetStore,
}

impl<'a> Stage<'a> {
    pub fn new(profile: &'static ModeProfile, theme: &'a Theme, assets: &'a AssetStore) -> Self {
        Self {
            profile,
            theme,
            assets,
        }
    }

    pub fn typeface(&self) -> &'a Typeface {
        self.assets.typeface()
    }
}

/// Per-call options for [`CardEngine::render`].
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Echoed in logs and in any [`CompositionError`]
    pub correlation_id: String,
    pub cancel: CancelSignal,
    pub observer: Option<Arc<dyn LedgerObserver>>,
}

impl RenderOptions {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            ..Default::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LedgerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Renders statistics cards.
///
/// Construction is cheap; [`CardEngine::load`] fetches the static assets
/// once and every later render shares them read-only.
pub struct CardEngine {
    config: CardConfig,
    theme: Theme,
    encoder: Box<dyn ArtifactEncoder>,
    assets: OnceCell<Arc<AssetStore>>,
}

impl CardEngine {
    /// Validate the configuration and build an engine without assets.
    pub fn new(config: CardConfig) -> Result<Self, ConfigError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(
                errors.into_iter().map(|e| e.to_string()).collect(),
            ));
        }
        let theme = config
            .theme
            .resolve()
            .map_err(|e| ConfigError::Validation(vec![e.to_string()]))?;
        let encoder = encoder_for(&config.encoding);
        Ok(Self {
            config,
            theme,
            encoder,
            assets: OnceCell::new(),
        })
    }

    /// Replace the encoder chosen by configuration.
    pub fn with_encoder(mut self, encoder: Box<dyn ArtifactEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Use an already built store instead of calling [`CardEngine::load`].
    pub fn with_assets(mut self, assets: AssetStore) -> Self {
        self.assets = OnceCell::new_with(Some(Arc::new(assets)));
        self
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Loaded assets, if [`CardEngine::load`] has completed.
    pub fn assets(&self) -> Option<&Arc<AssetStore>> {
        self.assets.get()
    }

    /// Fetch and decode the static assets. Later calls return the store
    /// loaded by the first successful one.
    pub async fn load(
        &self,
        repo: &dyn ImageRepository,
    ) -> Result<Arc<AssetStore>, ResolutionError> {
        self.assets
            .get_or_try_init(|| async {
                AssetStore::load(repo, &self.config.assets).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Render one card.
    ///
    /// The ledger is released before this returns whatever the outcome, and
    /// no partial artifact is ever returned.
    pub async fn render(
        &self,
        snapshot: &Snapshot,
        profile: &ProfileHeader,
        repo: &dyn ImageRepository,
        options: &RenderOptions,
    ) -> Result<CardArtifact, CompositionError> {
        let started = Instant::now();
        let correlation_id = options.correlation_id.as_str();
        info!(mode = %snapshot.mode, correlation_id, "generating card");

        let mut ledger = match &options.observer {
            Some(observer) => ResourceLedger::with_observer(Arc::clone(observer)),
            None => ResourceLedger::new(),
        };
        let result = self
            .compose(snapshot, profile, repo, &options.cancel, &mut ledger)
            .await;
        let released = ledger.release_all();
        debug!(released, "call-local bitmaps released");

        match result {
            Ok(artifact) => {
                info!(
                    mode = %snapshot.mode,
                    correlation_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    bytes = artifact.len(),
                    "card generated"
                );
                Ok(artifact)
            }
            Err(cause) => {
                let serialized = serde_json::to_string(snapshot).unwrap_or_default();
                error!(
                    mode = %snapshot.mode,
                    correlation_id,
                    kind = cause.kind(),
                    snapshot = %serialized,
                    "card generation failed: {}",
                    cause
                );
                Err(CompositionError {
                    correlation_id: options.correlation_id.clone(),
                    mode: snapshot.mode,
                    snapshot: serialized,
                    cause,
                })
            }
        }
    }

    async fn compose(
        &self,
        snapshot: &Snapshot,
        profile: &ProfileHeader,
        repo: &dyn ImageRepository,
        cancel: &CancelSignal,
        ledger: &mut ResourceLedger,
    ) -> Result<CardArtifact, CardError> {
        let assets = Arc::clone(self.assets.get().ok_or(ResolutionError::AssetsNotLoaded)?);
        let mode = snapshot.mode.profile();

        let plan = CanvasPlanner::new(mode).plan(snapshot)?;
        debug!(
            width = plan.width,
            height = plan.height,
            detailed = plan.detailed_count(),
            "canvas planned"
        );

        // Only what is actually drawn gets fetched
        let drawn: Vec<_> = plan
            .sections
            .iter()
            .filter(|slot| slot.shape.is_detailed())
            .filter_map(|slot| snapshot.section(slot.number))
            .collect();
        let entities = snapshot
            .most_used
            .iter()
            .chain(drawn.iter().flat_map(|r| r.nodes.iter().flat_map(|n| n.roster.iter())))
            .copied();
        let draws_buffs = matches!(mode.node_style, NodeStyle::Scored { buff: true, .. });
        let buffs = drawn
            .iter()
            .flat_map(|r| r.nodes.iter().filter_map(|n| n.buff))
            .filter(|_| draws_buffs);

        let resolver = EntityImageResolver::new(repo, &self.config.assets, mode.game);
        let resolved = resolver.resolve(entities, buffs, cancel, ledger).await?;

        // Drawing: synchronous from here on, cancellation no longer applies
        let mut builder = RosterBuilder {
            resolved: &resolved,
            chips: StyledEntityRenderer::new(self.theme),
            engine: RosterLayoutEngine::new(),
            buffs: BTreeMap::new(),
            assets: &assets,
        };

        let highlight = match plan.highlight {
            Some(_) => Some(builder.roster(&snapshot.most_used, ledger)?),
            None => None,
        };

        let mut art: BTreeMap<u32, Vec<NodeArt>> = BTreeMap::new();
        for record in &drawn {
            let mut nodes = Vec::with_capacity(record.nodes.len());
            for node in &record.nodes {
                let roster = builder.roster(&node.roster, ledger)?;
                let buff = match node.buff.filter(|_| draws_buffs) {
                    Some(id) => Some(builder.buff_icon(id, ledger)?),
                    None => None,
                };
                nodes.push(NodeArt { roster, buff });
            }
            art.insert(record.index, nodes);
        }
        debug!(chips = builder.chips.chip_count(), rosters = art.len(), "rosters laid out");

        let background = background(&assets, snapshot, &plan, ledger)?;
        let stage = Stage::new(mode, &self.theme, &assets);
        let mut list = DrawList::new(plan.width, plan.height);
        list.clear(BLACK);
        list.blit(ImageSource::Tracked(background), 0, 0);
        header::header_commands(&mut list, &stage, snapshot, profile, &plan, highlight);
        for slot in &plan.sections {
            let nodes = art.get(&slot.number).map(Vec::as_slice).unwrap_or(&[]);
            let record = snapshot.section(slot.number);
            sections::section_commands(&mut list, &stage, slot, record, nodes);
        }
        debug!(commands = list.len(), "draw list built");

        let canvas = Rasterizer::new(ledger, &assets).render(&list)?;
        let canvas = ledger.track(ResourceKind::Canvas, canvas);

        let bytes = self.encoder.encode(ledger.get(canvas)?)?;
        if bytes.is_empty() {
            return Err(EncodingError::Empty.into());
        }
        debug!(bytes = bytes.len(), format = %self.encoder.format(), "canvas encoded");

        Ok(CardArtifact {
            bytes,
            width: plan.width,
            height: plan.height,
            format: self.encoder.format(),
        })
    }
}

/// Styles chips and lays out rosters for one call, caching buff icons.
struct RosterBuilder<'a> {
    resolved: &'a ResolvedSet,
    chips: StyledEntityRenderer,
    engine: RosterLayoutEngine,
    buffs: BTreeMap<u32, ImageHandle>,
    assets: &'a AssetStore,
}

impl RosterBuilder<'_> {
    fn roster(
        &mut self,
        refs: &[EntityRef],
        ledger: &mut ResourceLedger,
    ) -> Result<ImageHandle, LayoutViolation> {
        let mut chips = Vec::with_capacity(refs.len());
        for &entity in refs {
            let resolved = self.resolved.entity(entity)?;
            chips.push(self.chips.style(resolved, ledger, self.assets)?);
        }
        self.engine.layout(&chips, ledger, self.assets)
    }

    fn buff_icon(
        &mut self,
        id: u32,
        ledger: &mut ResourceLedger,
    ) -> Result<ImageHandle, LayoutViolation> {
        if let Some(&handle) = self.buffs.get(&id) {
            return Ok(handle);
        }
        let scaled = fit_width(ledger.get(self.resolved.icon(id)?)?, BUFF_ICON_WIDTH);
        let handle = ledger.track(ResourceKind::Derived, scaled);
        self.buffs.insert(id, handle);
        Ok(handle)
    }
}

/// Background plate scaled to cover the whole canvas.
fn background(
    assets: &AssetStore,
    snapshot: &Snapshot,
    plan: &CanvasPlan,
    ledger: &mut ResourceLedger,
) -> Result<ImageHandle, LayoutViolation> {
    let id = AssetId::Background(snapshot.mode);
    let plate = assets
        .image(id)
        .ok_or_else(|| LayoutViolation::MissingAsset(id.to_string()))?;
    Ok(ledger.track(ResourceKind::Derived, cover(plate, plan.width, plan.height)))
}
