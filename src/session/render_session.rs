use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::assets::loader::AssetLoader;
use crate::assets::reference::AssetRef;
use crate::compose::engine::{CompositionEngine, RenderAssets};
use crate::compose::report::RenderReport;
use crate::foundation::core::Canvas;
use crate::foundation::error::{AdframeError, AdframeResult};
use crate::render::surface::Surface;
use crate::scene::template::TemplateConfig;

/// Session options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSessionOpts {
    /// Size of the committed surface.
    pub canvas: Canvas,
}

/// Result of one [`RenderSession::render_template`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The pass drew and committed its surface.
    Completed(RenderReport),
    /// A newer pass started first; this one was discarded without touching the surface.
    Superseded {
        /// Generation of the discarded pass.
        generation: u64,
    },
}

impl RenderOutcome {
    /// Report of a completed pass.
    pub fn report(&self) -> Option<&RenderReport> {
        match self {
            Self::Completed(r) => Some(r),
            Self::Superseded { .. } => None,
        }
    }

    /// `true` for [`RenderOutcome::Superseded`].
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

struct SessionState {
    generation: u64,
    surface: Surface,
    /// References the committed pass loaded.
    refs: Vec<AssetRef>,
    /// References of passes that have started but not finished, by generation.
    in_flight: HashMap<u64, Vec<AssetRef>>,
}

impl SessionState {
    /// Keep only the references no committed or running pass still needs.
    fn unused(&self, mut refs: Vec<AssetRef>) -> Vec<AssetRef> {
        refs.retain(|r| {
            !self.refs.contains(r) && !self.in_flight.values().any(|v| v.contains(r))
        });
        refs
    }
}

/// Owns the committed surface and decides which render pass may write it.
///
/// Every call to [`RenderSession::render_template`] takes a new generation number. A pass whose
/// generation is no longer the latest when its assets arrive, or when it is about to commit,
/// returns [`RenderOutcome::Superseded`] and leaves the committed surface alone.
///
/// Cached assets live as long as some pass uses them. When a pass commits, references only the
/// previous committed pass used are evicted from the loader; a pass that ends without committing
/// evicts the references only it used.
pub struct RenderSession {
    loader: AssetLoader,
    opts: RenderSessionOpts,
    latest: AtomicU64,
    state: Mutex<SessionState>,
}

/// Unregisters a pass's references when it ends, however it ends.
struct PassGuard<'a> {
    session: &'a RenderSession,
    generation: u64,
    committed: bool,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        let stale = {
            let mut state = self.session.state.lock();
            let own = state.in_flight.remove(&self.generation).unwrap_or_default();
            if self.committed {
                Vec::new()
            } else {
                state.unused(own)
            }
        };
        self.session.evict(stale);
    }
}

impl RenderSession {
    /// Create a session with a transparent committed surface.
    pub fn new(loader: AssetLoader, opts: RenderSessionOpts) -> AdframeResult<Self> {
        let surface = Surface::new(opts.canvas)?;
        Ok(Self {
            loader,
            opts,
            latest: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                generation: 0,
                surface,
                refs: Vec::new(),
                in_flight: HashMap::new(),
            }),
        })
    }

    /// Loader shared by every pass.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Canvas size of the committed surface.
    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Generation whose pixels are committed; `0` before the first completed pass.
    pub fn committed_generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Copy of the committed surface.
    pub fn snapshot(&self) -> Surface {
        self.state.lock().surface.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    fn evict(&self, refs: Vec<AssetRef>) {
        for r in &refs {
            if self.loader.evict(r) {
                tracing::debug!(asset = %r, "evicted unused asset");
            }
        }
    }

    /// Render `config` and commit the result unless a newer pass has started.
    ///
    /// Invalid configurations fail before a generation is taken, so they never supersede a pass in
    /// flight. Asset failures do not fail the pass; they show up in the report. Rasterization runs
    /// on tokio's blocking pool.
    #[tracing::instrument(skip_all, fields(generation = tracing::field::Empty))]
    pub async fn render_template(&self, config: &TemplateConfig) -> AdframeResult<RenderOutcome> {
        config.validate(self.opts.canvas)?;

        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::Span::current().record("generation", generation);

        let refs: Vec<AssetRef> = config.asset_refs().into_iter().cloned().collect();
        self.state.lock().in_flight.insert(generation, refs.clone());
        let mut guard = PassGuard {
            session: self,
            generation,
            committed: false,
        };

        let assets = RenderAssets::acquire(&self.loader, config).await;
        if !self.is_current(generation) {
            tracing::info!(generation, "render pass superseded while loading");
            return Ok(RenderOutcome::Superseded { generation });
        }

        let canvas = self.opts.canvas;
        let owned = config.clone();
        let span = tracing::Span::current();
        let (surface, mut report) = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let mut surface = Surface::new(canvas)?;
            let report = CompositionEngine::new().compose(&owned, &assets, &mut surface)?;
            Ok::<_, AdframeError>((surface, report))
        })
        .await
        .map_err(|e| AdframeError::render(format!("compose task failed: {e}")))??;
        report.generation = generation;

        let stale = {
            let mut state = self.state.lock();
            if !self.is_current(generation) {
                tracing::info!(generation, "render pass superseded before commit");
                return Ok(RenderOutcome::Superseded { generation });
            }
            state.generation = generation;
            state.surface = surface;
            let previous = std::mem::replace(&mut state.refs, refs);
            guard.committed = true;
            state.unused(previous)
        };
        self.evict(stale);

        tracing::info!(
            generation,
            drawn = report.drawn.len(),
            defects = report.defects.len(),
            "render pass committed"
        );
        Ok(RenderOutcome::Completed(report))
    }
}
