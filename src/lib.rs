//! adframe renders layered promotional-ad images.
//!
//! A render pass takes a [`TemplateConfig`] and paints, in order: a background fill, a tiled design
//! pattern, a subject photo clipped to the pattern's silhouette, a mask stroke composited behind
//! existing content, a rounded call-to-action button with centered text, a word-wrapped caption,
//! and an optional mask-override image.
//!
//! - Build a [`RenderSession`] around an [`AssetLoader`]
//! - Call [`RenderSession::render_template`] for every configuration change
//! - Read the committed [`Surface`] with [`RenderSession::snapshot`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset references, acquisition, caching and decoding.
pub mod assets;
/// Layer planning and the render sequence.
pub mod compose;
/// Raster surface, composite modes and the CPU rasterizer.
pub mod render;
/// Template configuration boundary model.
pub mod scene;
/// Generation-aware render sessions.
pub mod session;
/// Caption wrapping and glyph layout.
pub mod text;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{AdframeError, AdframeResult};

pub use crate::assets::cache::AssetKey;
pub use crate::assets::color::Color;
pub use crate::assets::decode::DecodedImage;
pub use crate::assets::loader::{AssetFetcher, AssetLoader, DefaultFetcher, LoadError, LoaderConfig};
pub use crate::assets::reference::AssetRef;
pub use crate::assets::system_font::find_system_font;
pub use crate::compose::engine::{CompositionEngine, RenderAssets};
pub use crate::compose::report::{Layer, LayerDefect, RenderReport};
pub use crate::render::composite::CompositeMode;
pub use crate::render::surface::Surface;
pub use crate::scene::template::{
    Alignment, CaptionDef, CtaDef, ImageUrls, MaskRect, PointDef, TemplateConfig,
};
pub use crate::session::render_session::{RenderOutcome, RenderSession, RenderSessionOpts};
pub use crate::text::wrap::{WrappedLine, wrap};
