use std::sync::Arc;

use kurbo::Rect;

use crate::assets::color::Color;
use crate::assets::decode::DecodedImage;
use crate::assets::loader::{AssetLoader, LoadError};
use crate::compose::report::{Layer, LayerDefect, RenderReport};
use crate::foundation::core::Canvas;
use crate::foundation::error::AdframeResult;
use crate::render::composite::CompositeMode;
use crate::render::raster::{CpuRasterizer, FontData, font_data};
use crate::render::shape::round_rect_path;
use crate::render::surface::Surface;
use crate::scene::template::{Alignment, CTA_CORNER_RADIUS, TemplateConfig};
use crate::text::layout::{TextLayoutEngine, aligned_left, line_width};

type ImageResult = Result<Arc<DecodedImage>, LoadError>;

/// Assets one pass needs, each either ready or failed.
///
/// `mask_overlay` is `None` when the overlay layer is disabled. [`RenderAssets::acquire`] always
/// fills `font`, with the system fallback face when the template names none; callers building
/// assets by hand may leave it `None` to skip text.
#[derive(Clone, Debug)]
pub struct RenderAssets {
    /// Design pattern tile.
    pub pattern: ImageResult,
    /// Subject photo.
    pub subject: ImageResult,
    /// Mask stroke.
    pub stroke: ImageResult,
    /// Mask overlay image.
    pub mask_overlay: Option<ImageResult>,
    /// Font bytes for caption and CTA text.
    pub font: Option<Result<Arc<Vec<u8>>, LoadError>>,
}

impl RenderAssets {
    /// Acquire every asset `config` references concurrently and wait for all of them.
    ///
    /// Without `config.font` the text layers use [`AssetLoader::default_font`].
    ///
    /// Individual failures are kept per asset; this never fails as a whole.
    #[tracing::instrument(skip_all)]
    pub async fn acquire(loader: &AssetLoader, config: &TemplateConfig) -> Self {
        let overlay = async {
            if config.overlay_enabled() {
                Some(loader.load(&config.urls.mask).await)
            } else {
                None
            }
        };
        let font = async {
            match &config.font {
                Some(f) => loader.load_font(f).await,
                None => loader.default_font().await,
            }
        };
        let (pattern, subject, stroke, mask_overlay, font) = futures::join!(
            loader.load(&config.urls.design_pattern),
            loader.load(config.subject_ref()),
            loader.load(&config.urls.stroke),
            overlay,
            font,
        );
        Self {
            pattern,
            subject,
            stroke,
            mask_overlay,
            font: Some(font),
        }
    }

    fn image(&self, slot: ImageSlot) -> Result<&DecodedImage, String> {
        let res = match slot {
            ImageSlot::Pattern => &self.pattern,
            ImageSlot::Subject => &self.subject,
            ImageSlot::Stroke => &self.stroke,
            ImageSlot::MaskOverlay => match &self.mask_overlay {
                Some(r) => r,
                None => return Err("mask overlay was not loaded".to_owned()),
            },
        };
        res.as_deref().map_err(|e| e.to_string())
    }
}

/// Which loaded image an op draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    /// [`RenderAssets::pattern`].
    Pattern,
    /// [`RenderAssets::subject`].
    Subject,
    /// [`RenderAssets::stroke`].
    Stroke,
    /// [`RenderAssets::mask_overlay`].
    MaskOverlay,
}

/// One positioned line of text. `baseline` is the y of the first baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Line text.
    pub text: String,
    /// Alignment anchor x.
    pub x: f64,
    /// Baseline y.
    pub baseline: f64,
}

/// What a [`DrawOp`] paints.
#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
    /// Solid fill of the whole surface.
    Fill(Color),
    /// Image tiled from the origin at natural size.
    Tile(ImageSlot),
    /// Image scaled into a rectangle.
    Image {
        /// Source image.
        slot: ImageSlot,
        /// Destination rectangle.
        dest: Rect,
    },
    /// Filled rounded rectangle.
    RoundRect {
        /// Bounds.
        rect: Rect,
        /// Corner radius before clamping.
        radius: f64,
        /// Fill color.
        color: Color,
    },
    /// Lines of text in the template font.
    Text {
        /// Lines in draw order.
        lines: Vec<TextLine>,
        /// Font size in pixels.
        font_size: f64,
        /// Fill color.
        color: Color,
        /// Alignment of each line around its x.
        alignment: Alignment,
    },
}

/// A single step of the render sequence with its composite mode.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOp {
    /// Layer reported for this op.
    pub layer: Layer,
    /// How the op combines with the surface.
    pub mode: CompositeMode,
    /// What the op paints.
    pub kind: OpKind,
}

/// Runs the ordered fill/clip/blend sequence for one template onto a [`Surface`].
#[derive(Default)]
pub struct CompositionEngine {
    text: TextLayoutEngine,
}

impl CompositionEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered draw operations for `config` on `canvas`.
    pub fn plan(config: &TemplateConfig, canvas: Canvas) -> Vec<DrawOp> {
        let canvas_w = f64::from(canvas.width);
        let mask = config.image_mask.to_rect();
        let cta = &config.cta;
        let (label_x, label_baseline) = cta.label_anchor(canvas_w);

        let mut ops = vec![
            DrawOp {
                layer: Layer::Background,
                mode: CompositeMode::SourceOver,
                kind: OpKind::Fill(config.background_color),
            },
            DrawOp {
                layer: Layer::Pattern,
                mode: CompositeMode::SourceOver,
                kind: OpKind::Tile(ImageSlot::Pattern),
            },
            DrawOp {
                layer: Layer::Subject,
                mode: CompositeMode::SourceIn,
                kind: OpKind::Image {
                    slot: ImageSlot::Subject,
                    dest: mask,
                },
            },
            DrawOp {
                layer: Layer::Stroke,
                mode: CompositeMode::DestinationOver,
                kind: OpKind::Image {
                    slot: ImageSlot::Stroke,
                    dest: mask,
                },
            },
            DrawOp {
                layer: Layer::CtaButton,
                mode: CompositeMode::SourceOver,
                kind: OpKind::RoundRect {
                    rect: cta.button_rect(canvas_w),
                    radius: CTA_CORNER_RADIUS,
                    color: cta.background_color,
                },
            },
            DrawOp {
                layer: Layer::CtaText,
                mode: CompositeMode::SourceOver,
                kind: OpKind::Text {
                    lines: vec![TextLine {
                        text: cta.text.clone(),
                        x: label_x,
                        baseline: label_baseline,
                    }],
                    font_size: cta.font_size,
                    color: cta.text_color,
                    alignment: Alignment::Center,
                },
            },
            DrawOp {
                layer: Layer::Caption,
                mode: CompositeMode::SourceOver,
                kind: OpKind::Text {
                    lines: config
                        .caption
                        .lines()
                        .into_iter()
                        .map(|l| TextLine {
                            text: l.text,
                            x: l.x,
                            baseline: l.y,
                        })
                        .collect(),
                    font_size: config.caption.font_size,
                    color: config.caption.text_color,
                    alignment: config.caption.alignment,
                },
            },
        ];

        if config.overlay_enabled() {
            ops.push(DrawOp {
                layer: Layer::MaskOverlay,
                mode: CompositeMode::SourceOver,
                kind: OpKind::Image {
                    slot: ImageSlot::MaskOverlay,
                    dest: mask,
                },
            });
        }
        ops
    }

    /// Clear `surface` and draw every layer of `config` in order.
    ///
    /// Fails only on invalid configuration, before anything is drawn. A layer whose input failed is
    /// skipped and reported; the remaining layers still draw.
    #[tracing::instrument(skip_all, fields(width = surface.width(), height = surface.height()))]
    pub fn compose(
        &mut self,
        config: &TemplateConfig,
        assets: &RenderAssets,
        surface: &mut Surface,
    ) -> AdframeResult<RenderReport> {
        let canvas = surface.canvas();
        config.validate(canvas)?;
        let mut raster = CpuRasterizer::new(canvas)?;
        surface.clear();

        let font = match &assets.font {
            None => Err("no font configured".to_owned()),
            Some(Err(e)) => Err(format!("font: {e}")),
            Some(Ok(bytes)) => Ok((bytes.as_slice(), font_data(bytes))),
        };

        let mut report = RenderReport::default();
        for op in Self::plan(config, canvas) {
            let out = match &op.kind {
                OpKind::Text {
                    lines,
                    font_size,
                    color,
                    alignment,
                } => match &font {
                    Ok((bytes, data)) => self.draw_text(
                        &mut raster,
                        surface,
                        TextRun {
                            lines,
                            font_bytes: bytes,
                            font: data,
                            font_size: *font_size,
                            color: *color,
                            alignment: *alignment,
                        },
                        op.mode,
                    ),
                    Err(reason) => Err(reason.clone()),
                },
                kind => draw_shape_or_image(&mut raster, surface, assets, kind, op.mode),
            };

            match out {
                Ok(()) => {
                    tracing::debug!(layer = %op.layer, mode = ?op.mode, "drew layer");
                    report.drawn.push(op.layer);
                }
                Err(reason) => {
                    tracing::warn!(layer = %op.layer, %reason, "skipped layer");
                    report.defects.push(LayerDefect {
                        layer: op.layer,
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }

    fn draw_text(
        &mut self,
        raster: &mut CpuRasterizer,
        surface: &mut Surface,
        run: TextRun<'_>,
        mode: CompositeMode,
    ) -> Result<(), String> {
        for line in run.lines {
            if line.text.trim().is_empty() {
                continue;
            }
            let layout = self
                .text
                .layout_line(
                    &line.text,
                    run.font_bytes,
                    run.font_size as f32,
                    run.color.into(),
                )
                .map_err(|e| e.to_string())?;
            let left = aligned_left(line.x, line_width(&layout), run.alignment);
            raster
                .draw_text(surface, &layout, run.font, left, line.baseline, mode)
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

struct TextRun<'a> {
    lines: &'a [TextLine],
    font_bytes: &'a [u8],
    font: &'a FontData,
    font_size: f64,
    color: Color,
    alignment: Alignment,
}

fn draw_shape_or_image(
    raster: &mut CpuRasterizer,
    surface: &mut Surface,
    assets: &RenderAssets,
    kind: &OpKind,
    mode: CompositeMode,
) -> Result<(), String> {
    let out = match kind {
        OpKind::Fill(color) => {
            let full = Rect::new(
                0.0,
                0.0,
                f64::from(surface.width()),
                f64::from(surface.height()),
            );
            raster.fill_rect(surface, full, *color, mode)
        }
        OpKind::Tile(slot) => {
            let tile = assets.image(*slot)?;
            raster.fill_pattern(surface, tile, mode)
        }
        OpKind::Image { slot, dest } => {
            let image = assets.image(*slot)?;
            raster.draw_image(surface, image, *dest, mode)
        }
        OpKind::RoundRect {
            rect,
            radius,
            color,
        } => {
            let path = round_rect_path(rect.x0, rect.y0, rect.width(), rect.height(), *radius);
            raster.fill_path(surface, &path, *color, mode)
        }
        OpKind::Text { .. } => return Err("text op needs a font".to_owned()),
    };
    out.map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
