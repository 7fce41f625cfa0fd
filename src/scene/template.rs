use std::path::Path;

use kurbo::Rect;

use crate::assets::color::Color;
use crate::assets::reference::AssetRef;
use crate::foundation::core::Canvas;
use crate::foundation::error::{AdframeError, AdframeResult};
use crate::text::wrap::{WrappedLine, wrap};

/// CTA button corner radius in pixels.
pub const CTA_CORNER_RADIUS: f64 = 12.0;
/// Vertical padding added to the CTA font size to get the button height.
pub const CTA_VERTICAL_PADDING: f64 = 24.0;
/// Horizontal inset used when `cta.wrap_length` is absent.
pub const CTA_DEFAULT_INSET: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Everything one render pass needs, immutable for the duration of the pass.
///
/// Built fresh for every render request, usually from JSON:
///
/// ```json
/// {
///   "urls": { "design_pattern": "https://…/pattern.png", "mask": "https://…/mask.png",
///             "stroke": "https://…/stroke.png" },
///   "image_mask": { "x": 56, "y": 442, "width": 970, "height": 600 },
///   "caption": { "text": "Hello", "position": { "x": 50, "y": 50 }, "font_size": 44,
///                "text_color": "#FFFFFF" },
///   "cta": { "text": "Shop Now", "position": { "x": 190, "y": 320 } }
/// }
/// ```
pub struct TemplateConfig {
    /// Fill painted first, underneath everything else.
    #[serde(default = "default_background")]
    pub background_color: Color,
    /// Image sources.
    pub urls: ImageUrls,
    /// Placement of the subject photo, stroke and mask overlay.
    pub image_mask: MaskRect,
    /// Word-wrapped caption.
    pub caption: CaptionDef,
    /// Call-to-action button.
    pub cta: CtaDef,
    /// Font used for caption and CTA text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<AssetRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Independently addressable image sources.
pub struct ImageUrls {
    /// Tile repeated across the whole canvas; its alpha is the silhouette the subject is clipped to.
    pub design_pattern: AssetRef,
    /// Stock mask image, or a user-supplied image overriding it.
    pub mask: AssetRef,
    /// Outline drawn behind the composed content at the mask region.
    pub stroke: AssetRef,
    /// Subject photo. Falls back to `mask` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<AssetRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Axis-aligned placement rectangle in canvas pixels.
pub struct MaskRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, > 0.
    pub width: f64,
    /// Height, > 0.
    pub height: f64,
}

impl MaskRect {
    /// As a kurbo rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Point in canvas pixels.
pub struct PointDef {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment relative to a line's x origin.
pub enum Alignment {
    /// Line starts at the origin.
    #[default]
    Left,
    /// Line is centered on the origin.
    Center,
    /// Line ends at the origin.
    Right,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Caption block.
pub struct CaptionDef {
    /// Caption text. May be empty.
    #[serde(default)]
    pub text: String,
    /// Top-left anchor before padding.
    pub position: PointDef,
    /// Font size in pixels.
    pub font_size: f64,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub text_color: Color,
    /// Words per wrapped line.
    #[serde(default = "default_max_words_per_line")]
    pub max_words_per_line: usize,
    /// Inset applied twice to the origin and twice between lines.
    #[serde(default = "default_padding")]
    pub padding: f64,
    /// Line alignment.
    #[serde(default)]
    pub alignment: Alignment,
}

impl CaptionDef {
    /// Wrapped lines with baseline origins.
    pub fn lines(&self) -> Vec<WrappedLine> {
        let p2 = 2.0 * self.padding;
        wrap(
            &self.text,
            self.max_words_per_line,
            self.position.x + p2,
            self.position.y + p2,
            self.font_size + p2,
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Call-to-action button.
pub struct CtaDef {
    /// Button label.
    #[serde(default)]
    pub text: String,
    /// Anchor; the button's left edge is `position.x + wrap_length`.
    pub position: PointDef,
    /// Label size in pixels.
    #[serde(default = "default_cta_font_size")]
    pub font_size: f64,
    /// Label color.
    #[serde(default = "default_text_color")]
    pub text_color: Color,
    /// Button fill.
    #[serde(default = "default_cta_background")]
    pub background_color: Color,
    /// Horizontal inset added to `position.x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_length: Option<f64>,
}

impl CtaDef {
    /// Button rectangle on a canvas `canvas_width` pixels wide.
    ///
    /// The button is horizontally symmetric: it spans `[left, canvas_width - left]`.
    pub fn button_rect(&self, canvas_width: f64) -> Rect {
        let left = self.position.x + self.wrap_length.unwrap_or(CTA_DEFAULT_INSET);
        let top = self.position.y;
        let width = canvas_width - 2.0 * left;
        let height = self.font_size + CTA_VERTICAL_PADDING;
        Rect::new(left, top, left + width, top + height)
    }

    /// Label anchor: centered x and baseline y.
    pub fn label_anchor(&self, canvas_width: f64) -> (f64, f64) {
        (
            canvas_width / 2.0,
            self.position.y + self.font_size + CTA_VERTICAL_PADDING / 2.0,
        )
    }
}

fn default_background() -> Color {
    Color::from_rgb8(0x9D, 0x57, 0x48)
}

fn default_text_color() -> Color {
    Color::WHITE
}

fn default_cta_background() -> Color {
    Color::BLACK
}

fn default_max_words_per_line() -> usize {
    6
}

fn default_padding() -> f64 {
    10.0
}

fn default_cta_font_size() -> f64 {
    30.0
}

impl TemplateConfig {
    /// Parse from a JSON reader.
    pub fn from_reader(reader: impl std::io::Read) -> AdframeResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| AdframeError::serde(format!("parse template json: {e}")))
    }

    /// Parse from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AdframeResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AdframeError::serde(format!("open template '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Subject photo reference for the clipped layer.
    pub fn subject_ref(&self) -> &AssetRef {
        self.urls.subject.as_ref().unwrap_or(&self.urls.mask)
    }

    /// Whether the mask image is drawn on top of everything.
    ///
    /// Skipped when the mask and the design pattern are the same image.
    pub fn overlay_enabled(&self) -> bool {
        self.urls.mask != self.urls.design_pattern
    }

    /// Every reference a render pass of this config loads, without duplicates.
    pub fn asset_refs(&self) -> Vec<&AssetRef> {
        let mut refs = vec![&self.urls.design_pattern, self.subject_ref(), &self.urls.stroke];
        if self.overlay_enabled() {
            refs.push(&self.urls.mask);
        }
        refs.extend(self.font.as_ref());
        let mut unique: Vec<&AssetRef> = Vec::with_capacity(refs.len());
        for r in refs {
            if !unique.contains(&r) {
                unique.push(r);
            }
        }
        unique
    }

    /// Check the config against the target canvas. Fails before anything is drawn.
    pub fn validate(&self, canvas: Canvas) -> AdframeResult<()> {
        canvas.validate()?;

        let m = self.image_mask;
        for (name, v) in [("x", m.x), ("y", m.y), ("width", m.width), ("height", m.height)] {
            if !v.is_finite() {
                return Err(AdframeError::validation(format!(
                    "image_mask.{name} must be finite"
                )));
            }
        }
        if m.width <= 0.0 || m.height <= 0.0 {
            return Err(AdframeError::validation(
                "image_mask width/height must be > 0",
            ));
        }

        let c = &self.caption;
        if !c.font_size.is_finite() || c.font_size <= 0.0 {
            return Err(AdframeError::validation(
                "caption.font_size must be finite and > 0",
            ));
        }
        if !c.padding.is_finite() || c.padding < 0.0 {
            return Err(AdframeError::validation(
                "caption.padding must be finite and >= 0",
            ));
        }
        if c.max_words_per_line == 0 {
            return Err(AdframeError::validation(
                "caption.max_words_per_line must be >= 1",
            ));
        }
        if !c.position.x.is_finite() || !c.position.y.is_finite() {
            return Err(AdframeError::validation("caption.position must be finite"));
        }

        let cta = &self.cta;
        if !cta.font_size.is_finite() || cta.font_size <= 0.0 {
            return Err(AdframeError::validation(
                "cta.font_size must be finite and > 0",
            ));
        }
        if !cta.position.x.is_finite() || !cta.position.y.is_finite() {
            return Err(AdframeError::validation("cta.position must be finite"));
        }
        if let Some(w) = cta.wrap_length
            && !w.is_finite()
        {
            return Err(AdframeError::validation("cta.wrap_length must be finite"));
        }
        let button = cta.button_rect(f64::from(canvas.width));
        if button.width() <= 0.0 {
            return Err(AdframeError::validation(format!(
                "cta button width {} must be > 0 on a {}px wide canvas",
                button.width(),
                canvas.width
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
