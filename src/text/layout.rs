use std::borrow::Cow;
use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64;

use crate::assets::color::Color;
use crate::foundation::error::{AdframeError, AdframeResult};
use crate::scene::template::Alignment;

/// Straight-alpha RGBA8 brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.to_rgba8_straight();
        Self { r, g, b, a }
    }
}

/// Shapes single lines of text from raw font bytes.
///
/// Fonts are registered once per distinct byte content and reused across calls.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct an engine with fresh parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font_bytes: &[u8]) -> AdframeResult<String> {
        let key = xxh3_64(font_bytes);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            AdframeError::validation("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AdframeError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %name, "registered font");
        self.families.insert(key, name.clone());
        Ok(name)
    }

    /// Shape `text` as one unbroken line.
    pub fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> AdframeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AdframeError::validation(
                "font size must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Advance width of a shaped line, trailing whitespace included.
pub fn line_width(layout: &parley::Layout<TextBrushRgba8>) -> f64 {
    f64::from(layout.full_width())
}

/// Baseline offset of the first line from the layout's top edge.
pub fn first_baseline(layout: &parley::Layout<TextBrushRgba8>) -> f64 {
    layout
        .lines()
        .next()
        .map(|line| f64::from(line.metrics().baseline))
        .unwrap_or(0.0)
}

/// Left edge of a line of `width` anchored at `x` with the given alignment.
pub fn aligned_left(x: f64, width: f64, alignment: Alignment) -> f64 {
    match alignment {
        Alignment::Left => x,
        Alignment::Center => x - width / 2.0,
        Alignment::Right => x - width,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
