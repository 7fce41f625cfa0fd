use std::fmt;

/// Named step of the render sequence, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Solid background fill.
    Background,
    /// Tiled design pattern.
    Pattern,
    /// Subject photo clipped to the pattern silhouette.
    Subject,
    /// Mask stroke painted behind existing content.
    Stroke,
    /// Rounded CTA button.
    CtaButton,
    /// Centered CTA label.
    CtaText,
    /// Wrapped caption.
    Caption,
    /// Mask image drawn over everything.
    MaskOverlay,
}

impl Layer {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Pattern => "pattern",
            Self::Subject => "subject",
            Self::Stroke => "stroke",
            Self::CtaButton => "cta_button",
            Self::CtaText => "cta_text",
            Self::Caption => "caption",
            Self::MaskOverlay => "mask_overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layer that was skipped, and why.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LayerDefect {
    /// Skipped layer.
    pub layer: Layer,
    /// Human-readable cause.
    pub reason: String,
}

/// What one render pass drew.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderReport {
    /// Generation token of the pass.
    pub generation: u64,
    /// Layers drawn, in order.
    pub drawn: Vec<Layer>,
    /// Layers skipped because an input failed.
    pub defects: Vec<LayerDefect>,
}

impl RenderReport {
    /// `true` when no layer was skipped.
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    /// Defect recorded for `layer`, if any.
    pub fn defect(&self, layer: Layer) -> Option<&LayerDefect> {
        self.defects.iter().find(|d| d.layer == layer)
    }

    /// Whether `layer` was drawn.
    pub fn was_drawn(&self, layer: Layer) -> bool {
        self.drawn.contains(&layer)
    }
}
