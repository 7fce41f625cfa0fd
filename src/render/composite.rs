use crate::foundation::error::{AdframeError, AdframeResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a layer combines with the pixels already on the surface.
///
/// Modes apply to the whole surface: wherever the layer paints nothing it counts as transparent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    /// `S + D·(1−αs)`
    #[default]
    SourceOver,
    /// `S·αd`. Keeps the layer only where the surface already has coverage.
    SourceIn,
    /// `S·(1−αd) + D`. Paints behind existing content.
    DestinationOver,
}

/// Combine one source pixel with one destination pixel.
pub fn composite(dst: PremulRgba8, src: PremulRgba8, mode: CompositeMode) -> PremulRgba8 {
    match mode {
        CompositeMode::SourceOver => {
            if src[3] == 0 {
                return dst;
            }
            if src[3] == 255 {
                return src;
            }
            let inv = 255 - u16::from(src[3]);
            std::array::from_fn(|i| add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv)))
        }
        CompositeMode::SourceIn => {
            let da = u16::from(dst[3]);
            std::array::from_fn(|i| mul_div255_u8(u16::from(src[i]), da))
        }
        CompositeMode::DestinationOver => {
            if dst[3] == 255 {
                return dst;
            }
            let inv = 255 - u16::from(dst[3]);
            std::array::from_fn(|i| add_sat_u8(mul_div255_u8(u16::from(src[i]), inv), dst[i]))
        }
    }
}

/// Composite an equally sized layer buffer onto `dst` in place.
pub fn composite_in_place(dst: &mut [u8], src: &[u8], mode: CompositeMode) -> AdframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AdframeError::render(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = composite([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], mode);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
