use std::path::Path;

use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{AdframeError, AdframeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::composite::{CompositeMode, composite_in_place};

/// Row-major premultiplied RGBA8 raster target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(canvas: Canvas) -> AdframeResult<Self> {
        canvas.validate()?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.byte_len()],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixel at `(x, y)`; out-of-range reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Straight-alpha copy of the pixel bytes for encoders.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Copy of this surface composited over an opaque `matte`.
    pub fn flatten_onto(&self, matte: Color) -> Self {
        let mut out = self.clone();
        let matte = Color { a: 1.0, ..matte }.to_rgba8_premul();
        out.fill(matte);
        // Buffers are the same size by construction.
        let _ = composite_in_place(&mut out.data, &self.data, CompositeMode::SourceOver);
        out
    }

    /// Encode as PNG at `path`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save_png(&self, path: impl AsRef<Path>) -> AdframeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AdframeError::render(format!("create '{}': {e}", parent.display())))?;
        }
        image::save_buffer_with_format(
            path,
            &self.to_rgba8_straight(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| AdframeError::render(format!("write '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
