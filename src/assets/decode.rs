use std::sync::Arc;

use crate::assets::loader::LoadError;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Read-only once produced; clones share the pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap already-premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, LoadError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| LoadError::Decode("image size overflow".to_owned()))?;
        if width == 0 || height == 0 {
            return Err(LoadError::Decode("image has zero width or height".to_owned()));
        }
        if bytes.len() != expected {
            return Err(LoadError::Decode(format!(
                "pixel buffer is {} bytes, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }

    /// Premultiplied pixel at `(x, y)`; out-of-range reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let d = &self.rgba8_premul;
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, LoadError> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| LoadError::Decode(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    DecodedImage::from_premul_rgba8(width, height, rgba8_premul)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
