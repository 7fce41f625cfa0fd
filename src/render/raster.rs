use std::sync::Arc;

use kurbo::{Affine, BezPath, Rect};

use crate::assets::color::Color;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::{AdframeError, AdframeResult};
use crate::render::composite::{CompositeMode, composite_in_place};
use crate::render::surface::Surface;
use crate::text::layout::{TextBrushRgba8, first_baseline};

/// Font handle consumed by [`CpuRasterizer::draw_text`].
pub type FontData = vello_cpu::peniko::FontData;

/// Wrap raw font bytes for glyph rasterization.
pub fn font_data(bytes: &[u8]) -> FontData {
    FontData::new(vello_cpu::peniko::Blob::from(bytes.to_vec()), 0)
}

/// Draws one layer at a time into a transparent scratch pixmap and composites it onto a
/// [`Surface`] with an explicit [`CompositeMode`].
pub struct CpuRasterizer {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    layer: vello_cpu::Pixmap,
}

impl CpuRasterizer {
    /// Create a rasterizer for surfaces of `canvas` size.
    pub fn new(canvas: Canvas) -> AdframeResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| AdframeError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| AdframeError::render("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            layer: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Fill `rect` with a solid color.
    pub fn fill_rect(
        &mut self,
        surface: &mut Surface,
        rect: Rect,
        color: Color,
        mode: CompositeMode,
    ) -> AdframeResult<()> {
        self.begin(surface)?;
        self.ctx.set_paint(solid(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        self.commit(surface, mode)
    }

    /// Fill a closed path with a solid color.
    pub fn fill_path(
        &mut self,
        surface: &mut Surface,
        path: &BezPath,
        color: Color,
        mode: CompositeMode,
    ) -> AdframeResult<()> {
        self.begin(surface)?;
        self.ctx.set_paint(solid(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
        self.commit(surface, mode)
    }

    /// Cover the whole surface with `tile` repeated at its natural size from the origin.
    pub fn fill_pattern(
        &mut self,
        surface: &mut Surface,
        tile: &DecodedImage,
        mode: CompositeMode,
    ) -> AdframeResult<()> {
        self.check_size(surface)?;
        let (w, h) = (usize::from(self.width), usize::from(self.height));
        let (tw, th) = (tile.width as usize, tile.height as usize);
        let src = tile.rgba8_premul.as_slice();
        let dst = self.layer.data_as_u8_slice_mut();

        for y in 0..h {
            let row = &src[(y % th) * tw * 4..][..tw * 4];
            let out = &mut dst[y * w * 4..][..w * 4];
            for (x, px) in out.chunks_exact_mut(4).enumerate() {
                let tx = (x % tw) * 4;
                px.copy_from_slice(&row[tx..tx + 4]);
            }
        }

        self.composite_layer(surface, mode)
    }

    /// Draw `image` scaled to fill `dest`.
    pub fn draw_image(
        &mut self,
        surface: &mut Surface,
        image: &DecodedImage,
        dest: Rect,
        mode: CompositeMode,
    ) -> AdframeResult<()> {
        self.begin(surface)?;
        let dest = dest.abs();
        if dest.width() > 0.0 && dest.height() > 0.0 {
            let (w, h) = (f64::from(image.width), f64::from(image.height));
            let transform = Affine::translate((dest.x0, dest.y0))
                * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);
            self.ctx.set_transform(affine_to_cpu(transform));
            self.ctx.set_paint(image_paint(image)?);
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }
        self.commit(surface, mode)
    }

    /// Draw a shaped line with its left edge at `left` and its first baseline at `baseline`.
    pub fn draw_text(
        &mut self,
        surface: &mut Surface,
        layout: &parley::Layout<TextBrushRgba8>,
        font: &FontData,
        left: f64,
        baseline: f64,
        mode: CompositeMode,
    ) -> AdframeResult<()> {
        self.begin(surface)?;
        let transform = Affine::translate((left, baseline - first_baseline(layout)));
        self.ctx.set_transform(affine_to_cpu(transform));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        self.commit(surface, mode)
    }

    fn check_size(&self, surface: &Surface) -> AdframeResult<()> {
        if surface.width() != u32::from(self.width) || surface.height() != u32::from(self.height)
        {
            return Err(AdframeError::render(format!(
                "surface is {}x{}, rasterizer expects {}x{}",
                surface.width(),
                surface.height(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    fn begin(&mut self, surface: &Surface) -> AdframeResult<()> {
        self.check_size(surface)?;
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn commit(&mut self, surface: &mut Surface, mode: CompositeMode) -> AdframeResult<()> {
        self.ctx.flush();
        self.layer.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.layer);
        self.composite_layer(surface, mode)
    }

    fn composite_layer(&mut self, surface: &mut Surface, mode: CompositeMode) -> AdframeResult<()> {
        let out = composite_in_place(surface.data_mut(), self.layer.data_as_u8_slice(), mode);
        self.layer.data_as_u8_slice_mut().fill(0);
        out
    }
}

fn solid(color: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = color.to_rgba8_straight();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn image_paint(image: &DecodedImage) -> AdframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(image.rgba8_premul.as_slice(), image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> AdframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| AdframeError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| AdframeError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(AdframeError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
