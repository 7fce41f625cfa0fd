use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{Arc, BezPath, Point, Vec2};

const ARC_TOLERANCE: f64 = 0.1;

/// Closed rounded-rectangle path, clockwise from just right of the top-left corner.
///
/// `r` is clamped to `[0, min(w, h) / 2]`; non-finite radii count as zero. With `r == 0` the path
/// is exactly the rectangle `[x, x + w] × [y, y + h]`.
pub fn round_rect_path(x: f64, y: f64, w: f64, h: f64, r: f64) -> BezPath {
    let max_r = (w.min(h) / 2.0).max(0.0);
    let r = if r.is_finite() { r.clamp(0.0, max_r) } else { 0.0 };

    let mut path = BezPath::new();
    path.move_to((x + r, y));

    path.line_to((x + w - r, y));
    corner(&mut path, Point::new(x + w - r, y + r), r, -FRAC_PI_2);

    path.line_to((x + w, y + h - r));
    corner(&mut path, Point::new(x + w - r, y + h - r), r, 0.0);

    path.line_to((x + r, y + h));
    corner(&mut path, Point::new(x + r, y + h - r), r, FRAC_PI_2);

    path.line_to((x, y + r));
    corner(&mut path, Point::new(x + r, y + r), r, PI);

    path.close_path();
    path
}

fn corner(path: &mut BezPath, center: Point, r: f64, start_angle: f64) {
    if r <= 0.0 {
        return;
    }
    let arc = Arc {
        center,
        radii: Vec2::new(r, r),
        start_angle,
        sweep_angle: FRAC_PI_2,
        x_rotation: 0.0,
    };
    path.extend(arc.append_iter(ARC_TOLERANCE));
}

#[cfg(test)]
#[path = "../../tests/unit/render/shape.rs"]
mod tests;
