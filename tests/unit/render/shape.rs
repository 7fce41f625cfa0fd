use kurbo::{PathEl, Rect, Shape as _};

use super::*;

fn assert_rect_close(a: Rect, b: Rect) {
    let eps = 1e-6;
    assert!(
        (a.x0 - b.x0).abs() < eps
            && (a.y0 - b.y0).abs() < eps
            && (a.x1 - b.x1).abs() < eps
            && (a.y1 - b.y1).abs() < eps,
        "{a:?} != {b:?}"
    );
}

#[test]
fn zero_radius_is_the_plain_rectangle() {
    let p = round_rect_path(10.0, 20.0, 100.0, 50.0, 0.0);
    let els: Vec<PathEl> = p.elements().to_vec();
    assert_eq!(
        els,
        vec![
            PathEl::MoveTo(Point::new(10.0, 20.0)),
            PathEl::LineTo(Point::new(110.0, 20.0)),
            PathEl::LineTo(Point::new(110.0, 70.0)),
            PathEl::LineTo(Point::new(10.0, 70.0)),
            PathEl::LineTo(Point::new(10.0, 20.0)),
            PathEl::ClosePath,
        ]
    );
    assert!((p.area().abs() - 5000.0).abs() < 1e-9);
}

#[test]
fn rounded_corners_stay_inside_bounds() {
    let p = round_rect_path(210.0, 400.0, 660.0, 54.0, 12.0);
    assert_rect_close(p.bounding_box(), Rect::new(210.0, 400.0, 870.0, 454.0));
    assert!(p.elements().iter().any(|e| matches!(e, PathEl::CurveTo(..))));

    let corner_loss = 12.0 * 12.0 * (4.0 - std::f64::consts::PI);
    let expected = 660.0 * 54.0 - corner_loss;
    assert!((p.area().abs() - expected).abs() < 1.0);
}

#[test]
fn oversized_radius_clamps_to_a_pill() {
    let pill = round_rect_path(0.0, 0.0, 100.0, 40.0, 500.0);
    let clamped = round_rect_path(0.0, 0.0, 100.0, 40.0, 20.0);
    assert_eq!(pill, clamped);
    assert_rect_close(pill.bounding_box(), Rect::new(0.0, 0.0, 100.0, 40.0));
}

#[test]
fn negative_and_non_finite_radii_are_square() {
    let square = round_rect_path(1.0, 2.0, 3.0, 4.0, 0.0);
    assert_eq!(round_rect_path(1.0, 2.0, 3.0, 4.0, -5.0), square);
    assert_eq!(round_rect_path(1.0, 2.0, 3.0, 4.0, f64::NAN), square);
}

#[test]
fn path_starts_right_of_top_left_corner() {
    let p = round_rect_path(0.0, 0.0, 80.0, 30.0, 12.0);
    assert_eq!(p.elements()[0], PathEl::MoveTo(Point::new(12.0, 0.0)));
}
