use crate::render::shape::round_rect_path;
use crate::text::layout::TextLayoutEngine;

use super::*;

fn setup(w: u32, h: u32) -> (CpuRasterizer, Surface) {
    let canvas = Canvas::new(w, h).unwrap();
    (
        CpuRasterizer::new(canvas).unwrap(),
        Surface::new(canvas).unwrap(),
    )
}

fn solid_image(w: u32, h: u32, px: [u8; 4]) -> DecodedImage {
    DecodedImage::from_premul_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
}

#[test]
fn fill_rect_covers_integer_rect_exactly() {
    let (mut r, mut s) = setup(16, 16);
    r.fill_rect(
        &mut s,
        Rect::new(4.0, 4.0, 12.0, 8.0),
        Color::from_rgb8(255, 0, 0),
        CompositeMode::SourceOver,
    )
    .unwrap();
    assert_eq!(s.pixel(4, 4), [255, 0, 0, 255]);
    assert_eq!(s.pixel(11, 7), [255, 0, 0, 255]);
    assert_eq!(s.pixel(3, 4), [0, 0, 0, 0]);
    assert_eq!(s.pixel(12, 7), [0, 0, 0, 0]);
    assert_eq!(s.pixel(4, 8), [0, 0, 0, 0]);
}

#[test]
fn square_round_rect_matches_rect_fill() {
    let (mut r, mut a) = setup(32, 32);
    let mut b = Surface::new(a.canvas()).unwrap();
    let color = Color::from_rgb8(0, 0, 0);

    r.fill_rect(
        &mut a,
        Rect::new(3.0, 5.0, 27.0, 20.0),
        color,
        CompositeMode::SourceOver,
    )
    .unwrap();
    r.fill_path(
        &mut b,
        &round_rect_path(3.0, 5.0, 24.0, 15.0, 0.0),
        color,
        CompositeMode::SourceOver,
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn rounded_corner_leaves_the_corner_pixel_uncovered() {
    let (mut r, mut s) = setup(64, 64);
    r.fill_path(
        &mut s,
        &round_rect_path(0.0, 0.0, 64.0, 32.0, 12.0),
        Color::WHITE,
        CompositeMode::SourceOver,
    )
    .unwrap();
    assert_eq!(s.pixel(0, 0)[3], 0);
    assert_eq!(s.pixel(32, 16), [255, 255, 255, 255]);
    assert_eq!(s.pixel(32, 0), [255, 255, 255, 255]);
}

#[test]
fn pattern_tiles_from_origin_at_natural_size() {
    let (mut r, mut s) = setup(5, 3);
    // 2x1 tile: red, blue.
    let tile =
        DecodedImage::from_premul_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    r.fill_pattern(&mut s, &tile, CompositeMode::SourceOver).unwrap();
    for y in 0..3 {
        for x in 0..5 {
            let expected = if x % 2 == 0 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 255]
            };
            assert_eq!(s.pixel(x, y), expected, "({x},{y})");
        }
    }
}

#[test]
fn draw_image_scales_into_destination() {
    let (mut r, mut s) = setup(20, 20);
    let img = solid_image(2, 2, [200, 100, 50, 255]);
    r.draw_image(
        &mut s,
        &img,
        Rect::new(5.0, 5.0, 15.0, 10.0),
        CompositeMode::SourceOver,
    )
    .unwrap();
    assert!(close(s.pixel(5, 5), [200, 100, 50, 255]));
    assert!(close(s.pixel(14, 9), [200, 100, 50, 255]));
    assert_eq!(s.pixel(15, 5), [0, 0, 0, 0]);
    assert_eq!(s.pixel(5, 10), [0, 0, 0, 0]);
}

#[test]
fn source_in_clips_to_existing_coverage_and_clears_elsewhere() {
    let (mut r, mut s) = setup(10, 10);
    r.fill_rect(
        &mut s,
        Rect::new(0.0, 0.0, 5.0, 10.0),
        Color::from_rgb8(0, 0, 255),
        CompositeMode::SourceOver,
    )
    .unwrap();
    let img = solid_image(1, 1, [0, 255, 0, 255]);
    r.draw_image(
        &mut s,
        &img,
        Rect::new(2.0, 0.0, 8.0, 10.0),
        CompositeMode::SourceIn,
    )
    .unwrap();

    assert!(close(s.pixel(3, 5), [0, 255, 0, 255]));
    // Destination coverage but no source: cleared.
    assert_eq!(s.pixel(0, 5), [0, 0, 0, 0]);
    // Source but no destination coverage: nothing.
    assert_eq!(s.pixel(6, 5), [0, 0, 0, 0]);
}

#[test]
fn destination_over_fills_only_transparent_pixels() {
    let (mut r, mut s) = setup(10, 10);
    r.fill_rect(
        &mut s,
        Rect::new(0.0, 0.0, 5.0, 10.0),
        Color::from_rgb8(0, 0, 255),
        CompositeMode::SourceOver,
    )
    .unwrap();
    r.fill_rect(
        &mut s,
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Color::from_rgb8(255, 0, 0),
        CompositeMode::DestinationOver,
    )
    .unwrap();
    assert_eq!(s.pixel(2, 2), [0, 0, 255, 255]);
    assert_eq!(s.pixel(7, 2), [255, 0, 0, 255]);
}

#[test]
fn rejects_surfaces_of_another_size() {
    let (mut r, _) = setup(8, 8);
    let mut other = Surface::new(Canvas::new(4, 4).unwrap()).unwrap();
    assert!(
        r.fill_rect(
            &mut other,
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Color::WHITE,
            CompositeMode::SourceOver
        )
        .is_err()
    );
}

#[test]
fn draws_glyphs_above_the_baseline_with_system_font_if_present() {
    let Some(font) = crate::assets::system_font::find_system_font().ok() else {
        return;
    };

    let (mut r, mut s) = setup(200, 80);
    let mut engine = TextLayoutEngine::new();
    let layout = engine
        .layout_line("HH", &font, 40.0, Color::WHITE.into())
        .unwrap();
    r.draw_text(
        &mut s,
        &layout,
        &font_data(&font),
        10.0,
        60.0,
        CompositeMode::SourceOver,
    )
    .unwrap();

    let inked = |y0: u32, y1: u32| {
        (y0..y1).any(|y| (0..200).any(|x| s.pixel(x, y)[3] > 0))
    };
    assert!(inked(30, 60));
    assert!(!inked(62, 80));
    assert!((0..80).all(|y| (0..9).all(|x| s.pixel(x, y)[3] == 0)));
}
