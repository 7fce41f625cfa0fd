use serde_json::json;

use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const YELLOW: [u8; 4] = [255, 255, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn canvas() -> Canvas {
    Canvas::new(200, 200).unwrap()
}

fn config(overlay: bool) -> TemplateConfig {
    let mask = if overlay { "mask.png" } else { "pattern.png" };
    serde_json::from_value(json!({
        "urls": {
            "design_pattern": "pattern.png",
            "mask": mask,
            "stroke": "stroke.png",
            "subject": "subject.png"
        },
        "image_mask": { "x": 20, "y": 100, "width": 160, "height": 80 },
        "caption": { "text": "hello there", "position": { "x": 0, "y": 0 }, "font_size": 20 },
        "cta": { "text": "Go", "position": { "x": 10, "y": 40 }, "font_size": 16 }
    }))
    .unwrap()
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> Arc<DecodedImage> {
    Arc::new(DecodedImage::from_premul_rgba8(w, h, px.repeat((w * h) as usize)).unwrap())
}

/// 4x4 tile: left two columns opaque red, right two transparent.
fn striped_tile() -> Arc<DecodedImage> {
    let row = [RED, RED, CLEAR, CLEAR].concat();
    Arc::new(DecodedImage::from_premul_rgba8(4, 4, row.repeat(4)).unwrap())
}

/// Mask-sized subject: left half opaque green, right half transparent.
fn half_subject() -> Arc<DecodedImage> {
    let row = [GREEN.repeat(80), CLEAR.repeat(80)].concat();
    Arc::new(DecodedImage::from_premul_rgba8(160, 80, row.repeat(80)).unwrap())
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
}

fn assets(overlay: bool) -> RenderAssets {
    RenderAssets {
        pattern: Ok(striped_tile()),
        subject: Ok(half_subject()),
        stroke: Ok(solid(8, 4, BLUE)),
        mask_overlay: overlay.then(|| Ok(solid(2, 2, YELLOW))),
        font: None,
    }
}

fn render(config: &TemplateConfig, assets: &RenderAssets) -> (Surface, RenderReport) {
    let mut surface = Surface::new(canvas()).unwrap();
    let report = CompositionEngine::new()
        .compose(config, assets, &mut surface)
        .unwrap();
    (surface, report)
}

#[test]
fn plan_follows_the_layer_table() {
    let ops = CompositionEngine::plan(&config(true), canvas());
    let seq: Vec<(Layer, CompositeMode)> = ops.iter().map(|o| (o.layer, o.mode)).collect();
    assert_eq!(
        seq,
        vec![
            (Layer::Background, CompositeMode::SourceOver),
            (Layer::Pattern, CompositeMode::SourceOver),
            (Layer::Subject, CompositeMode::SourceIn),
            (Layer::Stroke, CompositeMode::DestinationOver),
            (Layer::CtaButton, CompositeMode::SourceOver),
            (Layer::CtaText, CompositeMode::SourceOver),
            (Layer::Caption, CompositeMode::SourceOver),
            (Layer::MaskOverlay, CompositeMode::SourceOver),
        ]
    );

    let without = CompositionEngine::plan(&config(false), canvas());
    assert_eq!(without.len(), 7);
    assert!(without.iter().all(|o| o.layer != Layer::MaskOverlay));
}

#[test]
fn plan_positions_cta_and_caption() {
    let ops = CompositionEngine::plan(&config(false), canvas());
    let OpKind::RoundRect { rect, radius, .. } = &ops[4].kind else {
        panic!("expected cta button");
    };
    assert_eq!(*rect, Rect::new(30.0, 40.0, 170.0, 80.0));
    assert_eq!(*radius, 12.0);

    let OpKind::Text {
        lines, alignment, ..
    } = &ops[5].kind
    else {
        panic!("expected cta text");
    };
    assert_eq!(*alignment, Alignment::Center);
    assert_eq!((lines[0].x, lines[0].baseline), (100.0, 68.0));

    let OpKind::Text { lines, .. } = &ops[6].kind else {
        panic!("expected caption");
    };
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "hello there ");
    assert_eq!((lines[0].x, lines[0].baseline), (20.0, 20.0));
}

#[test]
fn subject_alpha_clips_and_stroke_fills_behind() {
    let (s, report) = render(&config(false), &assets(false));

    // Inside the mask: the subject where it is opaque, the stroke behind its transparent half.
    assert!(close(s.pixel(40, 140), GREEN));
    assert!(close(s.pixel(150, 140), BLUE));
    // Source-in clears everything the subject does not cover.
    assert_eq!(s.pixel(5, 5), CLEAR);
    assert_eq!(s.pixel(100, 190), CLEAR);
    // CTA button sits on top in black.
    assert_eq!(s.pixel(100, 60), [0, 0, 0, 255]);

    assert_eq!(
        report.drawn,
        vec![
            Layer::Background,
            Layer::Pattern,
            Layer::Subject,
            Layer::Stroke,
            Layer::CtaButton,
        ]
    );
    assert_eq!(report.defects.len(), 2);
    assert_eq!(
        report.defect(Layer::CtaText).map(|d| d.reason.as_str()),
        Some("no font configured")
    );
    assert!(report.defect(Layer::Caption).is_some());
}

#[test]
fn overlay_covers_the_mask_region_last() {
    let (s, report) = render(&config(true), &assets(true));
    assert!(close(s.pixel(40, 140), YELLOW));
    assert!(close(s.pixel(150, 140), YELLOW));
    assert_eq!(s.pixel(19, 140), CLEAR);
    assert_eq!(report.drawn.last(), Some(&Layer::MaskOverlay));
}

#[test]
fn failed_assets_skip_only_their_layer() {
    let mut a = assets(false);
    a.subject = Err(LoadError::Http { status: 404 });
    let (s, report) = render(&config(false), &a);

    let d = report.defect(Layer::Subject).unwrap();
    assert!(d.reason.contains("404"), "{}", d.reason);
    assert!(report.was_drawn(Layer::Stroke));
    assert!(report.was_drawn(Layer::CtaButton));

    // Without the clip, the pattern stays: red where tiled, background elsewhere.
    assert_eq!(s.pixel(40, 140), RED);
    assert_eq!(s.pixel(5, 5), RED);
    let bg = Color::from_hex("#9D5748").unwrap().to_rgba8_premul().to_array();
    assert_eq!(s.pixel(6, 5), bg);
}

#[test]
fn failed_pattern_leaves_background_for_the_clip() {
    let mut a = assets(false);
    a.pattern = Err(LoadError::Timeout);
    let (s, report) = render(&config(false), &a);
    assert_eq!(report.defect(Layer::Pattern).unwrap().reason, "timed out");
    // The background alone is enough coverage for the clip.
    assert!(close(s.pixel(42, 140), GREEN));
    assert_eq!(s.pixel(5, 5), CLEAR);
}

#[test]
fn font_load_failure_is_reported_on_both_text_layers() {
    let mut a = assets(false);
    a.font = Some(Err(LoadError::Io("missing".into())));
    let (_, report) = render(&config(false), &a);
    for layer in [Layer::CtaText, Layer::Caption] {
        assert!(report.defect(layer).unwrap().reason.contains("missing"));
    }
}

#[test]
fn invalid_config_fails_before_drawing() {
    let mut cfg = config(false);
    cfg.image_mask.width = 0.0;
    let mut surface = Surface::new(canvas()).unwrap();
    surface.fill(crate::Rgba8Premul::from_straight_rgba(1, 2, 3, 255));
    let before = surface.clone();

    let err = CompositionEngine::new()
        .compose(&cfg, &assets(false), &mut surface)
        .unwrap_err();
    assert!(matches!(err, crate::AdframeError::Validation(_)));
    assert_eq!(surface, before);
}

#[test]
fn composing_twice_is_deterministic() {
    let cfg = config(true);
    let a = assets(true);
    let (first, r1) = render(&cfg, &a);
    let (second, r2) = render(&cfg, &a);
    assert_eq!(first, second);
    assert_eq!(r1, r2);

    // Reusing a dirty surface gives the same pixels.
    let mut dirty = Surface::new(canvas()).unwrap();
    dirty.fill(crate::Rgba8Premul::from_straight_rgba(9, 9, 9, 255));
    CompositionEngine::new().compose(&cfg, &a, &mut dirty).unwrap();
    assert_eq!(dirty, first);
}
