use super::*;

const CLEAR: PremulRgba8 = [0, 0, 0, 0];
const RED: PremulRgba8 = [255, 0, 0, 255];
const BLUE: PremulRgba8 = [0, 0, 255, 255];
const HALF_GREEN: PremulRgba8 = [0, 128, 0, 128];

#[test]
fn source_over_basics() {
    assert_eq!(composite(BLUE, CLEAR, CompositeMode::SourceOver), BLUE);
    assert_eq!(composite(BLUE, RED, CompositeMode::SourceOver), RED);
    assert_eq!(composite(CLEAR, HALF_GREEN, CompositeMode::SourceOver), HALF_GREEN);
    assert_eq!(
        composite(BLUE, HALF_GREEN, CompositeMode::SourceOver),
        [0, 128, 127, 255]
    );
}

#[test]
fn source_in_keeps_source_only_where_destination_has_coverage() {
    assert_eq!(composite(BLUE, RED, CompositeMode::SourceIn), RED);
    assert_eq!(composite(CLEAR, RED, CompositeMode::SourceIn), CLEAR);
    assert_eq!(composite([0, 0, 64, 128], RED, CompositeMode::SourceIn), [128, 0, 0, 128]);
    // A transparent layer pixel clears the destination.
    assert_eq!(composite(BLUE, CLEAR, CompositeMode::SourceIn), CLEAR);
}

#[test]
fn destination_over_paints_behind() {
    assert_eq!(composite(BLUE, RED, CompositeMode::DestinationOver), BLUE);
    assert_eq!(composite(CLEAR, RED, CompositeMode::DestinationOver), RED);
    assert_eq!(
        composite(HALF_GREEN, RED, CompositeMode::DestinationOver),
        [127, 128, 0, 255]
    );
    assert_eq!(composite(HALF_GREEN, CLEAR, CompositeMode::DestinationOver), HALF_GREEN);
}

#[test]
fn in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(composite_in_place(&mut dst, &[0u8; 4], CompositeMode::SourceOver).is_err());
    let mut odd = vec![0u8; 6];
    assert!(composite_in_place(&mut odd, &[0u8; 6], CompositeMode::SourceOver).is_err());
}

#[test]
fn in_place_applies_mode_per_pixel() {
    let mut dst = [BLUE, CLEAR].concat();
    let src = [RED, RED].concat();
    composite_in_place(&mut dst, &src, CompositeMode::SourceIn).unwrap();
    assert_eq!(dst, [RED, CLEAR].concat());
}

#[test]
fn modes_deserialize_kebab_case() {
    let m: CompositeMode = serde_json::from_str("\"destination-over\"").unwrap();
    assert_eq!(m, CompositeMode::DestinationOver);
    assert_eq!(CompositeMode::default(), CompositeMode::SourceOver);
}
