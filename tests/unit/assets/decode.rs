use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, vec![100u8, 50u8, 200u8, 128u8]);

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_a_decode_error() {
    let err = decode_image(b"definitely not a png").unwrap_err();
    assert!(matches!(err, LoadError::Decode(_)));
}

#[test]
fn pixel_reads_are_bounds_checked() {
    let img = DecodedImage::from_premul_rgba8(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(img.pixel(1, 0), [5, 6, 7, 8]);
    assert_eq!(img.pixel(2, 0), [0, 0, 0, 0]);
    assert!(DecodedImage::from_premul_rgba8(2, 2, vec![0; 4]).is_err());
    assert!(DecodedImage::from_premul_rgba8(0, 2, vec![]).is_err());
}
