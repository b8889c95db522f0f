use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = decode_image(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 2);
    assert_eq!(img.rgba8_premul().len(), 3 * 2 * 4);
    assert_eq!(
        &img.rgba8_premul()[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn transparent_pixels_zero_their_color() {
    let img = decode_image(&png_bytes(1, 1, [9, 9, 9, 0])).unwrap();
    assert_eq!(img.rgba8_premul(), &[0, 0, 0, 0]);
}

#[test]
fn non_image_bytes_are_decode_errors() {
    let err = decode_image(b"hello, this is text").unwrap_err();
    assert!(matches!(err, CaptionError::Decode(_)));

    let mut truncated = png_bytes(8, 8, [1, 2, 3, 255]);
    truncated.truncate(truncated.len() / 2);
    assert!(matches!(
        decode_image(&truncated),
        Err(CaptionError::Decode(_))
    ));
}

#[test]
fn oversized_input_is_rejected_before_decode() {
    let bytes = png_bytes(4, 4, [1, 2, 3, 255]);
    let limit = bytes.len() as u64 - 1;
    match decode_image_with_limit(&bytes, limit) {
        Err(CaptionError::ImageTooLarge { len, limit: l }) => {
            assert_eq!(len, bytes.len() as u64);
            assert_eq!(l, limit);
        }
        other => panic!("expected ImageTooLarge, got {other:?}"),
    }
    decode_image_with_limit(&bytes, bytes.len() as u64).unwrap();
}

#[test]
fn from_rgba8_validates_shape() {
    assert!(SourceImage::from_rgba8(0, 1, vec![]).is_err());
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 4]).is_err());
    let img = SourceImage::from_rgba8(1, 1, vec![1, 2, 3, 255]).unwrap();
    assert!(img.clone().shares_pixels_with(&img));
    let other = SourceImage::from_rgba8(1, 1, vec![1, 2, 3, 255]).unwrap();
    assert!(!other.shares_pixels_with(&img));
}
