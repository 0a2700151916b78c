use super::*;
use crate::{assets::decode::decode_image, foundation::core::Rgba8Premul};

#[test]
fn png_round_trips_exact_pixels() {
    let mut r = Raster::new_transparent(3, 2).unwrap();
    r.data[0..4].copy_from_slice(&[255, 0, 0, 255]);
    r.data[4..8].copy_from_slice(&[0, 64, 0, 128]);
    let enc = encode_raster(&r, OutputFormat::Png, 95).unwrap();
    assert_eq!(&enc.bytes[1..4], b"PNG");
    let back = decode_image(&enc.bytes).unwrap();
    assert_eq!(back.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(back.pixel(2, 1), Some([0, 0, 0, 0]));
    assert_eq!(back.pixel(1, 0).map(|p| p[3]), Some(128));
}

#[test]
fn jpeg_is_flattened_over_white() {
    let r = Raster::new_transparent(16, 16).unwrap();
    let enc = encode_raster(&r, OutputFormat::Jpeg, 95).unwrap();
    assert_eq!(&enc.bytes[0..2], &[0xFF, 0xD8]);
    let back = decode_image(&enc.bytes).unwrap();
    let px = back.pixel(8, 8).unwrap();
    assert!(px.iter().all(|c| *c >= 250), "{px:?}");
}

#[test]
fn data_url_carries_mime() {
    let r = Raster::filled(1, 1, Rgba8Premul::from_straight_rgba(1, 2, 3, 255)).unwrap();
    let url = encode_raster(&r, OutputFormat::Png, 95)
        .unwrap()
        .to_data_url();
    assert!(url.starts_with("data:image/png;base64,"));
    let url = encode_raster(&r, OutputFormat::Jpeg, 95)
        .unwrap()
        .to_data_url();
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[test]
fn empty_raster_is_an_encode_error() {
    let r = Raster::new_transparent(0, 0).unwrap();
    assert!(matches!(
        encode_raster(&r, OutputFormat::Png, 95),
        Err(PadError::Encode(_))
    ));
}

#[test]
fn format_from_path() {
    use std::path::Path;
    assert_eq!(
        OutputFormat::from_path(Path::new("a/out.JPEG")),
        Some(OutputFormat::Jpeg)
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("out.png")),
        Some(OutputFormat::Png)
    );
    assert_eq!(OutputFormat::from_path(Path::new("out.gif")), None);
}
