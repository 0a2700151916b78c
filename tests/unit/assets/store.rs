use std::io::Cursor;

use super::*;
use crate::assets::source::InlineOnly;

fn png_source(w: u32, h: u32) -> ImageSource {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::inline("image/png", &buf)
}

#[test]
fn same_source_is_decoded_once() {
    let mut store = PreparedAssetStore::new();
    let src = png_source(3, 2);
    let a = store.load(&src, &InlineOnly).unwrap();
    let b = store.load(&src, &InlineOnly).unwrap();
    assert_eq!(a, b);
    assert_eq!(store.len(), 1);
    assert_eq!(store.image_size(a).unwrap(), (3.0, 2.0));
}

#[test]
fn inline_svg_is_prepared_as_svg() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"></svg>"#;
    let mut store = PreparedAssetStore::new();
    let id = store
        .load(&ImageSource::inline("image/svg+xml", svg), &InlineOnly)
        .unwrap();
    assert!(matches!(store.get(id).unwrap(), PreparedAsset::Svg(_)));
    assert_eq!(store.image_size(id).unwrap(), (8.0, 4.0));
}

#[test]
fn broken_source_fails_without_polluting_store() {
    let mut store = PreparedAssetStore::new();
    let err = store
        .load(&ImageSource::new("data:image/png;base64,AAAA"), &InlineOnly)
        .unwrap_err();
    assert!(err.is_decode());
    assert!(store.is_empty());
    assert!(store.get(AssetId(0)).is_err());
}
