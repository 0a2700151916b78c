use std::io::Cursor;

use super::*;
use crate::assets::source::InlineOnly;

/// White 6x6 with a black 2x2 square in the middle.
fn template_png() -> ImageSource {
    let img = image::RgbaImage::from_fn(6, 6, |x, y| {
        if (2..4).contains(&x) && (2..4).contains(&y) {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::inline("image/png", &buf)
}

#[test]
fn background_becomes_transparent() {
    let cache = BackgroundCache::new();
    let r = template_raster(&cache, &template_png(), &InlineOnly, 30.0).unwrap();
    assert_eq!(r.pixel(0, 0).map(|p| p[3]), Some(0));
    assert_eq!(r.pixel(2, 2), Some([0, 0, 0, 255]));
}

#[test]
fn repeated_preparation_hits_cache() {
    let cache = BackgroundCache::new();
    let src = template_png();
    let a = template_raster(&cache, &src, &InlineOnly, 30.0).unwrap();
    let b = template_raster(&cache, &src, &InlineOnly, 30.0).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
}

#[test]
fn prepared_template_is_inline_png() {
    let cache = BackgroundCache::new();
    let out = prepare_template_in(&cache, &template_png(), &InlineOnly, 30.0);
    assert!(out.as_str().starts_with("data:image/png;base64,"));
    let bytes = out.load(&InlineOnly).unwrap();
    let r = decode_to_raster(&bytes, false).unwrap();
    assert_eq!(r.pixel(5, 5).map(|p| p[3]), Some(0));
}

#[test]
fn unloadable_template_is_returned_unchanged() {
    let cache = BackgroundCache::new();
    let src = ImageSource::new("templates/missing.png");
    let out = prepare_template_in(&cache, &src, &InlineOnly, 30.0);
    assert_eq!(out, src);
    assert!(cache.is_empty());
}
