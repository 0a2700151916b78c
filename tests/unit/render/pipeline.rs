use std::io::Cursor;

use super::*;
use crate::{
    geometry::crop::CropRect,
    scene::{
        layer_state::{LogoElement, RgbEffect, RgbMode, TextElement},
        products::ProductType,
    },
};

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> ImageSource {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::inline("image/png", &buf)
}

fn assert_near(px: Option<[u8; 4]>, want: [u8; 4]) {
    let px = px.expect("pixel in bounds");
    for (a, b) in px.iter().zip(want) {
        assert!((i32::from(*a) - i32::from(b)).abs() <= 1, "{px:?} != {want:?}");
    }
}

fn state(w: u32, h: u32) -> LayerState {
    LayerState {
        base_image: Some(solid_png(8, 8, [255, 0, 0, 255])),
        canvas_size: Canvas {
            width: w,
            height: h,
        },
        ..LayerState::default()
    }
}

#[test]
fn solid_base_covers_canvas() {
    let mut c = Compositor::new(RenderSettings::default());
    let out = c.render(&state(40, 90)).unwrap();
    assert!(!out.placeholder);
    assert!(out.skipped.is_empty());
    assert_eq!((out.raster.width, out.raster.height), (40, 90));
    for (x, y) in [(0, 0), (20, 45), (39, 89)] {
        assert_near(out.raster.pixel(x, y), [255, 0, 0, 255]);
    }
}

#[test]
fn missing_base_renders_placeholder() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(10, 10);
    s.base_image = None;
    let out = c.render(&s).unwrap();
    assert!(out.placeholder);
    assert_eq!(out.skipped[0].layer, LayerKind::Base);
    assert_eq!(out.raster.pixel(5, 5), Some([229, 231, 235, 255]));
}

#[test]
fn undecodable_base_renders_placeholder() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(10, 10);
    s.base_image = Some(ImageSource::inline("image/png", b"definitely not a png"));
    let out = c.render(&s).unwrap();
    assert!(out.placeholder);
}

#[test]
fn broken_template_is_skipped() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(20, 20);
    s.template_overlay = Some(ImageSource::new("https://example.invalid/template.png"));
    let out = c.render(&s).unwrap();
    assert!(!out.placeholder);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].layer, LayerKind::Template);
    assert_near(out.raster.pixel(10, 10), [255, 0, 0, 255]);
}

#[test]
fn text_without_fonts_is_skipped_not_fatal() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(20, 20);
    s.text_elements.push(TextElement::new("HELLO"));
    s.text_elements.push(TextElement::new("   "));
    let out = c.render(&s).unwrap();
    assert_eq!(
        out.skipped.iter().map(|l| l.layer).collect::<Vec<_>>(),
        vec![LayerKind::Text(0)]
    );
}

#[test]
fn half_brightness_darkens_white() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(16, 16);
    s.base_image = Some(solid_png(4, 4, [255, 255, 255, 255]));
    s.adjustments.brightness = 50.0;
    let out = c.render(&s).unwrap();
    let px = out.raster.pixel(8, 8).unwrap();
    for ch in &px[..3] {
        assert!((i32::from(*ch) - 127).abs() <= 1, "{px:?}");
    }
    assert_eq!(px[3], 255);
}

#[test]
fn crop_rebases_working_raster() {
    let c = Compositor::new(RenderSettings::default());
    let mut s = state(10, 10);
    s.base_image = Some(solid_png(200, 200, [0, 0, 255, 255]));
    s.crop_area = Some(CropRect::new(10.0, 10.0, 50.0, 50.0));
    let r = c.working_raster(&s).unwrap();
    assert_eq!((r.width, r.height), (100, 100));
}

#[test]
fn rgb_border_respects_product_support() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(50, 50);
    s.rgb_effect = Some(RgbEffect {
        mode: RgbMode::Static,
        color: crate::scene::color::Color::rgb(0, 255, 0),
        brightness_percent: 100.0,
    });

    s.product_type = Some(ProductType::Playmat);
    let plain = c.render(&s).unwrap();
    assert_near(plain.raster.pixel(0, 0), [255, 0, 0, 255]);

    s.product_type = Some(ProductType::RgbMousepad);
    let lit = c.render(&s).unwrap();
    assert_eq!(lit.raster.pixel(0, 0), Some([0, 255, 0, 255]));
    assert_near(lit.raster.pixel(25, 25), [255, 0, 0, 255]);
}

#[test]
fn invalid_output_size_is_rejected() {
    let mut c = Compositor::new(RenderSettings::default());
    let err = c
        .render_at(
            &state(10, 10),
            Canvas {
                width: 0,
                height: 10,
            },
        )
        .unwrap_err();
    assert!(matches!(err, PadError::Validation(_)));
}

#[test]
fn persisted_canvas_size_is_clamped_not_rejected() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(10, 10);
    s.canvas_size = Canvas {
        width: 0,
        height: 12,
    };
    let out = c.render(&s).unwrap();
    assert_eq!((out.raster.width, out.raster.height), (1, 12));

    s.canvas_size = Canvas {
        width: 20_000,
        height: 2,
    };
    let out = c.render(&s).unwrap();
    assert_eq!(
        (out.raster.width, out.raster.height),
        (crate::foundation::core::MAX_CANVAS_DIM, 2)
    );
}

#[test]
fn oversized_svg_logo_is_skipped() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="blue"/></svg>"#;
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(2000, 1000);
    s.logo_elements.push(LogoElement {
        source: ImageSource::inline("image/svg+xml", svg),
        width_percent: 900.0,
        ..LogoElement::default()
    });
    s.logo_elements.push(LogoElement {
        source: ImageSource::inline("image/svg+xml", svg),
        width_percent: 10.0,
        ..LogoElement::default()
    });

    let out = c.render(&s).unwrap();
    assert!(!out.placeholder);
    assert_eq!(
        out.skipped.iter().map(|l| l.layer).collect::<Vec<_>>(),
        vec![LayerKind::Logo(0)]
    );
    assert_near(out.raster.pixel(1000, 500), [0, 0, 255, 255]);
    assert_near(out.raster.pixel(10, 10), [255, 0, 0, 255]);
}

#[test]
fn rainbow_border_runs_through_the_spectrum() {
    let mut c = Compositor::new(RenderSettings::default());
    let mut s = state(300, 60);
    s.base_image = Some(solid_png(4, 4, [0, 0, 0, 255]));
    s.rgb_effect = Some(RgbEffect {
        mode: RgbMode::Rainbow,
        brightness_percent: 100.0,
        ..RgbEffect::default()
    });
    let out = c.render(&s).unwrap();

    let close = |px: [u8; 4], want: [u8; 3]| {
        px[..3].iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 8)
    };
    let left = out.raster.pixel(0, 1).unwrap();
    let third = out.raster.pixel(100, 1).unwrap();
    assert!(close(left, [255, 0, 0]), "{left:?}");
    assert!(close(third, [0, 255, 0]), "{third:?}");
    assert_near(out.raster.pixel(150, 30), [0, 0, 0, 255]);
}
