use super::*;
use crate::foundation::core::Rgba8Premul;

fn gradient(w: u32, h: u32) -> Raster {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
        }
    }
    Raster::from_premul(w, h, data).unwrap()
}

#[test]
fn no_crop_keeps_image() {
    let src = gradient(8, 8);
    assert_eq!(apply_crop(&src, None, 10.0).unwrap(), src);
    assert_eq!(apply_crop(&src, Some(CropRect::FULL), 10.0).unwrap(), src);
}

#[test]
fn quarter_crop_of_200_square_is_100_square() {
    let src = gradient(200, 200);
    let out = apply_crop(&src, Some(CropRect::new(10.0, 10.0, 50.0, 50.0)), 10.0).unwrap();
    assert_eq!((out.width, out.height), (100, 100));
    assert_eq!(out.pixel(0, 0).unwrap(), [20, 20, 0, 255]);
    assert_eq!(out.pixel(99, 99).unwrap(), [119, 119, 0, 255]);
}

#[test]
fn degenerate_crop_is_raised_to_minimum() {
    let src = gradient(100, 50);
    let out = apply_crop(&src, Some(CropRect::new(50.0, 50.0, 0.0, 0.0)), 10.0).unwrap();
    assert_eq!((out.width, out.height), (10, 5));
}

#[test]
fn empty_source_is_geometry_error() {
    let src = Raster::filled(0, 0, Rgba8Premul::transparent()).unwrap();
    let err = apply_crop(&src, Some(CropRect::new(0.0, 0.0, 50.0, 50.0)), 10.0).unwrap_err();
    assert!(matches!(err, crate::foundation::error::PadError::Geometry(_)));
}
