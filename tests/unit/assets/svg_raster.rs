use super::*;
use crate::assets::decode::parse_svg;

const RED_SQUARE: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
<rect x="0" y="0" width="10" height="10" fill="#ff0000"/></svg>"##;

#[test]
fn params_follow_drawn_scale() {
    let tree = parse_svg(RED_SQUARE).unwrap();
    let (w, h, adjust) = svg_raster_params(&tree, Affine::scale_non_uniform(4.0, 2.0)).unwrap();
    assert_eq!((w, h), (40, 20));
    let c = adjust.as_coeffs();
    assert!((c[0] - 1.0).abs() < 1e-9);
    assert!((c[3] - 1.0).abs() < 1e-9);
}

#[test]
fn oversized_raster_is_rejected() {
    let tree = parse_svg(RED_SQUARE).unwrap();
    assert!(svg_raster_params(&tree, Affine::scale(10_000.0)).is_err());
}

#[test]
fn rasterizes_filled_rect() {
    let tree = parse_svg(RED_SQUARE).unwrap();
    let r = rasterize_svg(&tree, 20, 20).unwrap();
    assert_eq!(r.pixel(10, 10).unwrap(), [255, 0, 0, 255]);
}
