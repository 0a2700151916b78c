use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn percent_px_round_trip() {
    let c = canvas(400, 900);
    let p = PercentPoint::new(25.0, 50.0);
    let px = p.to_px(c);
    assert_eq!(px, Point::new(100.0, 450.0));
    let back = PercentPoint::from_px(px, c);
    assert!((back.x - 25.0).abs() < 1e-9);
    assert!((back.y - 50.0).abs() < 1e-9);
}

#[test]
fn out_of_range_percentages_are_kept() {
    let c = canvas(200, 100);
    let px = PercentPoint::new(-10.0, 150.0).to_px(c);
    assert_eq!(px, Point::new(-20.0, 150.0));
}

#[test]
fn sanitized_repairs_non_finite_only() {
    let p = PercentPoint::new(f64::NAN, 120.0).sanitized(PercentPoint::CENTER);
    assert_eq!(p, PercentPoint::new(50.0, 120.0));
}

#[test]
fn rotation_pivots_on_anchor() {
    let t = anchored_transform(Point::new(100.0, 100.0), 90.0, Vec2::ZERO);
    let anchor = t * Point::ZERO;
    assert!((anchor.x - 100.0).abs() < 1e-9 && (anchor.y - 100.0).abs() < 1e-9);
    let p = t * Point::new(10.0, 0.0);
    assert!((p.x - 100.0).abs() < 1e-9);
    assert!((p.y - 110.0).abs() < 1e-9);
}

#[test]
fn base_image_covers_canvas_at_unit_zoom() {
    let c = canvas(400, 900);
    let t = base_image_transform(100, 100, c, 1.0, PercentPoint::default());
    let tl = t * Point::ZERO;
    let br = t * Point::new(100.0, 100.0);
    assert!(tl.x <= 0.0 && tl.y <= 0.0);
    assert!(br.x >= 400.0 && br.y >= 900.0);
    let center = t * Point::new(50.0, 50.0);
    assert!((center.x - 200.0).abs() < 1e-9 && (center.y - 450.0).abs() < 1e-9);
}

#[test]
fn zoom_is_anchored_at_canvas_center_and_position_shifts() {
    let c = canvas(200, 200);
    let t = base_image_transform(200, 200, c, 2.0, PercentPoint::new(10.0, 0.0));
    let center = t * Point::new(100.0, 100.0);
    assert!((center.x - 120.0).abs() < 1e-9);
    assert!((center.y - 100.0).abs() < 1e-9);
}

#[test]
fn zoom_sanitizing() {
    assert_eq!(sanitize_zoom(f64::NAN), 1.0);
    assert_eq!(sanitize_zoom(-2.0), 1.0);
    assert_eq!(sanitize_zoom(0.01), MIN_ZOOM);
    assert_eq!(sanitize_zoom(9.0), MAX_ZOOM);
    assert_eq!(sanitize_zoom(1.5), 1.5);
}
