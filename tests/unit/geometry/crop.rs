use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn to_pixels_maps_percentages_exactly() {
    let r = CropRect::new(10.0, 10.0, 50.0, 50.0);
    assert_eq!(r.to_pixels(200, 200).unwrap(), (20, 20, 100, 100));
}

#[test]
fn to_pixels_stays_inside_image() {
    let r = CropRect::new(99.9, 0.0, 50.0, 100.0);
    let (x, _, w, _) = r.to_pixels(10, 10).unwrap();
    assert!(x + w <= 10);
    assert!(w >= 1);
    assert!(CropRect::FULL.to_pixels(0, 10).is_err());
}

#[test]
fn clamped_enforces_minimum_and_bounds() {
    let r = CropRect::new(95.0, -5.0, 1.0, 300.0).clamped(10.0);
    assert!(approx(r.width, 10.0));
    assert!(approx(r.x, 90.0));
    assert!(approx(r.y, 0.0));
    assert!(approx(r.height, 100.0));
}

#[test]
fn clamped_repairs_non_finite() {
    let r = CropRect::new(f64::NAN, 0.0, 10.0, 10.0).clamped(10.0);
    assert_eq!(r, CropRect::FULL);
}

#[test]
fn rebase_point_maps_into_crop_space() {
    let r = CropRect::new(10.0, 10.0, 50.0, 50.0);
    let p = r.rebase_point(PercentPoint::new(35.0, 10.0));
    assert!(approx(p.x, 50.0));
    assert!(approx(p.y, 0.0));
}

#[test]
fn hit_test_prefers_handles_then_interior() {
    let r = CropRect::new(20.0, 20.0, 40.0, 40.0);
    assert_eq!(
        hit_test(Some(&r), PercentPoint::new(20.5, 19.5), 2.0),
        CropMode::Resize(CropHandle::NorthWest)
    );
    assert_eq!(
        hit_test(Some(&r), PercentPoint::new(60.0, 40.0), 2.0),
        CropMode::Resize(CropHandle::East)
    );
    assert_eq!(
        hit_test(Some(&r), PercentPoint::new(40.0, 30.0), 2.0),
        CropMode::Move
    );
    assert_eq!(
        hit_test(Some(&r), PercentPoint::new(5.0, 5.0), 2.0),
        CropMode::Select
    );
    assert_eq!(
        hit_test(None, PercentPoint::new(40.0, 30.0), 2.0),
        CropMode::Select
    );
}

#[test]
fn move_keeps_size_and_clamps_to_bounds() {
    let r = CropRect::new(20.0, 20.0, 40.0, 40.0);
    let drag = CropDrag::begin(Some(r), PercentPoint::new(40.0, 40.0), 2.0, 10.0);
    assert_eq!(drag.mode, CropMode::Move);
    let moved = drag.update(PercentPoint::new(100.0, 45.0));
    assert!(approx(moved.x, 60.0));
    assert!(approx(moved.y, 25.0));
    assert!(approx(moved.width, 40.0));
    assert!(approx(moved.height, 40.0));
}

#[test]
fn resize_keeps_opposite_edges_and_minimum() {
    let r = CropRect::new(20.0, 20.0, 40.0, 40.0);
    let drag = CropDrag::begin(Some(r), PercentPoint::new(60.0, 60.0), 2.0, 10.0);
    assert_eq!(drag.mode, CropMode::Resize(CropHandle::SouthEast));

    let grown = drag.update(PercentPoint::new(70.0, 65.0));
    assert!(approx(grown.x, 20.0) && approx(grown.y, 20.0));
    assert!(approx(grown.width, 50.0) && approx(grown.height, 45.0));

    let collapsed = drag.update(PercentPoint::new(0.0, 0.0));
    assert!(approx(collapsed.x, 20.0) && approx(collapsed.y, 20.0));
    assert!(approx(collapsed.width, 10.0) && approx(collapsed.height, 10.0));
}

#[test]
fn edge_handle_only_moves_one_edge() {
    let r = CropRect::new(20.0, 20.0, 40.0, 40.0);
    let drag = CropDrag::begin(Some(r), PercentPoint::new(20.0, 40.0), 2.0, 10.0);
    assert_eq!(drag.mode, CropMode::Resize(CropHandle::West));
    let out = drag.update(PercentPoint::new(-30.0, 90.0));
    assert!(approx(out.x, 0.0));
    assert!(approx(out.right(), 60.0));
    assert!(approx(out.y, 20.0) && approx(out.height, 40.0));
}

#[test]
fn select_normalizes_direction_and_minimum() {
    let drag = CropDrag::begin(None, PercentPoint::new(80.0, 80.0), 2.0, 10.0);
    assert_eq!(drag.mode, CropMode::Select);
    let r = drag.update(PercentPoint::new(30.0, 20.0));
    assert!(approx(r.x, 30.0) && approx(r.y, 20.0));
    assert!(approx(r.width, 50.0) && approx(r.height, 60.0));

    let tiny = drag.update(PercentPoint::new(81.0, 81.0));
    assert!(approx(tiny.width, 10.0) && approx(tiny.height, 10.0));
}
