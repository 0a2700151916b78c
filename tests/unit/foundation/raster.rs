use super::*;

fn quadrants(size: u32) -> Raster {
    let mut data = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let left = x < size / 2;
            let top = y < size / 2;
            let px = match (left, top) {
                (true, true) => [255, 0, 0, 255],
                (false, true) => [0, 255, 0, 255],
                (true, false) => [0, 0, 255, 255],
                (false, false) => [255, 255, 255, 255],
            };
            data.extend_from_slice(&px);
        }
    }
    Raster::from_straight_rgba8(size, size, data).unwrap()
}

#[test]
fn filled_raster_has_uniform_pixels() {
    let r = Raster::filled(3, 2, Rgba8Premul::from_straight_rgba(10, 20, 30, 255)).unwrap();
    assert_eq!(r.data.len(), 24);
    assert_eq!(r.pixel(2, 1), Some([10, 20, 30, 255]));
    assert_eq!(r.pixel(3, 0), None);
}

#[test]
fn from_premul_checks_length() {
    assert!(Raster::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_premul(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn sub_rect_copies_exact_region() {
    let r = quadrants(4);
    let tr = r.sub_rect(2, 0, 2, 2).unwrap();
    assert_eq!((tr.width, tr.height), (2, 2));
    assert!(tr.data.chunks_exact(4).all(|px| px == [0, 255, 0, 255]));
}

#[test]
fn sub_rect_rejects_out_of_bounds_and_empty() {
    let r = quadrants(4);
    assert!(matches!(
        r.sub_rect(3, 0, 2, 1),
        Err(PadError::Geometry(_))
    ));
    assert!(r.sub_rect(0, 0, 0, 1).is_err());
}

#[test]
fn straight_pixel_unpremultiplies() {
    let r = Raster::from_straight_rgba8(1, 1, vec![200, 100, 0, 128]).unwrap();
    let px = r.straight_pixel(0, 0).unwrap();
    assert!((i32::from(px[0]) - 200).abs() <= 2);
    assert_eq!(px[3], 128);
}
