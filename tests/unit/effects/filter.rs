use super::*;

fn solid(rgba: [u8; 4]) -> Raster {
    Raster::from_straight_rgba8(2, 2, rgba.repeat(4)).unwrap()
}

#[test]
fn neutral_design_is_identity_chain() {
    let chain = FilterChain::for_design(&Adjustments::default(), FilterId::None);
    assert!(chain.is_identity());
    assert_eq!(chain.to_css(), "none");
    let src = solid([10, 200, 30, 255]);
    assert_eq!(chain.apply_color(&src), src);
}

#[test]
fn half_brightness_on_white_is_mid_gray() {
    let adj = Adjustments {
        brightness: 50.0,
        ..Adjustments::default()
    };
    let out = FilterChain::for_design(&adj, FilterId::None).apply_color(&solid([255; 4]));
    for px in out.data.chunks_exact(4) {
        for c in &px[..3] {
            assert!((i32::from(*c) - 127).abs() <= 1, "got {c}");
        }
        assert_eq!(px[3], 255);
    }
}

#[test]
fn manual_adjustments_precede_preset() {
    let adj = Adjustments {
        brightness: 120.0,
        blur: 2.0,
        ..Adjustments::default()
    };
    let chain = FilterChain::for_design(&adj, FilterId::Vintage);
    assert_eq!(
        chain.to_css(),
        "brightness(120%) blur(2px) sepia(50%) contrast(120%) brightness(90%)"
    );
    assert!((chain.blur_sigma() - 2.0).abs() < 1e-6);
}

#[test]
fn css_round_trips() {
    let css = "saturate(110%) hue-rotate(-20deg) opacity(80%) blur(1.5px)";
    let chain = FilterChain::parse_css(css).unwrap();
    assert_eq!(chain.ops.len(), 4);
    assert_eq!(chain.to_css(), css);
    assert_eq!(FilterChain::parse_css("none").unwrap(), FilterChain::default());
    assert_eq!(
        FilterChain::parse_css("grayscale(0.5)").unwrap().ops,
        vec![FilterOp::Grayscale(0.5)]
    );
}

#[test]
fn css_parse_errors() {
    assert!(FilterChain::parse_css("wobble(3)").is_err());
    assert!(FilterChain::parse_css("brightness(").is_err());
    assert!(FilterChain::parse_css("brightness(-1)").is_err());
    assert!(FilterChain::parse_css("hue-rotate(30)").is_err());
}

#[test]
fn grayscale_preset_equalizes_channels() {
    let chain = FilterChain::for_design(&Adjustments::default(), FilterId::Grayscale);
    let out = chain.apply_color(&solid([255, 0, 0, 255]));
    let px = out.pixel(0, 0).unwrap();
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert!((i32::from(px[0]) - 54).abs() <= 1);
}

#[test]
fn fade_preset_reduces_alpha() {
    let chain = FilterChain::for_design(&Adjustments::default(), FilterId::Fade);
    let out = chain.apply_color(&solid([100, 100, 100, 255]));
    assert_eq!(out.pixel(0, 0).unwrap()[3], 204);
}

#[test]
fn zero_contrast_is_flat_gray() {
    let adj = Adjustments {
        contrast: 0.0,
        ..Adjustments::default()
    };
    let out = FilterChain::for_design(&adj, FilterId::None).apply_color(&solid([10, 240, 90, 255]));
    let px = out.pixel(1, 1).unwrap();
    for c in &px[..3] {
        assert!((i32::from(*c) - 128).abs() <= 1);
    }
}

#[test]
fn every_preset_has_stable_css() {
    for f in FilterId::ALL {
        let css = FilterChain::for_design(&Adjustments::default(), f).to_css();
        let reparsed = FilterChain::parse_css(&css).unwrap();
        assert_eq!(reparsed.to_css(), css, "{f:?}");
    }
}
