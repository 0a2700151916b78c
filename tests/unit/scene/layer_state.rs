use super::*;
use serde_json::json;

fn sample() -> LayerState {
    LayerState {
        base_image: Some(ImageSource::new("uploads/photo.png")),
        adjustments: Adjustments {
            brightness: 120.0,
            contrast: 90.0,
            saturation: 150.0,
            blur: 2.0,
        },
        filter: FilterId::Vintage,
        crop_area: Some(CropRect::new(10.0, 10.0, 50.0, 50.0)),
        zoom: 1.5,
        position: PercentPoint::new(-5.0, 3.0),
        template_overlay: Some(ImageSource::new("templates/frame.png")),
        logo_elements: vec![LogoElement {
            source: ImageSource::new("logos/brand.svg"),
            height_percent: Some(10.0),
            ..LogoElement::default()
        }],
        text_elements: vec![TextElement {
            text: "GG".to_owned(),
            bold: true,
            shadow: TextShadow {
                enabled: true,
                ..TextShadow::default()
            },
            gradient: TextGradient {
                enabled: true,
                direction: GradientDirection::Diagonal,
                ..TextGradient::default()
            },
            ..TextElement::new("GG")
        }],
        rgb_effect: Some(RgbEffect {
            mode: RgbMode::Breathing,
            ..RgbEffect::default()
        }),
        canvas_size: Canvas {
            width: 800,
            height: 300,
        },
        product_type: Some(ProductType::RgbMousepad),
    }
}

#[test]
fn config_json_round_trips_every_field() {
    let s = sample();
    let json = s.to_config_json().unwrap();
    let back = LayerState::from_config_json(&json).unwrap();
    assert_eq!(back, s);
}

#[test]
fn serializes_camel_case_names() {
    let v = sample().to_config_value().unwrap();
    assert_eq!(v["filter"], json!("vintage"));
    assert_eq!(v["cropArea"]["width"], json!(50.0));
    assert_eq!(v["textElements"][0]["fontSizePx"], json!(48.0));
    assert_eq!(v["rgbEffect"]["mode"], json!("breathing"));
    assert_eq!(v["productType"], json!("rgb-mousepad"));
}

#[test]
fn accepts_legacy_short_names() {
    let s = LayerState::from_config_value(json!({
        "baseImage": "a.png",
        "filterId": "high-contrast",
        "textElements": [{
            "text": "HELLO", "x": 50, "y": 50, "fontSize": 72,
            "color": "#000000", "rotation": 0, "opacity": 100
        }],
        "rgbEffect": {"mode": "static", "color": "#ff00ff", "brightness": 40}
    }))
    .unwrap();
    assert_eq!(s.filter, FilterId::HighContrast);
    let t = &s.text_elements[0];
    assert_eq!(t.font_size_px, 72.0);
    assert_eq!(t.opacity_percent, 100.0);
    assert_eq!(s.rgb_effect.unwrap().brightness_percent, 40.0);
    assert_eq!(s.zoom, 1.0);
    assert!(s.adjustments.is_neutral());
}

#[test]
fn empty_object_is_default_design() {
    let s = LayerState::from_config_json("{}").unwrap();
    assert_eq!(s, LayerState::default());
    assert!(s.base_image.is_none());
}

#[test]
fn bad_json_is_serde_error() {
    let err = LayerState::from_config_json(r#"{"zoom": "big"}"#).unwrap_err();
    assert!(matches!(err, PadError::Serde(_)));
}

#[test]
fn sanitize_reclamps_corrupt_values() {
    let mut s = sample();
    s.adjustments.brightness = 900.0;
    s.adjustments.blur = f64::NAN;
    s.zoom = -2.0;
    s.crop_area = Some(CropRect::new(95.0, -5.0, 1.0, 300.0));
    s.text_elements[0].opacity_percent = 250.0;
    s.text_elements[0].x_percent = f64::INFINITY;
    s.rgb_effect = Some(RgbEffect {
        brightness_percent: -10.0,
        ..RgbEffect::default()
    });

    let c = s.sanitized(10.0);
    assert_eq!(c.adjustments.brightness, 200.0);
    assert_eq!(c.adjustments.blur, 0.0);
    assert_eq!(c.zoom, 1.0);
    assert_eq!(c.crop_area, Some(CropRect::new(90.0, 0.0, 10.0, 100.0)));
    assert_eq!(c.text_elements[0].opacity_percent, 100.0);
    assert_eq!(c.text_elements[0].x_percent, 50.0);
    assert_eq!(c.rgb_effect.unwrap().brightness_percent, 0.0);
}

#[test]
fn rgb_border_depends_on_product() {
    let mut s = sample();
    assert!(s.rgb_border_enabled());
    s.product_type = Some(ProductType::Playmat);
    assert!(!s.rgb_border_enabled());
    s.product_type = None;
    assert!(s.rgb_border_enabled());
    s.rgb_effect = None;
    assert!(!s.rgb_border_enabled());
}

#[test]
fn logo_height_follows_aspect_when_missing() {
    let logo = LogoElement {
        width_percent: 50.0,
        ..LogoElement::default()
    };
    let canvas = Canvas {
        width: 400,
        height: 200,
    };
    // 2:1 logo at half the canvas width is 200x100 px, i.e. 50% of the height.
    let size = logo.size(2.0, canvas);
    assert_eq!(size.width, 50.0);
    assert!((size.height - 50.0).abs() < 1e-9);
}

#[test]
fn validate_leaves_canvas_to_clamping() {
    let s = LayerState::from_config_value(json!({"canvasSize": {"width": 0, "height": 900}}))
        .unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(
        s.sanitized(10.0).canvas_size,
        Canvas {
            width: 1,
            height: 900
        }
    );

    let mut long = LayerState::default();
    long.text_elements.push(TextElement::new("a".repeat(10_001)));
    assert!(matches!(long.validate(), Err(PadError::Validation(_))));
}
