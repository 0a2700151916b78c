use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PadError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PadError::decode("x").to_string().contains("decode error:"));
    assert!(
        PadError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(PadError::encode("x").to_string().contains("encode error:"));
    assert!(
        PadError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PadError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: PadError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, PadError::Serde(_)));
    assert!(!err.is_decode());
    assert!(PadError::decode("bad png").is_decode());
}
