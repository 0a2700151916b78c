use super::*;
use super::local_font::find_local_font;

#[test]
fn empty_book_resolves_nothing() {
    let book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.resolve("Arial", false, false).is_none());
    assert!(book.families().is_empty());
}

#[test]
fn missing_dir_loads_zero_fonts() {
    let mut book = FontBook::new();
    assert_eq!(book.load_dir(Path::new("/definitely/not/here")), 0);
}

#[test]
fn any_family_falls_back_to_loaded_face() {
    let Some(bytes) = find_local_font() else {
        return;
    };
    let mut book = FontBook::new();
    book.add_font_data(bytes);
    assert_eq!(book.face_count(), 1);
    let face = book
        .resolve("Some Family Nobody Has, cursive", false, false)
        .unwrap();
    assert_eq!(Some(face.family.as_str()), book.default_family());
    // Cached lookups hand back the same bytes.
    let again = book
        .resolve("some family nobody has, cursive", false, false)
        .unwrap();
    assert!(Arc::ptr_eq(&face.bytes, &again.bytes));
}

#[test]
fn shaping_produces_glyphs_and_extent() {
    let Some(bytes) = find_local_font() else {
        return;
    };
    let mut book = FontBook::new();
    book.add_font_data(bytes);
    let face = book.resolve("", false, false).unwrap();

    let mut engine = TextLayoutEngine::new();
    let small = engine.shape("HELLO", &face, 24.0).unwrap();
    let large = engine.shape("HELLO", &face, 48.0).unwrap();
    assert_eq!(small.glyph_count(), 5);
    assert!(small.width > 0.0 && small.height > 0.0);
    assert!(large.width > small.width * 1.8);
    assert!(engine.shape("HELLO", &face, 0.0).is_err());
}
