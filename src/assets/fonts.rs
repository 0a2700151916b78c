use std::{
    borrow::Cow,
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::foundation::error::{PadError, PadResult};

/// One concrete font face picked for a text element.
#[derive(Clone)]
pub struct FontFace {
    pub family: String,
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    pub bold: bool,
    pub italic: bool,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("bytes", &self.bytes.len())
            .field("index", &self.index)
            .field("bold", &self.bold)
            .field("italic", &self.italic)
            .finish()
    }
}

/// Font families available to text layers.
///
/// Families come from font files (a directory, raw bytes, or the system font set). Lookups take
/// a CSS-style family list and a bold/italic request; a missing family falls back to the default
/// family and then to any loaded face.
pub struct FontBook {
    db: usvg::fontdb::Database,
    default_family: Option<String>,
    resolved: Mutex<HashMap<(String, bool, bool), Option<FontFace>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("default_family", &self.default_family)
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            db: usvg::fontdb::Database::new(),
            default_family: None,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Book seeded with the fonts installed on this machine.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::new();
        book.db.load_system_fonts();
        book.pick_default_family();
        book
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file directly inside `dir`. Returns the number of files
    /// that were read.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let Ok(rd) = std::fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "font directory not readable");
            return 0;
        };

        let mut paths: Vec<_> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .and_then(|s| s.to_str())
                    .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
                    .unwrap_or(false)
            })
            .collect();
        // Load order decides fallbacks; keep it independent of directory iteration order.
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.db.load_font_file(&path) {
                Ok(()) => loaded += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font file"),
            }
        }
        self.pick_default_family();
        self.invalidate();
        loaded
    }

    pub fn add_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.pick_default_family();
        self.invalidate();
    }

    pub fn set_default_family(&mut self, family: impl Into<String>) {
        self.default_family = Some(family.into());
        self.invalidate();
    }

    pub fn default_family(&self) -> Option<&str> {
        self.default_family.as_deref()
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Sorted, de-duplicated family names.
    pub fn families(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .filter_map(|f| f.families.first().map(|(name, _)| name.clone()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Pick a face for a CSS family list such as `"Impact, Arial, sans-serif"`.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> Option<FontFace> {
        let key = (family.trim().to_ascii_lowercase(), bold, italic);
        if let Some(hit) = self.cache().get(&key) {
            return hit.clone();
        }
        let face = self.resolve_uncached(family, bold, italic);
        self.cache().insert(key, face.clone());
        face
    }

    fn resolve_uncached(&self, family: &str, bold: bool, italic: bool) -> Option<FontFace> {
        use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

        let names: Vec<String> = family
            .split(',')
            .map(|s| s.trim().trim_matches(['"', '\'']).to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        let mut families = Vec::<Family<'_>>::new();
        for name in &names {
            families.push(match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" => Family::SansSerif,
                "monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            });
        }
        if let Some(d) = &self.default_family {
            families.push(Family::Name(d));
        }
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if italic { Style::Italic } else { Style::Normal },
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        let info = self.db.face(id)?;
        let face_family = info
            .families
            .first()
            .map(|(n, _)| n.clone())
            .unwrap_or_default();
        let face_bold = info.weight.0 >= 600;
        let face_italic = info.style != Style::Normal;
        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;

        if !names.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(&face_family)) {
            tracing::debug!(requested = family, used = %face_family, "font family fallback");
        }

        Some(FontFace {
            family: face_family,
            bytes: Arc::new(bytes),
            index,
            bold: face_bold,
            italic: face_italic,
        })
    }

    fn pick_default_family(&mut self) {
        if self.default_family.is_some() {
            return;
        }
        const PREFERRED: [&str; 6] = [
            "Arial",
            "Helvetica",
            "Liberation Sans",
            "DejaVu Sans",
            "Noto Sans",
            "Roboto",
        ];
        let families = self.families();
        self.default_family = PREFERRED
            .iter()
            .find(|p| families.iter().any(|f| f.eq_ignore_ascii_case(p)))
            .map(|p| (*p).to_owned())
            .or_else(|| families.first().cloned());
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<(String, bool, bool), Option<FontFace>>> {
        self.resolved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn invalidate(&mut self) {
        self.resolved
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A run of positioned glyphs sharing one font size, in layout space (origin at the top-left of
/// the layout box, y down).
#[derive(Clone, Debug)]
pub struct GlyphRun {
    pub font_size: f32,
    pub glyphs: Vec<vello_cpu::Glyph>,
}

/// Shaped text ready for rasterization.
#[derive(Clone)]
pub struct ShapedText {
    pub font: vello_cpu::peniko::FontData,
    pub runs: Vec<GlyphRun>,
    pub width: f64,
    pub height: f64,
}

impl std::fmt::Debug for ShapedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedText")
            .field("runs", &self.runs.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl ShapedText {
    pub fn glyph_count(&self) -> usize {
        self.runs.iter().map(|r| r.glyphs.len()).sum()
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    registered: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Shape a single paragraph (explicit newlines break lines) with one face and size.
    pub fn shape(&mut self, text: &str, face: &FontFace, size_px: f32) -> PadResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PadError::validation("text size must be finite and > 0"));
        }
        let family_name = self.register(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));
        if face.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        if face.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = run.offset();
                let y = run.baseline();
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .glyphs()
                    .map(|g| {
                        let out = vello_cpu::Glyph {
                            id: g.id,
                            x: x + g.x,
                            y: y - g.y,
                        };
                        x += g.advance;
                        out
                    })
                    .collect();
                if !glyphs.is_empty() {
                    runs.push(GlyphRun {
                        font_size: run.run().font_size(),
                        glyphs,
                    });
                }
            }
        }

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
            face.index,
        );
        Ok(ShapedText {
            font,
            runs,
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
        })
    }

    fn register(&mut self, face: &FontFace) -> PadResult<String> {
        let key = xxhash_rust::xxh3::xxh3_64(face.bytes.as_slice()) ^ u64::from(face.index);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PadError::decode("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PadError::decode("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, name.clone());
        Ok(name)
    }
}

#[cfg(test)]
#[path = "../../tests/common/mod.rs"]
mod local_font;

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
