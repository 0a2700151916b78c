use std::collections::BTreeMap;

use anyhow::Context;

use crate::foundation::{
    core::Canvas,
    error::{PadError, PadResult},
};

/// Physical product line a design is printed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    Mousepad,
    RgbMousepad,
    Playmat,
}

impl ProductType {
    /// Only products with an illuminated edge render the RGB border.
    pub fn supports_rgb(self) -> bool {
        matches!(self, Self::RgbMousepad)
    }
}

/// Named physical size (`"400x900"`) to output pixel dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductSizeTable {
    sizes: BTreeMap<String, Canvas>,
}

const STANDARD_SIZES: &[(&str, u32, u32)] = &[
    ("250x210", 250, 210),
    ("300x250", 300, 250),
    ("350x300", 350, 300),
    ("400x900", 400, 900),
    ("450x400", 450, 400),
    ("600x300", 600, 300),
    ("610x350", 610, 350),
    ("700x300", 700, 300),
    ("800x300", 800, 300),
    ("800x400", 800, 400),
    ("900x400", 900, 400),
    ("1000x500", 1000, 500),
    ("1200x600", 1200, 600),
];

impl Default for ProductSizeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProductSizeTable {
    pub fn standard() -> Self {
        let sizes = STANDARD_SIZES
            .iter()
            .map(|&(name, width, height)| (name.to_owned(), Canvas { width, height }))
            .collect();
        Self { sizes }
    }

    /// Parse `{"<name>": {"width": w, "height": h}, ...}`.
    pub fn from_json(json: &str) -> PadResult<Self> {
        let raw: BTreeMap<String, Canvas> = serde_json::from_str(json)?;
        let mut sizes = BTreeMap::new();
        for (name, c) in raw {
            let canvas = Canvas::new(c.width, c.height)
                .map_err(|e| PadError::validation(format!("product size \"{name}\": {e}")))?;
            sizes.insert(name, canvas);
        }
        if sizes.is_empty() {
            return Err(PadError::validation("product size table is empty"));
        }
        Ok(Self { sizes })
    }

    pub fn from_path(path: &std::path::Path) -> PadResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read product size table {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn lookup(&self, name: &str) -> PadResult<Canvas> {
        self.sizes
            .get(name.trim())
            .copied()
            .ok_or_else(|| PadError::validation(format!("unknown product size \"{name}\"")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/products.rs"]
mod tests;
