use std::path::{Path, PathBuf};

use base64::Engine;

use crate::foundation::error::{PadError, PadResult};

/// Reference to a raster (or SVG) asset as it appears in a saved design.
///
/// The raw string is kept verbatim so configurations round-trip unchanged. It can be an inline
/// `data:` URL, an `http(s)://` URL or a file path (relative paths resolve against the asset
/// root of a [`FsResolver`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

/// Borrowed, classified view of an [`ImageSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRef<'a> {
    Inline { mime: &'a str, base64: bool, payload: &'a str },
    Remote(&'a str),
    Path(&'a str),
}

impl ImageSource {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Wrap raw bytes as an inline base64 data URL.
    pub fn inline(mime: &str, bytes: &[u8]) -> Self {
        Self(encode_data_url(mime, bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn classify(&self) -> SourceRef<'_> {
        let s = self.0.trim();
        if let Some(rest) = strip_prefix_ci(s, "data:") {
            let (meta, payload) = rest.split_once(',').unwrap_or((rest, ""));
            let (mime, base64) = match meta.strip_suffix(";base64") {
                Some(m) => (m, true),
                None => (meta, false),
            };
            let mime = mime.split(';').next().unwrap_or("");
            return SourceRef::Inline {
                mime,
                base64,
                payload,
            };
        }
        if strip_prefix_ci(s, "http://").is_some() || strip_prefix_ci(s, "https://").is_some() {
            return SourceRef::Remote(s);
        }
        SourceRef::Path(strip_prefix_ci(s, "file://").unwrap_or(s))
    }

    /// Whether the source declares itself as SVG (by MIME type or file extension).
    pub fn looks_like_svg(&self) -> bool {
        match self.classify() {
            SourceRef::Inline { mime, .. } => mime.eq_ignore_ascii_case("image/svg+xml"),
            SourceRef::Remote(p) | SourceRef::Path(p) => {
                let p = p.split(['?', '#']).next().unwrap_or(p);
                p.to_ascii_lowercase().ends_with(".svg")
            }
        }
    }

    /// Fetch the bytes behind this source.
    pub fn load(&self, resolver: &dyn SourceResolver) -> PadResult<Vec<u8>> {
        if self.is_empty() {
            return Err(PadError::decode("image source is empty"));
        }
        match self.classify() {
            SourceRef::Inline {
                base64, payload, ..
            } => {
                if base64 {
                    decode_base64(payload)
                } else {
                    Ok(percent_decode(payload))
                }
            }
            SourceRef::Remote(url) => resolver.fetch_remote(url),
            SourceRef::Path(p) => resolver.fetch_path(p),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.classify() {
            SourceRef::Inline { mime, payload, .. } => {
                write!(f, "data:{mime} ({} bytes encoded)", payload.len())
            }
            _ => f.write_str(&self.0),
        }
    }
}

/// Where non-inline sources come from.
///
/// The crate performs no network I/O. `http://` and `https://` sources reach
/// [`SourceResolver::fetch_remote`], whose default fails with a decode error, so a layer using
/// one is skipped. Embedders that need remote assets override it with their own HTTP client.
pub trait SourceResolver {
    fn fetch_path(&self, path: &str) -> PadResult<Vec<u8>>;

    /// Fetch an `http(s)` URL. Fails unless the implementor overrides it.
    fn fetch_remote(&self, url: &str) -> PadResult<Vec<u8>> {
        Err(PadError::decode(format!(
            "remote source \"{url}\" is not available offline"
        )))
    }
}

/// Resolves only inline data URLs; every path or URL fails to decode.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineOnly;

impl SourceResolver for InlineOnly {
    fn fetch_path(&self, path: &str) -> PadResult<Vec<u8>> {
        Err(PadError::decode(format!(
            "no asset root configured for \"{path}\""
        )))
    }
}

/// Reads relative asset paths below a root directory; absolute paths are read as-is.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceResolver for FsResolver {
    fn fetch_path(&self, path: &str) -> PadResult<Vec<u8>> {
        let p = Path::new(path);
        let full = if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(normalize_rel_path(path)?)
        };
        std::fs::read(&full)
            .map_err(|e| PadError::decode(format!("read asset \"{}\": {e}", full.display())))
    }
}

pub(crate) fn normalize_rel_path(source: &str) -> PadResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(PadError::decode("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PadError::decode("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PadError::decode("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

fn decode_base64(payload: &str) -> PadResult<Vec<u8>> {
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| PadError::decode(format!("invalid base64 payload: {e}")))
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
