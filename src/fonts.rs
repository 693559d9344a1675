//! Font faces embedded into the rendered page.

use base64::{prelude::BASE64_STANDARD, Engine};
use serde::Serialize;

use std::{
    error::Error as StdError,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Font files loaded by [`FontSet::load()`]: family, weight and path relative to the fonts dir.
const BUNDLED_FACES: &[(&str, u16, &str)] = &[
    ("Inter", 400, "Inter-Regular.woff2"),
    ("Inter", 700, "Inter-Bold.woff2"),
    ("Vera", 400, "Vera-Mono.woff2"),
    ("Noto Sans JP", 700, "Noto_Sans_JP/NotoSansJP-Bold.woff2"),
    ("Noto Sans JP", 500, "Noto_Sans_JP/NotoSansJP-Medium.woff2"),
    ("Noto Sans JP", 300, "Noto_Sans_JP/NotoSansJP-Light.woff2"),
];

/// Error loading a font file.
#[derive(Debug)]
pub struct FontLoadError {
    path: PathBuf,
    source: io::Error,
}

impl FontLoadError {
    /// Returns the path to the font file that could not be loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for FontLoadError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Cannot load font file `{}`: {}",
            self.path.display(),
            self.source
        )
    }
}

impl StdError for FontLoadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

/// Single face of an embedded font. Corresponds to a single `@font-face` CSS rule
/// with a data URL `src`.
#[derive(Clone, Serialize)]
pub struct FontFace {
    /// Family name of the font, e.g. `Inter`.
    pub family: String,
    /// Numeric `font-weight` selector, e.g. 400 for regular or 700 for bold faces.
    pub weight: u16,
    /// `font-style` selector.
    pub style: &'static str,
    /// MIME type of the font data, e.g. `font/woff2`.
    pub mime_type: &'static str,
    /// CSS format hint for the `src` descriptor, e.g. `woff2`.
    pub format: &'static str,
    /// Font data encoded in base64.
    pub base64_data: String,
}

// Make `Debug` representation shorter.
impl fmt::Debug for FontFace {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .field("mime_type", &self.mime_type)
            .field("base64_data.len", &self.base64_data.len())
            .finish()
    }
}

impl FontFace {
    /// Creates a normal-style face based on the provided WOFF2 font data.
    pub fn woff2(family: impl Into<String>, weight: u16, data: &[u8]) -> Self {
        Self {
            family: family.into(),
            weight,
            style: "normal",
            mime_type: "font/woff2",
            format: "woff2",
            base64_data: BASE64_STANDARD.encode(data),
        }
    }
}

/// Immutable collection of [`FontFace`]s embedded into every rendered page.
///
/// The set is cheap to clone; clones share the encoded font data.
#[derive(Debug, Clone)]
pub struct FontSet {
    faces: Arc<[FontFace]>,
}

impl FontSet {
    /// Loads the bundled fonts from `fonts_dir`. The directory must contain the following files:
    ///
    /// - `Inter-Regular.woff2`, `Inter-Bold.woff2`
    /// - `Vera-Mono.woff2`
    /// - `Noto_Sans_JP/NotoSansJP-{Bold,Medium,Light}.woff2`
    ///
    /// # Errors
    ///
    /// Returns an error if any of the font files is missing or cannot be read.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, err, fields(fonts_dir = ?fonts_dir.as_ref()))
    )]
    pub fn load(fonts_dir: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let fonts_dir = fonts_dir.as_ref();
        let faces = BUNDLED_FACES
            .iter()
            .map(|&(family, weight, file_name)| {
                let path = fonts_dir.join(file_name);
                let data = fs::read(&path).map_err(|source| FontLoadError { path, source })?;
                #[cfg(feature = "tracing")]
                tracing::debug!(family, weight, file_name, len = data.len(), "loaded font face");
                Ok(FontFace::woff2(family, weight, &data))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_faces(faces))
    }

    /// Creates a set from the provided faces.
    pub fn from_faces(faces: Vec<FontFace>) -> Self {
        Self {
            faces: faces.into(),
        }
    }

    /// Returns faces in this set in the order of their `@font-face` rules.
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }
}
