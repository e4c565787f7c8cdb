//! Font loading for card text.

use ab_glyph::FontVec;
use std::path::{Path, PathBuf};

use super::card::CardError;

/// Well-known locations of fonts with CJK coverage, tried in order.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\msyhbd.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

/// A loaded font face used to draw card text.
pub struct CardFont {
    font: FontVec,
    path: PathBuf,
}

impl CardFont {
    /// Loads the first face of a font file or collection.
    pub fn load(path: &Path) -> Result<Self, CardError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CardError::Font(path.display().to_string(), e.to_string()))?;
        let font = FontVec::try_from_vec_and_index(bytes, 0)
            .map_err(|e| CardError::Font(path.display().to_string(), e.to_string()))?;
        tracing::debug!("Loaded card font {}", path.display());
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Loads `explicit` if given, otherwise the first system font found.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, CardError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in SYSTEM_FONTS.iter().map(Path::new) {
            if !candidate.exists() {
                continue;
            }
            match Self::load(candidate) {
                Ok(font) => return Ok(font),
                Err(e) => tracing::warn!("Skipping font: {}", e),
            }
        }

        Err(CardError::FontNotFound)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn inner(&self) -> &FontVec {
        &self.font
    }
}

/// Font for render tests: `PROCURE_TEST_FONT`, then the system CJK fonts,
/// then any common Latin font. Glyph coverage does not matter to layout.
#[cfg(test)]
pub(crate) fn test_font() -> CardFont {
    const FALLBACK_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    if let Some(path) = std::env::var_os("PROCURE_TEST_FONT") {
        return CardFont::load(Path::new(&path)).expect("PROCURE_TEST_FONT is not a usable font");
    }
    if let Ok(font) = CardFont::discover(None) {
        return font;
    }
    FALLBACK_FONTS
        .iter()
        .map(Path::new)
        .find_map(|p| CardFont::load(p).ok())
        .expect("no font found for render tests; set PROCURE_TEST_FONT to a TTF/OTF file")
}

impl std::fmt::Debug for CardFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardFont").field("path", &self.path).finish()
    }
}
