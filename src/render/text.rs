use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use thiserror::Error;

use super::raster::CoverageMask;
use crate::editor::tools::TextPlacement;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font file {path} is not a usable font")]
    Invalid { path: PathBuf },
}

/// Font faces keyed by lowercase family name.
///
/// Lookups fall back to the first face registered when the requested family
/// is missing, so a single configured font still renders every text action.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: HashMap<String, FontArc>,
    fallback: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families = self.faces.keys().collect::<Vec<_>>();
        families.sort();
        f.debug_struct("FontBook")
            .field("families", &families)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every configured `family -> path` entry, skipping the ones that fail.
    pub fn from_paths(paths: &HashMap<String, PathBuf>) -> Self {
        let mut book = Self::new();
        let mut entries = paths.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (family, path) in entries {
            match load_font_file(path) {
                Ok(font) => book.insert(family, font),
                Err(err) => tracing::warn!(%family, "skipping font: {err}"),
            }
        }
        if book.is_empty() {
            tracing::warn!("no fonts loaded; text annotations will not be rendered");
        }
        book
    }

    pub fn insert(&mut self, family: &str, font: FontArc) {
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.faces.insert(family.to_ascii_lowercase(), font);
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face(&self, family: &str) -> Option<&FontArc> {
        self.faces
            .get(&family.trim().to_ascii_lowercase())
            .or(self.fallback.as_ref())
    }
}

pub fn load_font_file(path: &Path) -> Result<FontArc, FontError> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| FontError::Invalid {
        path: path.to_path_buf(),
    })
}

/// Rasterizes `text` into `mask`, one line per `\n`, starting at the
/// alphabetic baseline given by the placement origin.
pub(crate) fn rasterize_text(mask: &mut CoverageMask, font: &FontArc, text: &TextPlacement) {
    let font_size = text.font_size as f32;
    let scaled = font.as_scaled(font_size);
    let line_height = scaled.height() + scaled.line_gap();
    let origin_x = text.origin.x as f32;

    for (line_index, line) in text.lines().enumerate() {
        let baseline = text.origin.y as f32 + line_index as f32 * line_height;
        let mut cursor_x = origin_x;
        let mut previous: Option<GlyphId> = None;
        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(font_size, point(cursor_x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    mask.plot(
                        (bounds.min.x as i64) + i64::from(x),
                        (bounds.min.y as i64) + i64::from(y),
                        coverage,
                    );
                });
            }
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_book_has_no_face() {
        let book = FontBook::new();
        assert!(book.is_empty());
        assert!(book.face("sans-serif").is_none());
    }

    #[test]
    fn missing_font_files_are_skipped() {
        let mut paths = HashMap::new();
        paths.insert(
            "sans-serif".to_string(),
            std::env::temp_dir().join("smartkit-annotate-missing-font.ttf"),
        );
        let book = FontBook::from_paths(&paths);
        assert!(book.is_empty());
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let path = std::env::temp_dir().join("smartkit-annotate-not-a-font.ttf");
        std::fs::write(&path, b"definitely not a font").expect("write temp file");
        let result = load_font_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(FontError::Invalid { .. })));
    }
}
