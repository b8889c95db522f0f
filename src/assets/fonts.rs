use std::{path::Path, sync::Arc};

use anyhow::Context;
use usvg::fontdb;

use crate::foundation::error::{CaptionError, CaptionResult};

/// Preferred family for all rendered text; any sans-serif face is the fallback.
pub const PREFERRED_FAMILY: &str = "Microsoft YaHei";

/// One font face: raw font file bytes plus the face index inside them.
#[derive(Clone)]
pub struct FontFace {
    family: String,
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Faces used by the raster surface: bold for subtitles, regular for watermarks.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub bold: FontFace,
    pub regular: FontFace,
}

impl FontSet {
    /// Use a single font file for both roles.
    ///
    /// Subtitles then render with that file's own weight. Nothing emboldens the face, so pass a
    /// bold file through [`FontSet::from_files`] when subtitles should be heavier than watermarks.
    pub fn from_file(path: &Path) -> CaptionResult<Self> {
        Self::from_files(path, None)
    }

    /// Regular face from `regular`, bold face from `bold` or from `regular` when absent.
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> CaptionResult<Self> {
        let regular = read_font_file(regular)?;
        let bold = bold.map(read_font_file).transpose()?;
        Self::from_face_bytes(regular, bold)
    }

    /// Single font for both roles. See [`FontSet::from_file`] for the weight caveat.
    pub fn from_bytes(bytes: Vec<u8>) -> CaptionResult<Self> {
        Self::from_face_bytes(bytes, None)
    }

    pub fn from_face_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> CaptionResult<Self> {
        let regular = face_from_bytes(regular)?;
        let bold = match bold {
            Some(bytes) => face_from_bytes(bytes)?,
            None => regular.clone(),
        };
        Ok(Self { bold, regular })
    }

    /// Resolve faces from the system font database.
    pub fn system() -> CaptionResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");

        let bold = query_face(&db, fontdb::Weight::BOLD)?;
        let regular = query_face(&db, fontdb::Weight::NORMAL)?;
        Ok(Self { bold, regular })
    }

    /// Explicit font files when given, system fonts otherwise.
    ///
    /// A bold file without a regular one replaces only the system bold face.
    pub fn resolve(regular: Option<&Path>, bold: Option<&Path>) -> CaptionResult<Self> {
        match (regular, bold) {
            (Some(regular), bold) => Self::from_files(regular, bold),
            (None, Some(bold)) => {
                let mut set = Self::system()?;
                set.bold = face_from_bytes(read_font_file(bold)?)?;
                Ok(set)
            }
            (None, None) => Self::system(),
        }
    }
}

fn read_font_file(path: &Path) -> CaptionResult<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read font file '{}'", path.display()))?;
    Ok(bytes)
}

fn face_from_bytes(bytes: Vec<u8>) -> CaptionResult<FontFace> {
    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.clone());
    let face = db
        .faces()
        .next()
        .ok_or_else(|| CaptionError::font("font data contains no usable faces"))?;
    Ok(FontFace {
        family: primary_family(face),
        bytes: Arc::new(bytes),
        index: face.index,
    })
}

fn primary_family(face: &fontdb::FaceInfo) -> String {
    face.families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn query_face(db: &fontdb::Database, weight: fontdb::Weight) -> CaptionResult<FontFace> {
    let families = [
        fontdb::Family::Name(PREFERRED_FAMILY),
        fontdb::Family::SansSerif,
    ];
    let query = fontdb::Query {
        families: &families,
        weight,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| CaptionError::font("no system fonts found"))?;
    let family = db
        .face(id)
        .map(primary_family)
        .unwrap_or_else(|| "unknown".to_string());
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| CaptionError::font(format!("could not read face data for '{family}'")))?;

    Ok(FontFace {
        family,
        bytes: Arc::new(bytes),
        index,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
