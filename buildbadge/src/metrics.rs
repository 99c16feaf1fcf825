// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Text measurement backed by real glyph metrics.
//!
//! [`FontMetrics`] resolves families through the same font database the
//! rasterizer uses and sums horizontal advances (plus legacy `kern` pairs)
//! read from the font tables. Face data is cached per face id, so repeated
//! measurements do not re-read font files.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock}
};

use tracing::{debug, warn};
use usvg::fontdb::{Database, Family, ID, Query};

use crate::{config::DEFAULT_FONT_FACE, error::Error};

/// Width of a measured string and the family that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMeasure {
    /// Advance width in pixels.
    pub width:  f32,
    /// Family name of the face actually used, which differs from the
    /// requested face after a fallback.
    pub family: String
}

/// Measures rendered text width.
///
/// Implementations must be deterministic for a given backend and never
/// return a smaller width when characters are appended.
pub trait TextMetrics: Send + Sync {
    /// Measures `text` rendered with `font_face` at `font_size` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenderBackend`] when neither the requested face nor
    /// any fallback face can be resolved.
    fn measure(&self, text: &str, font_face: &str, font_size: u32) -> Result<TextMeasure, Error>;
}

#[derive(Clone)]
struct FaceData {
    bytes: Arc<[u8]>,
    index: u32
}

/// Glyph-metrics backend built on a shared font database.
pub struct FontMetrics {
    fontdb: Arc<Database>,
    faces:  RwLock<HashMap<ID, FaceData>>
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("faces", &self.fontdb.len())
            .finish_non_exhaustive()
    }
}

impl FontMetrics {
    /// Wraps an existing font database.
    pub fn new(fontdb: Arc<Database>) -> Self {
        Self {
            fontdb,
            faces: RwLock::new(HashMap::new())
        }
    }

    /// Loads the system fonts plus every font file found in `fonts_dir`.
    pub fn system(fonts_dir: Option<&Path>) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        debug!(faces = db.len(), "font database loaded");
        Self::new(Arc::new(db))
    }

    /// Returns the shared font database handle.
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.fontdb)
    }

    /// Returns `true` when the database holds no face at all.
    pub fn is_empty(&self) -> bool {
        self.fontdb.is_empty()
    }

    /// Resolves `font_face` to a face id, falling back to the default face,
    /// the generic sans-serif family and finally any loaded face.
    fn resolve_face(&self, font_face: &str) -> Result<ID, Error> {
        if let Some(id) = self.query(Family::Name(font_face)) {
            return Ok(id);
        }

        let fallback = self
            .query(Family::Name(DEFAULT_FONT_FACE))
            .or_else(|| self.query(Family::SansSerif))
            .or_else(|| self.fontdb.faces().next().map(|face| face.id));
        match fallback {
            Some(id) => {
                warn!(requested = font_face, "font face not found, using fallback face");
                Ok(id)
            }
            None => Err(Error::render_backend(format!(
                "font face '{font_face}' is unavailable and no fallback face is installed"
            )))
        }
    }

    fn query(&self, family: Family<'_>) -> Option<ID> {
        let families = [family];
        self.fontdb.query(&Query {
            families: &families,
            ..Query::default()
        })
    }

    fn family_name(&self, id: ID) -> String {
        self.fontdb
            .face(id)
            .and_then(|info| info.families.first())
            .map_or_else(|| DEFAULT_FONT_FACE.to_owned(), |(name, _)| name.clone())
    }

    fn face_data(&self, id: ID) -> Result<FaceData, Error> {
        if let Ok(cache) = self.faces.read()
            && let Some(data) = cache.get(&id)
        {
            return Ok(data.clone());
        }

        let data = self
            .fontdb
            .with_face_data(id, |bytes, index| FaceData {
                bytes: Arc::from(bytes),
                index
            })
            .ok_or_else(|| Error::render_backend("font face data could not be loaded"))?;

        if let Ok(mut cache) = self.faces.write() {
            cache.insert(id, data.clone());
        }
        Ok(data)
    }
}

impl TextMetrics for FontMetrics {
    fn measure(&self, text: &str, font_face: &str, font_size: u32) -> Result<TextMeasure, Error> {
        let id = self.resolve_face(font_face)?;
        let data = self.face_data(id)?;
        let face = ttf_parser::Face::parse(&data.bytes, data.index)
            .map_err(|error| Error::render_backend(format!("failed to parse font face: {error}")))?;

        let units = advance_units(&face, text);
        let scale = font_size as f32 / f32::from(face.units_per_em().max(1));

        Ok(TextMeasure {
            width:  units as f32 * scale,
            family: self.family_name(id)
        })
    }
}

/// Sums horizontal advances in font units.
///
/// Each character contributes its advance plus the kerning against the
/// previous glyph, clamped at zero so the running total never shrinks.
fn advance_units(face: &ttf_parser::Face<'_>, text: &str) -> u64 {
    let mut total = 0_u64;
    let mut previous: Option<ttf_parser::GlyphId> = None;

    for character in text.chars() {
        let glyph = face.glyph_index(character).unwrap_or(ttf_parser::GlyphId(0));
        let advance = i64::from(face.glyph_hor_advance(glyph).unwrap_or(0));
        let kerning = previous.map_or(0, |left| i64::from(kerning(face, left, glyph)));
        total += (advance + kerning).max(0) as u64;
        previous = Some(glyph);
    }

    total
}

fn kerning(face: &ttf_parser::Face<'_>, left: ttf_parser::GlyphId, right: ttf_parser::GlyphId) -> i16 {
    let Some(table) = face.tables().kern else {
        return 0;
    };
    table
        .subtables
        .into_iter()
        .filter(|subtable| subtable.horizontal && !subtable.variable)
        .find_map(|subtable| subtable.glyphs_kerning(left, right))
        .unwrap_or(0)
}

fn load_fonts_from_dir(db: &mut Database, dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        warn!(dir = %dir.display(), "fonts directory is not readable");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(extension) = path.extension().and_then(|value| value.to_str()) else {
            continue;
        };
        if !matches!(extension.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc") {
            continue;
        }
        if let Err(error) = db.load_font_file(&path) {
            warn!(path = %path.display(), %error, "failed to load font file");
        }
    }
}
