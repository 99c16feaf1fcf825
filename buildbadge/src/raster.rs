// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! SVG to PNG conversion.

use std::sync::Arc;

use tracing::debug;
use usvg::fontdb::Database;

use crate::error::Error;

/// Largest raster edge accepted, in pixels.
const MAX_DIMENSION: u32 = 16_384;

/// Raster output parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Device pixels per SVG user unit.
    pub scale: f32
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0
        }
    }
}

/// Converts badge markup into PNG bytes.
///
/// Text is shaped with the font database shared with the metrics provider,
/// so the raster uses the same faces that were measured.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb:  Arc<Database>,
    options: RasterOptions
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("faces", &self.fontdb.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Rasterizer {
    /// Creates a rasterizer drawing text from `fontdb`.
    pub fn new(fontdb: Arc<Database>) -> Self {
        Self {
            fontdb,
            options: RasterOptions::default()
        }
    }

    /// Replaces the raster options.
    pub fn with_options(mut self, options: RasterOptions) -> Self {
        self.options = options;
        self
    }

    /// Renders `svg` to a PNG image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rasterization`] when the markup cannot be parsed, the
    /// image size is empty or too large, or PNG encoding fails.
    pub fn rasterize(&self, svg: &str) -> Result<Vec<u8>, Error> {
        let scale = self.options.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::rasterization(format!("invalid raster scale {scale}")));
        }

        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|error| Error::rasterization(format!("invalid badge markup: {error}")))?;

        let size = tree.size();
        let width = pixels(size.width() * scale)?;
        let height = pixels(size.height() * scale)?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::rasterization("failed to allocate pixmap"))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut()
        );

        let png = pixmap
            .encode_png()
            .map_err(|error| Error::rasterization(format!("failed to encode png: {error}")))?;
        debug!(width, height, bytes = png.len(), "rasterized badge");
        Ok(png)
    }
}

fn pixels(value: f32) -> Result<u32, Error> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::rasterization("badge has an empty canvas"));
    }
    let rounded = value.ceil() as u32;
    if rounded > MAX_DIMENSION {
        return Err(Error::rasterization(format!(
            "raster edge of {rounded}px exceeds the {MAX_DIMENSION}px limit"
        )));
    }
    Ok(rounded.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    const SHAPES: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="25" height="20" fill="#555"/><rect x="25" width="15" height="20" fill="#4c1"/></svg>"##;

    fn rasterizer() -> Rasterizer {
        Rasterizer::new(Arc::new(Database::new()))
    }

    fn dimensions(png: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (width, height)
    }

    #[test]
    fn renders_png_with_badge_dimensions() {
        let png = rasterizer().rasterize(SHAPES).expect("expected rasterization");
        assert_eq!(png[..8], PNG_SIGNATURE);
        assert_eq!(dimensions(&png), (40, 20));
    }

    #[test]
    fn scale_multiplies_dimensions() {
        let png = rasterizer()
            .with_options(RasterOptions {
                scale: 2.0
            })
            .rasterize(SHAPES)
            .expect("expected rasterization");
        assert_eq!(dimensions(&png), (80, 40));
    }

    #[test]
    fn identical_markup_gives_identical_bytes() {
        let first = rasterizer().rasterize(SHAPES).expect("expected rasterization");
        let second = rasterizer().rasterize(SHAPES).expect("expected rasterization");
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_markup_is_rejected() {
        let error = rasterizer()
            .rasterize("<svg><rect")
            .expect_err("expected rasterization error");
        match error {
            Error::Rasterization {
                message
            } => assert!(message.contains("invalid badge markup")),
            other => panic!("expected rasterization error, got {other:?}")
        }
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        for scale in [0.0, -1.0, f32::NAN] {
            let result = rasterizer()
                .with_options(RasterOptions {
                    scale
                })
                .rasterize(SHAPES);
            assert!(matches!(result, Err(Error::Rasterization { .. })), "{scale}");
        }
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20000" height="10"/>"#;
        let result = rasterizer().rasterize(svg);
        assert!(matches!(result, Err(Error::Rasterization { .. })));
    }
}
