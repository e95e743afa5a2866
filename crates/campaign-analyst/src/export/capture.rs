//! Raster capture of a rendered view.

use std::sync::Arc;

use image::RgbImage;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::{ExportError, ExportResult};
use crate::render::{View, render_svg};
use crate::theme::Theme;

/// Turns a view into a bitmap.
pub trait Rasterizer: Send + Sync {
    /// Capture `view` under `theme` at `scale` device pixels per CSS pixel,
    /// on an opaque white background.
    fn capture(&self, view: &View, theme: Theme, scale: f32) -> ExportResult<RgbImage>;
}

/// Renders the view's SVG projection with `resvg`.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl SvgRasterizer {
    /// Create a rasterizer using the system fonts.
    #[must_use]
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "Loaded system fonts for capture");
        Self { fontdb: Arc::new(db) }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer").field("faces", &self.fontdb.len()).finish()
    }
}

impl Rasterizer for SvgRasterizer {
    fn capture(&self, view: &View, theme: Theme, scale: f32) -> ExportResult<RgbImage> {
        let svg = render_svg(view, theme);

        let mut options = Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = Tree::from_data(svg.markup.as_bytes(), &options)
            .map_err(|e| ExportError::capture(format!("Failed to parse SVG: {e}")))?;

        let width = (svg.width as f32 * scale).ceil() as u32;
        let height = (svg.height as f32 * scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ExportError::capture(format!("Invalid capture size {width}x{height}")))?;

        pixmap.fill(Color::WHITE);
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        // Opaque background, so premultiplied and straight RGBA agree.
        let rgb: Vec<u8> = pixmap.data().chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect();
        let image = RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| ExportError::capture("Pixel buffer does not match capture size"))?;

        tracing::debug!(width, height, theme = ?theme, "Captured analysis view");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_analysis;
    use crate::render::SVG_WIDTH;

    #[test]
    fn test_capture_is_scaled() {
        let rasterizer = SvgRasterizer { fontdb: Arc::new(fontdb::Database::new()) };
        let view = View::from_cards(&parse_analysis("## Title\nbody"));
        let svg = render_svg(&view, Theme::Light);

        let image = rasterizer.capture(&view, Theme::Light, 2.0).unwrap();
        assert_eq!(image.width(), SVG_WIDTH * 2);
        assert_eq!(image.height(), svg.height * 2);
    }

    #[test]
    fn test_capture_background_is_white() {
        let rasterizer = SvgRasterizer { fontdb: Arc::new(fontdb::Database::new()) };
        for view in [View::NoData, View::from_cards(&parse_analysis("## A\nbody"))] {
            let image = rasterizer.capture(&view, Theme::Light, 2.0).unwrap();
            let (w, h) = image.dimensions();
            for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
                assert_eq!(image.get_pixel(x, y).0, [255, 255, 255], "pixel at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_capture_accepts_control_characters() {
        let rasterizer = SvgRasterizer { fontdb: Arc::new(fontdb::Database::new()) };
        let view = View::from_cards(&parse_analysis("## A\u{7}\nbudget\u{1}spend\n* item\u{0}"));
        assert!(rasterizer.capture(&view, Theme::Light, 1.0).is_ok());
    }
}
