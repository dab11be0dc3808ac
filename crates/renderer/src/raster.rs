//! SVG rasterisation through resvg.

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use tiny_skia::{Pixmap, Transform};
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};
use crate::png::create_png_auto;

/// Parses SVG documents with a loaded font database and draws them onto
/// pixmaps.
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    /// Load system fonts, plus every font under `font_dir` when given.
    ///
    /// Without any font, text elements are skipped when drawing.
    pub fn new(font_dir: Option<&Path>) -> Self {
        let mut options = usvg::Options::default();
        {
            let fontdb = options.fontdb_mut();
            fontdb.load_system_fonts();
            if let Some(dir) = font_dir {
                fontdb.load_fonts_dir(dir);
            }
        }

        let faces = options.fontdb.len();
        if faces == 0 {
            warn!("No font found; chart labels will not be drawn");
        } else {
            debug!(faces, "Loaded fonts for SVG rendering");
        }
        Self {
            fontdb: options.fontdb,
        }
    }

    fn parse(&self, svg: &str) -> RenderResult<usvg::Tree> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Svg(e.to_string()))
    }

    /// Draw `svg` onto a new pixmap of the document's size.
    pub fn render(&self, svg: &str) -> RenderResult<Pixmap> {
        let tree = self.parse(svg)?;
        let size = tree.size().to_int_size();
        let mut pixmap = new_pixmap(size.width(), size.height())?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

/// Allocate a transparent pixmap.
pub fn new_pixmap(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })
}

/// Straight (non-premultiplied) RGBA bytes of a pixmap.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// Encode a pixmap as PNG.
pub fn pixmap_to_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    create_png_auto(
        &pixmap_to_rgba(pixmap),
        pixmap.width() as usize,
        pixmap.height() as usize,
    )
}

/// Convert a pixmap into an `image` buffer for animation encoders.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    RgbaImage::from_raw(width, height, pixmap_to_rgba(pixmap))
        .ok_or(RenderError::InvalidSize { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shapes_without_text() {
        let rasterizer = SvgRasterizer::new(None);
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
            <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
        </svg>"##;
        let pixmap = rasterizer.render(svg).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 10));

        let rgba = pixmap_to_rgba(&pixmap);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        // Right half untouched
        assert_eq!(&rgba[(5 * 20 + 15) * 4..(5 * 20 + 16) * 4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_svg() {
        let rasterizer = SvgRasterizer::new(None);
        assert!(matches!(rasterizer.render("<svg"), Err(RenderError::Svg(_))));
    }

    #[test]
    fn test_zero_size_pixmap() {
        assert!(matches!(new_pixmap(0, 10), Err(RenderError::InvalidSize { .. })));
    }
}
