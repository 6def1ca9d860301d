//! CPU rasterization of exported SVG through resvg, encoded with `image`.

use crate::error::ExportError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use std::sync::{Arc, LazyLock};

pub const JPEG_QUALITY: u8 = 92;

/// System fonts, loaded once per process.
static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("raster: loaded {} font faces", db.len());
    Arc::new(db)
});

/// Rasterize an SVG document into a straight-alpha RGBA image.
pub fn rasterize(svg: &str, width: u32, height: u32) -> Result<RgbaImage, ExportError> {
    let options = usvg::Options {
        fontdb: FONTS.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Pixmap(width, height))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(width, height, rgba).ok_or(ExportError::Pixmap(width, height))
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// JPEG has no alpha; transparent pixels come out black.
pub fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(bytes)
}
