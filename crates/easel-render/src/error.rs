use crate::ExportFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export region {width}×{height} is empty or not finite")]
    InvalidRegion { width: f64, height: f64 },

    #[error("{0:?} export is not available in this build")]
    Unsupported(ExportFormat),

    #[cfg(feature = "raster")]
    #[error("SVG could not be parsed for rasterization: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[cfg(feature = "raster")]
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("could not allocate a {0}×{1} pixmap")]
    Pixmap(u32, u32),
}
