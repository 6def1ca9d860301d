pub mod error;
pub mod hit;
#[cfg(feature = "raster")]
pub mod raster;
pub mod svg;

pub use error::ExportError;
pub use hit::{hit_test, hit_test_rect};
pub use svg::render_svg;

use easel_core::Scene;
use kurbo::Rect;

/// Output formats offered by the save menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

/// Export the `region` of `scene` (scene coordinates, one unit per pixel).
pub fn export(scene: &Scene, region: Rect, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (region.width(), region.height());
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return Err(ExportError::InvalidRegion { width, height });
    }

    let svg = render_svg(scene, region);
    log::debug!(
        "export {:?}: {}×{} region, {} objects",
        format,
        width,
        height,
        scene.len()
    );

    match format {
        ExportFormat::Svg => Ok(svg.into_bytes()),
        #[cfg(feature = "raster")]
        ExportFormat::Png => {
            let image = raster::rasterize(&svg, width.ceil() as u32, height.ceil() as u32)?;
            raster::encode_png(&image)
        }
        #[cfg(feature = "raster")]
        ExportFormat::Jpeg => {
            let image = raster::rasterize(&svg, width.ceil() as u32, height.ceil() as u32)?;
            raster::encode_jpeg(&image)
        }
        #[cfg(not(feature = "raster"))]
        ExportFormat::Png | ExportFormat::Jpeg => Err(ExportError::Unsupported(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_extensions() {
        assert_eq!(ExportFormat::from_extension("JPEG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::from_extension("gif"), None);
    }

    #[test]
    fn empty_region_rejected() {
        let scene = Scene::new();
        let err = export(&scene, Rect::new(0.0, 0.0, 0.0, 10.0), ExportFormat::Svg).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRegion { .. }));
    }
}
