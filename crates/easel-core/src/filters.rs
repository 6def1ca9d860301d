//! Image filter catalog.
//!
//! Maps the effect names offered in the filter panel to configured filter
//! descriptors. Parameters are fixed per name; an image carries at most one
//! descriptor at a time.

use serde::{Deserialize, Serialize};

/// A configured image filter, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImageFilter {
    Polaroid,
    Grayscale,
    Sepia,
    Kodachrome,
    Contrast { contrast: f64 },
    Brightness { brightness: f64 },
    Brownie,
    Vintage,
    Technicolor,
    Pixelate { blocksize: u32 },
    Invert,
    Blur { blur: f64 },
    Convolute { matrix: Vec<f64> },
    RemoveColor {
        color: String,
        threshold: f64,
        distance: f64,
    },
    BlackWhite,
    Vibrance { vibrance: f64 },
    BlendColor {
        color: String,
        mode: String,
        alpha: f64,
    },
    HueRotation { rotation: f64 },
    Resize {
        #[serde(rename = "scaleX")]
        scale_x: f64,
        #[serde(rename = "scaleY")]
        scale_y: f64,
    },
    Gamma { gamma: [f64; 3] },
    Saturation { saturation: f64 },
}

/// Names accepted by [`resolve`], in panel order.
pub const FILTER_NAMES: [&str; 23] = [
    "none",
    "polaroid",
    "sepia",
    "kodachrome",
    "contrast",
    "brightness",
    "greyscale",
    "brownie",
    "vintage",
    "technicolor",
    "pixelate",
    "invert",
    "blur",
    "sharpen",
    "emboss",
    "removecolor",
    "blacknwhite",
    "vibrance",
    "blendcolor",
    "huerotate",
    "resize",
    "saturation",
    "gamma",
];

/// Resolve a filter name to its descriptor. Unknown names (and `none`)
/// resolve to `None`, which clears an image's filters.
pub fn resolve(name: &str) -> Option<ImageFilter> {
    let filter = match name {
        "polaroid" => ImageFilter::Polaroid,
        "greyscale" => ImageFilter::Grayscale,
        "sepia" => ImageFilter::Sepia,
        "kodachrome" => ImageFilter::Kodachrome,
        "contrast" => ImageFilter::Contrast { contrast: 0.3 },
        "brightness" => ImageFilter::Brightness { brightness: 0.2 },
        "brownie" => ImageFilter::Brownie,
        "vintage" => ImageFilter::Vintage,
        "technicolor" => ImageFilter::Technicolor,
        "pixelate" => ImageFilter::Pixelate { blocksize: 4 },
        "invert" => ImageFilter::Invert,
        "blur" => ImageFilter::Blur { blur: 0.1 },
        "sharpen" => ImageFilter::Convolute {
            matrix: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
        },
        "emboss" => ImageFilter::Convolute {
            matrix: vec![1.0, 1.0, 1.0, 1.0, 0.7, -1.0, -1.0, -1.0, -1.0],
        },
        "removecolor" => ImageFilter::RemoveColor {
            color: "#FFFFFF".into(),
            threshold: 0.2,
            distance: 0.5,
        },
        "blacknwhite" => ImageFilter::BlackWhite,
        "vibrance" => ImageFilter::Vibrance { vibrance: 1.0 },
        "blendcolor" => ImageFilter::BlendColor {
            color: "#00ff00".into(),
            mode: "multiply".into(),
            alpha: 1.0,
        },
        "huerotate" => ImageFilter::HueRotation { rotation: 0.5 },
        "resize" => ImageFilter::Resize {
            scale_x: 1.0,
            scale_y: 1.0,
        },
        "gamma" => ImageFilter::Gamma {
            gamma: [1.0, 0.5, 2.1],
        },
        "saturation" => ImageFilter::Saturation { saturation: 0.7 },
        _ => return None,
    };
    Some(filter)
}

impl ImageFilter {
    /// Closest CSS `filter` function, for renderers that draw through the
    /// browser or SVG. Convolutions and color keying have no CSS form.
    pub fn css_filter(&self) -> Option<String> {
        let css = match self {
            ImageFilter::Grayscale | ImageFilter::BlackWhite => "grayscale(1)".to_string(),
            ImageFilter::Sepia | ImageFilter::Brownie => "sepia(1)".to_string(),
            ImageFilter::Vintage => "sepia(0.6) contrast(1.1)".to_string(),
            ImageFilter::Kodachrome | ImageFilter::Technicolor => {
                "saturate(1.5) contrast(1.1)".to_string()
            }
            ImageFilter::Polaroid => "sepia(0.2) saturate(1.3)".to_string(),
            ImageFilter::Invert => "invert(1)".to_string(),
            ImageFilter::Contrast { contrast } => format!("contrast({})", 1.0 + contrast),
            ImageFilter::Brightness { brightness } => format!("brightness({})", 1.0 + brightness),
            ImageFilter::Blur { blur } => format!("blur({}px)", blur * 10.0),
            ImageFilter::Vibrance { vibrance } => format!("saturate({})", 1.0 + vibrance),
            ImageFilter::Saturation { saturation } => format!("saturate({})", 1.0 + saturation),
            ImageFilter::HueRotation { rotation } => format!("hue-rotate({}deg)", rotation * 180.0),
            ImageFilter::Pixelate { .. }
            | ImageFilter::Convolute { .. }
            | ImageFilter::RemoveColor { .. }
            | ImageFilter::BlendColor { .. }
            | ImageFilter::Resize { .. }
            | ImageFilter::Gamma { .. } => return None,
        };
        Some(css)
    }
}
