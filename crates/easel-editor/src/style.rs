//! Style state: the default attributes used for newly created objects,
//! and the read-through rule for "active" values.

use easel_core::presets::{ShapeStyle, TextStyle};
use easel_core::{
    DashArray, FILL_COLOR, FONT_FAMILY, FONT_SIZE, FONT_WEIGHT, FontStyle, STROKE_COLOR,
    STROKE_WIDTH, SceneObject, TextAlign,
};

#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    pub fill: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub stroke_dash_array: DashArray,
    pub font_family: String,
    pub font_weight: u16,
    pub font_size: f64,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fill: FILL_COLOR.to_string(),
            stroke_color: STROKE_COLOR.to_string(),
            stroke_width: STROKE_WIDTH,
            stroke_dash_array: DashArray::new(),
            font_family: FONT_FAMILY.to_string(),
            font_weight: FONT_WEIGHT,
            font_size: FONT_SIZE,
        }
    }
}

impl StyleState {
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: self.fill.clone(),
            stroke: self.stroke_color.clone(),
            stroke_width: self.stroke_width,
            stroke_dash_array: self.stroke_dash_array.clone(),
        }
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            fill: self.fill.clone(),
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            font_size: self.font_size,
        }
    }

    // Active values: read from the first selected object when there is
    // one, falling back to the stored default when it lacks the attribute.

    pub fn active_fill(&self, first: Option<&SceneObject>) -> String {
        first
            .and_then(|obj| obj.fill.clone())
            .unwrap_or_else(|| self.fill.clone())
    }

    pub fn active_stroke_color(&self, first: Option<&SceneObject>) -> String {
        first
            .and_then(|obj| obj.stroke.clone())
            .unwrap_or_else(|| self.stroke_color.clone())
    }

    pub fn active_stroke_width(&self, first: Option<&SceneObject>) -> f64 {
        first.map_or(self.stroke_width, |obj| obj.stroke_width)
    }

    pub fn active_stroke_dash_array(&self, first: Option<&SceneObject>) -> DashArray {
        first
            .and_then(|obj| obj.stroke_dash_array.clone())
            .unwrap_or_else(|| self.stroke_dash_array.clone())
    }

    /// Opacity is per-object only; the default is fully opaque.
    pub fn active_opacity(&self, first: Option<&SceneObject>) -> f64 {
        first.map_or(1.0, |obj| obj.opacity)
    }

    pub fn active_font_family(&self, first: Option<&SceneObject>) -> String {
        first
            .and_then(|obj| obj.text())
            .map(|text| text.font_family.clone())
            .unwrap_or_else(|| self.font_family.clone())
    }

    pub fn active_font_weight(&self, first: Option<&SceneObject>) -> u16 {
        first
            .and_then(|obj| obj.text())
            .map_or(self.font_weight, |text| text.font_weight)
    }

    pub fn active_font_size(&self, first: Option<&SceneObject>) -> f64 {
        first
            .and_then(|obj| obj.text())
            .map_or(self.font_size, |text| text.font_size)
    }

    pub fn active_font_style(&self, first: Option<&SceneObject>) -> FontStyle {
        first
            .and_then(|obj| obj.text())
            .map(|text| text.font_style)
            .unwrap_or_default()
    }

    pub fn active_text_align(&self, first: Option<&SceneObject>) -> TextAlign {
        first
            .and_then(|obj| obj.text())
            .map(|text| text.text_align)
            .unwrap_or_default()
    }

    pub fn active_underline(&self, first: Option<&SceneObject>) -> bool {
        first
            .and_then(|obj| obj.text())
            .is_some_and(|text| text.underline)
    }

    pub fn active_linethrough(&self, first: Option<&SceneObject>) -> bool {
        first
            .and_then(|obj| obj.text())
            .is_some_and(|text| text.linethrough)
    }
}
