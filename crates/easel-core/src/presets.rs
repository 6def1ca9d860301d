//! Object constructors for the insert menu.
//!
//! Each constructor returns an object at the origin; the editor centers it
//! on the workspace before insertion.

use crate::model::{
    DashArray, FILL_COLOR, FONT_FAMILY, FONT_SIZE, FONT_WEIGHT, FontStyle, ImageBody, LineJoin,
    ObjectKind, ObjectMeta, PathCmd, STROKE_COLOR, STROKE_WIDTH, SceneObject, Shadow, TextAlign,
    TextBody, Vertex, WORKSPACE_FILL, WORKSPACE_NAME,
};
use kurbo::{Point, Rect};
use serde::Deserialize;
use smallvec::SmallVec;

pub const RECT_SIZE: (f64, f64) = (100.0, 100.0);
pub const SOFT_RECT_RADIUS: f64 = 6.0;
pub const TRIANGLE_SIZE: (f64, f64) = (100.0, 90.0);
pub const CIRCLE_RADIUS: f64 = 150.0;
pub const CIRCLE_SCALE: f64 = 0.4;
pub const DIAMOND_POINTS: [(f64, f64); 4] = [(65.0, 0.0), (130.0, 65.0), (65.0, 130.0), (0.0, 65.0)];
pub const TEXT_WIDTH: f64 = 400.0;

/// Paint applied to newly created shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub stroke_dash_array: DashArray,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: FILL_COLOR.to_string(),
            stroke: STROKE_COLOR.to_string(),
            stroke_width: STROKE_WIDTH,
            stroke_dash_array: DashArray::new(),
        }
    }
}

fn styled(kind: ObjectKind, style: &ShapeStyle) -> SceneObject {
    let mut obj = SceneObject::new(kind);
    obj.fill = Some(style.fill.clone());
    obj.stroke = Some(style.stroke.clone());
    obj.stroke_width = style.stroke_width;
    obj.stroke_dash_array = Some(style.stroke_dash_array.clone());
    obj
}

/// The non-selectable page rectangle. Its fill is the document background.
pub fn workspace(width: f64, height: f64) -> SceneObject {
    let mut obj = SceneObject::new(ObjectKind::Rect {
        width,
        height,
        rx: 0.0,
        ry: 0.0,
    });
    obj.fill = Some(WORKSPACE_FILL.to_string());
    obj.shadow = Some(Shadow {
        color: "rgba(0,0,0,0.8)".to_string(),
        blur: 5.0,
        offset_x: 0.0,
        offset_y: 0.0,
    });
    obj.meta = ObjectMeta {
        name: Some(WORKSPACE_NAME.to_string()),
        selectable: Some(false),
        has_controls: Some(false),
        ..ObjectMeta::default()
    };
    obj
}

pub fn rectangle(style: &ShapeStyle) -> SceneObject {
    styled(
        ObjectKind::Rect {
            width: RECT_SIZE.0,
            height: RECT_SIZE.1,
            rx: 0.0,
            ry: 0.0,
        },
        style,
    )
}

pub fn soft_rectangle(style: &ShapeStyle) -> SceneObject {
    styled(
        ObjectKind::Rect {
            width: RECT_SIZE.0,
            height: RECT_SIZE.1,
            rx: SOFT_RECT_RADIUS,
            ry: SOFT_RECT_RADIUS,
        },
        style,
    )
}

pub fn triangle(style: &ShapeStyle) -> SceneObject {
    let mut obj = styled(
        ObjectKind::Triangle {
            width: TRIANGLE_SIZE.0,
            height: TRIANGLE_SIZE.1,
        },
        style,
    );
    obj.stroke_line_join = LineJoin::Round;
    obj
}

pub fn inverse_triangle(style: &ShapeStyle) -> SceneObject {
    let mut obj = triangle(style);
    obj.flip_y = true;
    obj
}

pub fn diamond(style: &ShapeStyle) -> SceneObject {
    let points = DIAMOND_POINTS
        .iter()
        .map(|&(x, y)| Vertex { x, y })
        .collect();
    let mut obj = styled(ObjectKind::Polygon { points }, style);
    obj.stroke_line_join = LineJoin::Round;
    obj
}

pub fn circle(style: &ShapeStyle) -> SceneObject {
    let mut obj = styled(
        ObjectKind::Ellipse {
            rx: CIRCLE_RADIUS,
            ry: CIRCLE_RADIUS,
        },
        style,
    );
    obj.scale_x = CIRCLE_SCALE;
    obj.scale_y = CIRCLE_SCALE;
    obj
}

/// Caller-supplied text attributes; unset fields fall back to the
/// editor's text defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOverrides {
    pub fill: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<u16>,
    pub font_size: Option<f64>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub underline: Option<bool>,
    pub linethrough: Option<bool>,
    pub width: Option<f64>,
}

/// Text defaults taken from the style store.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill: String,
    pub font_family: String,
    pub font_weight: u16,
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fill: FILL_COLOR.to_string(),
            font_family: FONT_FAMILY.to_string(),
            font_weight: FONT_WEIGHT,
            font_size: FONT_SIZE,
        }
    }
}

pub fn textbox(content: &str, defaults: &TextStyle, overrides: &TextOverrides) -> SceneObject {
    let mut body = TextBody {
        text: content.to_string(),
        width: overrides.width.unwrap_or(TEXT_WIDTH),
        height: 0.0,
        line_count: 0,
        font_family: overrides
            .font_family
            .clone()
            .unwrap_or_else(|| defaults.font_family.clone()),
        font_weight: overrides.font_weight.unwrap_or(defaults.font_weight),
        font_size: overrides.font_size.unwrap_or(defaults.font_size),
        font_style: overrides.font_style.unwrap_or_default(),
        text_align: overrides.text_align.unwrap_or_default(),
        underline: overrides.underline.unwrap_or(false),
        linethrough: overrides.linethrough.unwrap_or(false),
    };
    body.normalize();

    let mut obj = SceneObject::new(ObjectKind::Textbox(body));
    obj.fill = Some(
        overrides
            .fill
            .clone()
            .unwrap_or_else(|| defaults.fill.clone()),
    );
    obj.meta.editable = Some(true);
    obj
}

/// Image object scaled so that it covers exactly `target` width and height.
pub fn image(src: &str, natural: (f64, f64), target: (f64, f64)) -> SceneObject {
    let (w, h) = natural;
    let mut obj = SceneObject::new(ObjectKind::Image(ImageBody {
        src: src.to_string(),
        width: w,
        height: h,
        filters: SmallVec::new(),
        cross_origin: Some("anonymous".to_string()),
    }));
    obj.fill = None;
    if w > 0.0 && h > 0.0 {
        obj.scale_x = target.0 / w;
        obj.scale_y = target.1 / h;
    }
    obj
}

/// Brush used for freehand drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub color: String,
    pub width: f64,
}

/// Build a smoothed freehand path from raw pointer samples. The path is
/// stored relative to the stroke's bounding box; fewer than two samples
/// produce nothing.
pub fn freehand(points: &[Point], brush: &Brush) -> Option<SceneObject> {
    if points.len() < 2 {
        return None;
    }
    let bounds = points
        .iter()
        .map(|p| Rect::from_points(*p, *p))
        .reduce(|a, b| a.union(b))?;
    let local: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x - bounds.x0, p.y - bounds.y0))
        .collect();

    // Quadratic smoothing through the midpoints of consecutive samples.
    let mut path = vec![PathCmd::MoveTo(local[0].x, local[0].y)];
    for pair in local.windows(2) {
        let mid = pair[0].midpoint(pair[1]);
        path.push(PathCmd::QuadTo(pair[0].x, pair[0].y, mid.x, mid.y));
    }
    if let Some(last) = local.last() {
        path.push(PathCmd::LineTo(last.x, last.y));
    }

    let mut obj = SceneObject::new(ObjectKind::Path { path });
    obj.left = bounds.x0;
    obj.top = bounds.y0;
    obj.fill = None;
    obj.stroke = Some(brush.color.clone());
    obj.stroke_width = brush.width;
    obj.stroke_line_join = LineJoin::Round;
    Some(obj)
}
