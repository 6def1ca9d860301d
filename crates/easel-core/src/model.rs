//! Graphical object model for Easel documents.
//!
//! A document is a flat, z-ordered list of `SceneObject`s. Each object is a
//! closed `ObjectKind` variant plus the common attributes every variant
//! shares (position, transform, paint, opacity). Attribute edits go through
//! `Attr` so the "which variants accept which attributes" rule lives in one
//! exhaustive match.
//!
//! Field names serialize in camelCase because documents are exchanged with
//! browser tooling that expects that shape.

use crate::filters::ImageFilter;
use crate::id::ObjectId;
use kurbo::{Affine, BezPath, Point, Rect, Shape, Vec2};
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

// ─── Defaults ────────────────────────────────────────────────────────────

/// `name` carried by the single workspace object.
pub const WORKSPACE_NAME: &str = "clip";
pub const WORKSPACE_FILL: &str = "white";

pub const FILL_COLOR: &str = "rgba(0,0,0,1)";
pub const STROKE_COLOR: &str = "rgba(0,0,0,1)";
pub const STROKE_WIDTH: f64 = 2.0;
pub const FONT_FAMILY: &str = "Arial";
pub const FONT_WEIGHT: u16 = 400;
pub const FONT_SIZE: f64 = 32.0;

/// Fixed line height multiplier used when deriving text box heights.
pub const LINE_HEIGHT: f64 = 1.16;

pub type DashArray = SmallVec<[f64; 4]>;

// ─── Paint details ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn as_str(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

/// Editable, wrapping text box.
///
/// `height` and `line_count` are derived from the other fields and are
/// recomputed by `normalize` before a document is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    pub text: String,
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub line_count: u32,
    pub font_family: String,
    #[serde(deserialize_with = "deserialize_font_weight")]
    pub font_weight: u16,
    pub font_size: f64,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub linethrough: bool,
}

impl TextBody {
    /// Average glyph advance as a fraction of the font size. Real metrics
    /// differ per environment; a fixed model keeps stored layouts stable.
    const ADVANCE: f64 = 0.6;

    fn glyphs_per_line(&self) -> usize {
        ((self.width / (self.font_size * Self::ADVANCE)).floor() as usize).max(1)
    }

    /// Content broken into display lines: explicit newlines first, then
    /// hard wraps at the fixed per-line glyph count.
    pub fn wrapped_lines(&self) -> Vec<String> {
        let per_line = self.glyphs_per_line();
        let mut lines = Vec::new();
        for paragraph in self.text.split('\n') {
            let chars: Vec<char> = paragraph.chars().collect();
            if chars.is_empty() {
                lines.push(String::new());
                continue;
            }
            lines.extend(chars.chunks(per_line).map(|chunk| chunk.iter().collect()));
        }
        lines
    }

    /// Recompute wrapped line count and box height from content, width
    /// and font size.
    pub fn normalize(&mut self) {
        let lines = self.wrapped_lines().len();
        self.line_count = lines as u32;
        self.height = lines as f64 * self.font_size * LINE_HEIGHT;
    }
}

/// Accept both numeric weights and the CSS keywords `normal` / `bold`.
fn deserialize_font_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Weight {
        Number(u16),
        Keyword(String),
    }

    match Weight::deserialize(deserializer)? {
        Weight::Number(n) => Ok(n),
        Weight::Keyword(k) => match k.as_str() {
            "normal" => Ok(400),
            "bold" => Ok(700),
            other => other
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid font weight `{other}`"))),
        },
    }
}

// ─── Image ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    pub src: String,
    /// Natural (decoded) pixel size.
    pub width: f64,
    pub height: f64,
    /// At most one filter is applied at a time.
    #[serde(default)]
    pub filters: SmallVec<[ImageFilter; 1]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
}

// ─── Path data ───────────────────────────────────────────────────────────

/// A single path command, in object-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),            // control, end
    CubicTo(f64, f64, f64, f64, f64, f64), // c1, c2, end
    Close,
}

pub fn path_to_bez(commands: &[PathCmd]) -> BezPath {
    let mut bez = BezPath::new();
    for cmd in commands {
        match *cmd {
            PathCmd::MoveTo(x, y) => bez.move_to((x, y)),
            PathCmd::LineTo(x, y) => bez.line_to((x, y)),
            PathCmd::QuadTo(cx, cy, ex, ey) => bez.quad_to((cx, cy), (ex, ey)),
            PathCmd::CubicTo(c1x, c1y, c2x, c2y, ex, ey) => {
                bez.curve_to((c1x, c1y), (c2x, c2y), (ex, ey))
            }
            PathCmd::Close => bez.close_path(),
        }
    }
    bez
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

// ─── Object kinds ────────────────────────────────────────────────────────

/// The closed set of drawable variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// Rectangle; a soft rectangle is one with non-zero corner radii.
    Rect {
        width: f64,
        height: f64,
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    /// Upward triangle; the inverted triangle sets `flipY` on the object.
    Triangle { width: f64, height: f64 },
    /// Closed polygon (diamond).
    Polygon { points: Vec<Vertex> },
    Ellipse { rx: f64, ry: f64 },
    #[serde(rename = "textbox", alias = "text", alias = "i-text")]
    Textbox(TextBody),
    Image(ImageBody),
    /// Freehand brush output.
    Path { path: Vec<PathCmd> },
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Triangle { .. } => "triangle",
            ObjectKind::Polygon { .. } => "polygon",
            ObjectKind::Ellipse { .. } => "ellipse",
            ObjectKind::Textbox(_) => "textbox",
            ObjectKind::Image(_) => "image",
            ObjectKind::Path { .. } => "path",
        }
    }

    /// Unscaled local bounds.
    pub fn local_bounds(&self) -> Rect {
        match self {
            ObjectKind::Rect { width, height, .. } | ObjectKind::Triangle { width, height } => {
                Rect::new(0.0, 0.0, *width, *height)
            }
            ObjectKind::Polygon { points } => points
                .iter()
                .map(|v| Rect::from_points((v.x, v.y), (v.x, v.y)))
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO),
            ObjectKind::Ellipse { rx, ry } => Rect::new(0.0, 0.0, rx * 2.0, ry * 2.0),
            ObjectKind::Textbox(text) => Rect::new(0.0, 0.0, text.width, text.height),
            ObjectKind::Image(image) => Rect::new(0.0, 0.0, image.width, image.height),
            ObjectKind::Path { path } => {
                if path.is_empty() {
                    Rect::ZERO
                } else {
                    path_to_bez(path).bounding_box()
                }
            }
        }
    }

    /// Outline in local coordinates (text and images use their box).
    pub fn outline(&self) -> BezPath {
        match self {
            ObjectKind::Rect {
                width,
                height,
                rx,
                ry,
            } => {
                let rect = Rect::new(0.0, 0.0, *width, *height);
                if *rx > 0.0 || *ry > 0.0 {
                    rect.to_rounded_rect(rx.max(*ry)).to_path(0.1)
                } else {
                    rect.to_path(0.1)
                }
            }
            ObjectKind::Triangle { width, height } => {
                let mut bez = BezPath::new();
                bez.move_to((width / 2.0, 0.0));
                bez.line_to((*width, *height));
                bez.line_to((0.0, *height));
                bez.close_path();
                bez
            }
            ObjectKind::Polygon { points } => {
                let mut bez = BezPath::new();
                for (i, v) in points.iter().enumerate() {
                    if i == 0 {
                        bez.move_to((v.x, v.y));
                    } else {
                        bez.line_to((v.x, v.y));
                    }
                }
                if !points.is_empty() {
                    bez.close_path();
                }
                bez
            }
            ObjectKind::Ellipse { rx, ry } => {
                kurbo::Ellipse::new((*rx, *ry), (*rx, *ry), 0.0).to_path(0.1)
            }
            ObjectKind::Path { path } => path_to_bez(path),
            ObjectKind::Textbox(_) | ObjectKind::Image(_) => self.local_bounds().to_path(0.1),
        }
    }
}

// ─── Metadata ────────────────────────────────────────────────────────────

/// Keys of the optional metadata that snapshots may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Name,
    Selectable,
    HasControls,
    Editable,
    LinkData,
    ExtensionType,
    Extension,
}

/// Non-geometric object metadata. Which keys survive serialization is
/// decided by the snapshot allow-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_controls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<serde_json::Value>,
}

impl ObjectMeta {
    /// Copy of this metadata keeping only the allowed keys.
    pub fn restricted(&self, allowed: &[MetaKey]) -> ObjectMeta {
        let keep = |key: MetaKey| allowed.contains(&key);
        ObjectMeta {
            name: self.name.clone().filter(|_| keep(MetaKey::Name)),
            selectable: self.selectable.filter(|_| keep(MetaKey::Selectable)),
            has_controls: self.has_controls.filter(|_| keep(MetaKey::HasControls)),
            editable: self.editable.filter(|_| keep(MetaKey::Editable)),
            link_data: self.link_data.clone().filter(|_| keep(MetaKey::LinkData)),
            extension_type: self
                .extension_type
                .clone()
                .filter(|_| keep(MetaKey::ExtensionType)),
            extension: self.extension.clone().filter(|_| keep(MetaKey::Extension)),
        }
    }
}

// ─── Scene objects ───────────────────────────────────────────────────────

fn one() -> f64 {
    1.0
}

/// One graphical object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    /// Arena handle; engine-internal and never serialized.
    #[serde(skip, default = "ObjectId::unassigned")]
    pub id: ObjectId,

    #[serde(flatten)]
    pub kind: ObjectKind,

    /// Top-left origin in scene units.
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Rotation in degrees about the origin.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,

    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default = "one")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_dash_array: Option<DashArray>,
    #[serde(default)]
    pub stroke_line_join: LineJoin,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,

    #[serde(flatten)]
    pub meta: ObjectMeta,
}

impl SceneObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::with_prefix(kind.type_name()),
            kind,
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            fill: Some(FILL_COLOR.to_string()),
            stroke: None,
            stroke_width: 1.0,
            stroke_dash_array: None,
            stroke_line_join: LineJoin::Miter,
            opacity: 1.0,
            shadow: None,
            meta: ObjectMeta::default(),
        }
    }

    pub fn is_workspace(&self) -> bool {
        self.meta.name.as_deref() == Some(WORKSPACE_NAME)
    }

    pub fn is_selectable(&self) -> bool {
        self.meta.selectable.unwrap_or(true)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Textbox(_))
    }

    pub fn text(&self) -> Option<&TextBody> {
        match &self.kind {
            ObjectKind::Textbox(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextBody> {
        match &mut self.kind {
            ObjectKind::Textbox(text) => Some(text),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageBody> {
        match &self.kind {
            ObjectKind::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Local → scene transform: translate, rotate, flip, scale.
    pub fn transform(&self) -> Affine {
        let local = self.kind.local_bounds();
        let flip = Affine::translate((local.center().x, local.center().y))
            * Affine::scale_non_uniform(
                if self.flip_x { -1.0 } else { 1.0 },
                if self.flip_y { -1.0 } else { 1.0 },
            )
            * Affine::translate((-local.center().x, -local.center().y));
        Affine::translate((self.left, self.top))
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-local.x0, -local.y0))
            * flip
    }

    /// Axis-aligned bounding box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(self.kind.local_bounds())
    }

    /// Scaled width and height, ignoring rotation.
    pub fn scaled_size(&self) -> (f64, f64) {
        let local = self.kind.local_bounds();
        (local.width() * self.scale_x, local.height() * self.scale_y)
    }

    pub fn center(&self) -> Point {
        self.transform() * self.kind.local_bounds().center()
    }

    /// Move so that the object's center lands on `target`.
    pub fn set_center(&mut self, target: Point) {
        let delta: Vec2 = target - self.center();
        self.translate(delta.x, delta.y);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    /// Apply an attribute edit if this variant supports it.
    /// Returns `true` when the object accepted the attribute.
    pub fn apply(&mut self, attr: &Attr) -> bool {
        match attr {
            Attr::Fill(value) => {
                self.fill = Some(value.clone());
                true
            }
            // Text has no outline: its "stroke color" is the glyph fill.
            Attr::StrokeColor(value) => {
                if self.is_text() {
                    self.fill = Some(value.clone());
                } else {
                    self.stroke = Some(value.clone());
                }
                true
            }
            Attr::StrokeWidth(value) => {
                self.stroke_width = *value;
                true
            }
            Attr::StrokeDashArray(value) => {
                self.stroke_dash_array = Some(value.clone());
                true
            }
            Attr::Opacity(value) => {
                self.opacity = *value;
                true
            }
            Attr::FontFamily(_)
            | Attr::FontWeight(_)
            | Attr::FontStyle(_)
            | Attr::FontSize(_)
            | Attr::TextAlign(_)
            | Attr::Underline(_)
            | Attr::Linethrough(_) => match &mut self.kind {
                ObjectKind::Textbox(text) => {
                    apply_text_attr(text, attr);
                    true
                }
                _ => false,
            },
            Attr::Filter(filter) => match &mut self.kind {
                ObjectKind::Image(image) => {
                    image.filters = filter.iter().cloned().collect();
                    true
                }
                _ => false,
            },
        }
    }
}

fn apply_text_attr(text: &mut TextBody, attr: &Attr) {
    match attr {
        Attr::FontFamily(value) => text.font_family = value.clone(),
        Attr::FontWeight(value) => text.font_weight = *value,
        Attr::FontStyle(value) => text.font_style = *value,
        Attr::FontSize(value) => text.font_size = *value,
        Attr::TextAlign(value) => text.text_align = *value,
        Attr::Underline(value) => text.underline = *value,
        Attr::Linethrough(value) => text.linethrough = *value,
        _ => {}
    }
}

/// A single attribute edit applied to the active objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Fill(String),
    StrokeColor(String),
    StrokeWidth(f64),
    StrokeDashArray(DashArray),
    Opacity(f64),
    FontFamily(String),
    FontWeight(u16),
    FontStyle(FontStyle),
    FontSize(f64),
    TextAlign(TextAlign),
    Underline(bool),
    Linethrough(bool),
    /// Replace the image filter list; `None` clears it.
    Filter(Option<ImageFilter>),
}
