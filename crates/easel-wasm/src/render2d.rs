//! Canvas2D renderer.
//!
//! Walks the scene bottom→top and draws each object in its local
//! coordinates under the object transform, composed with the viewport
//! transform. The same walk renders export regions onto a scratch canvas.

use easel_core::model::{LINE_HEIGHT, ObjectKind, SceneObject, TextAlign, TextBody};
use easel_core::{Affine, ImageBody, ObjectId, Rect, Scene};
use kurbo::{BezPath, PathEl};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Decoded images keyed by source URI.
pub type ImageCache = HashMap<String, HtmlImageElement>;

/// Colors used outside the document itself.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub selection: &'static str,
    pub placeholder_border: &'static str,
    pub placeholder_bg: &'static str,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self {
            bg: "#F4F4F5",
            selection: "#3B82F6",
            placeholder_border: "#86868B",
            placeholder_bg: "rgba(142, 142, 147, 0.12)",
        }
    }
}

/// Render the scene into the editor viewport.
#[allow(clippy::too_many_arguments)]
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    view: Affine,
    canvas_width: f64,
    canvas_height: f64,
    selected: &[ObjectId],
    images: &ImageCache,
    theme: &CanvasTheme,
    marquee: Option<Rect>,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    draw_objects(ctx, scene, view, images, theme);

    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    for id in selected {
        if let Some(obj) = scene.get(*id) {
            draw_selection_handles(ctx, view.transform_rect_bbox(obj.bounds()), theme);
        }
    }
    if let Some(rect) = marquee {
        draw_marquee_rect(ctx, rect, theme);
    }
}

/// Render `region` (scene coordinates) at one pixel per unit, for export.
pub fn render_region(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    region: Rect,
    images: &ImageCache,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, region.width(), region.height());
    let view = Affine::translate((-region.x0, -region.y0));
    draw_objects(ctx, scene, view, images, &CanvasTheme::default());
}

fn draw_objects(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    view: Affine,
    images: &ImageCache,
    theme: &CanvasTheme,
) {
    for obj in scene.objects() {
        let [a, b, c, d, e, f] = (view * obj.transform()).as_coeffs();
        ctx.save();
        let _ = ctx.set_transform(a, b, c, d, e, f);
        ctx.set_global_alpha(obj.opacity);
        apply_shadow(ctx, obj);

        match &obj.kind {
            ObjectKind::Textbox(text) => draw_text(ctx, obj, text),
            ObjectKind::Image(image) => draw_image(ctx, image, images, theme),
            _ => draw_shape(ctx, obj),
        }
        ctx.restore();
    }
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn trace(ctx: &CanvasRenderingContext2d, path: &BezPath) {
    ctx.begin_path();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}

fn draw_shape(ctx: &CanvasRenderingContext2d, obj: &SceneObject) {
    trace(ctx, &obj.kind.outline());

    if let Some(fill) = obj.fill.as_deref() {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    clear_shadow(ctx);

    if let Some(stroke) = obj.stroke.as_deref() {
        ctx.set_stroke_style_str(stroke);
        ctx.set_line_width(obj.stroke_width);
        ctx.set_line_join(obj.stroke_line_join.as_str());
        if let Some(dash) = obj.stroke_dash_array.as_ref().filter(|d| !d.is_empty()) {
            let segments = js_sys::Array::new();
            for len in dash {
                segments.push(&JsValue::from_f64(*len));
            }
            let _ = ctx.set_line_dash(&segments);
        }
        ctx.stroke();
    }
}

fn draw_text(ctx: &CanvasRenderingContext2d, obj: &SceneObject, text: &TextBody) {
    ctx.set_font(&format!(
        "{} {} {}px {}",
        text.font_style.as_str(),
        text.font_weight,
        text.font_size,
        text.font_family
    ));
    ctx.set_fill_style_str(obj.fill.as_deref().unwrap_or("#000000"));
    ctx.set_text_baseline("top");
    let x = match text.text_align {
        TextAlign::Center => text.width / 2.0,
        TextAlign::Right => text.width,
        TextAlign::Left | TextAlign::Justify => 0.0,
    };
    ctx.set_text_align(match text.text_align {
        TextAlign::Justify => "left",
        align => align.as_str(),
    });

    let line_height = text.font_size * LINE_HEIGHT;
    for (i, line) in text.wrapped_lines().iter().enumerate() {
        let y = i as f64 * line_height;
        let _ = ctx.fill_text(line, x, y);
        if text.underline || text.linethrough {
            let width = ctx.measure_text(line).map(|m| m.width()).unwrap_or(0.0);
            let start = x - match text.text_align {
                TextAlign::Center => width / 2.0,
                TextAlign::Right => width,
                TextAlign::Left | TextAlign::Justify => 0.0,
            };
            if text.underline {
                ctx.fill_rect(start, y + text.font_size, width, text.font_size / 15.0);
            }
            if text.linethrough {
                ctx.fill_rect(start, y + text.font_size / 2.0, width, text.font_size / 15.0);
            }
        }
    }
}

/// Draw a decoded image, or a placeholder while it is still loading.
fn draw_image(
    ctx: &CanvasRenderingContext2d,
    image: &ImageBody,
    images: &ImageCache,
    theme: &CanvasTheme,
) {
    match images.get(&image.src) {
        Some(element) => {
            let filter = image.filters.first().and_then(|f| f.css_filter());
            ctx.set_filter(filter.as_deref().unwrap_or("none"));
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                element,
                0.0,
                0.0,
                image.width,
                image.height,
            );
        }
        None => {
            clear_shadow(ctx);
            ctx.set_fill_style_str(theme.placeholder_bg);
            ctx.fill_rect(0.0, 0.0, image.width, image.height);
            ctx.set_stroke_style_str(theme.placeholder_border);
            let _ = ctx.set_line_dash(&js_sys::Array::of2(
                &JsValue::from_f64(4.0),
                &JsValue::from_f64(4.0),
            ));
            ctx.stroke_rect(0.0, 0.0, image.width, image.height);
        }
    }
}

fn draw_selection_handles(ctx: &CanvasRenderingContext2d, b: Rect, theme: &CanvasTheme) {
    let handle_size = 8.0;
    let half = handle_size / 2.0;

    ctx.set_stroke_style_str(theme.selection);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(b.x0, b.y0, b.width(), b.height());

    ctx.set_fill_style_str("#FFFFFF");
    let corners = [(b.x0, b.y0), (b.x1, b.y0), (b.x0, b.y1), (b.x1, b.y1)];
    for (hx, hy) in corners {
        ctx.fill_rect(hx - half, hy - half, handle_size, handle_size);
        ctx.stroke_rect(hx - half, hy - half, handle_size, handle_size);
    }
}

/// Rubber-band selection rectangle, in screen space.
fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, rect: Rect, theme: &CanvasTheme) {
    let rect = rect.abs();
    if rect.width() < 1.0 && rect.height() < 1.0 {
        return;
    }

    ctx.save();
    ctx.set_fill_style_str("rgba(59, 130, 246, 0.08)");
    ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());

    ctx.set_stroke_style_str(theme.selection);
    ctx.set_line_width(1.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0),
        &JsValue::from_f64(4.0),
    ));
    ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
    ctx.restore();
}

fn apply_shadow(ctx: &CanvasRenderingContext2d, obj: &SceneObject) {
    if let Some(shadow) = &obj.shadow {
        ctx.set_shadow_blur(shadow.blur);
        ctx.set_shadow_offset_x(shadow.offset_x);
        ctx.set_shadow_offset_y(shadow.offset_y);
        ctx.set_shadow_color(&shadow.color);
    }
}

/// Clear shadow after fill so the stroke doesn't inherit it.
fn clear_shadow(ctx: &CanvasRenderingContext2d) {
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);
    ctx.set_shadow_color("transparent");
}
