//! SVG writer.
//!
//! Emits one `<g>` per object carrying the object's full affine transform,
//! so geometry is written in object-local coordinates exactly as stored.

use easel_core::model::{LINE_HEIGHT, ObjectKind, SceneObject, TextAlign, TextBody};
use easel_core::{Color, ImageBody, Scene};
use kurbo::{Rect, Shape};
use std::fmt::Write;

/// Render the part of `scene` inside `region` as a standalone SVG document
/// sized to the region.
pub fn render_svg(scene: &Scene, region: Rect) -> String {
    let width = region.width();
    let height = region.height();

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{width}\" height=\"{height}\" viewBox=\"{} {} {width} {height}\">",
        region.x0, region.y0
    );

    for obj in scene.objects() {
        if !obj.is_workspace() && !touches(obj, region) {
            log::trace!("svg: skipping {:?} outside export region", obj.id);
            continue;
        }
        render_object_svg(&mut svg, obj);
    }

    svg.push_str("</svg>\n");
    svg
}

/// Flat strokes have zero-area bounds, so overlap is tested on the
/// stroke-inflated box rather than by intersection area.
fn touches(obj: &SceneObject, region: Rect) -> bool {
    let b = obj.bounds().inflate(obj.stroke_width / 2.0, obj.stroke_width / 2.0);
    b.x1 >= region.x0 && b.x0 <= region.x1 && b.y1 >= region.y0 && b.y0 <= region.y1
}

/// `name="#RRGGBB"` plus `name-opacity` when translucent; `none` when unset
/// or unparsable.
fn paint_attrs(name: &str, value: Option<&str>) -> String {
    match value.and_then(Color::parse) {
        Some(c) if c.a > 0.0 => {
            let mut s = format!(" {name}=\"{}\"", Color { a: 1.0, ..c }.to_hex());
            if c.a < 1.0 {
                let _ = write!(s, " {name}-opacity=\"{}\"", c.a);
            }
            s
        }
        _ => format!(" {name}=\"none\""),
    }
}

fn stroke_attrs(obj: &SceneObject) -> String {
    let mut s = paint_attrs("stroke", obj.stroke.as_deref());
    if obj.stroke.is_some() {
        let _ = write!(s, " stroke-width=\"{}\"", obj.stroke_width);
        if let Some(dash) = obj.stroke_dash_array.as_ref().filter(|d| !d.is_empty()) {
            let list: Vec<String> = dash.iter().map(|d| d.to_string()).collect();
            let _ = write!(s, " stroke-dasharray=\"{}\"", list.join(" "));
        }
        let _ = write!(s, " stroke-linejoin=\"{}\"", obj.stroke_line_join.as_str());
    }
    s
}

fn render_object_svg(out: &mut String, obj: &SceneObject) {
    let [a, b, c, d, e, f] = obj.transform().as_coeffs();
    let _ = write!(out, "<g transform=\"matrix({a} {b} {c} {d} {e} {f})\"");
    if obj.opacity < 1.0 {
        let _ = write!(out, " opacity=\"{}\"", obj.opacity);
    }
    out.push_str(">\n");

    match &obj.kind {
        ObjectKind::Textbox(text) => render_text_svg(out, obj, text),
        ObjectKind::Image(image) => render_image_svg(out, image),
        _ => {
            let _ = writeln!(
                out,
                "  <path d=\"{}\"{}{} />",
                obj.kind.outline().to_svg(),
                paint_attrs("fill", obj.fill.as_deref()),
                stroke_attrs(obj)
            );
        }
    }

    out.push_str("</g>\n");
}

fn render_text_svg(out: &mut String, obj: &SceneObject, text: &TextBody) {
    let (anchor, x) = match text.text_align {
        TextAlign::Center => ("middle", text.width / 2.0),
        TextAlign::Right => ("end", text.width),
        TextAlign::Left | TextAlign::Justify => ("start", 0.0),
    };
    let style = text.font_style.as_str();
    let mut decoration = Vec::new();
    if text.underline {
        decoration.push("underline");
    }
    if text.linethrough {
        decoration.push("line-through");
    }

    let _ = write!(
        out,
        "  <text font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{style}\" text-anchor=\"{anchor}\"{}",
        escape(&text.font_family),
        text.font_size,
        text.font_weight,
        paint_attrs("fill", obj.fill.as_deref()),
    );
    if !decoration.is_empty() {
        let _ = write!(out, " text-decoration=\"{}\"", decoration.join(" "));
    }
    out.push_str(">\n");

    let line_height = text.font_size * LINE_HEIGHT;
    for (i, line) in text.wrapped_lines().iter().enumerate() {
        let y = i as f64 * line_height + text.font_size;
        let _ = writeln!(out, "    <tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape(line));
    }
    out.push_str("  </text>\n");
}

fn render_image_svg(out: &mut String, image: &ImageBody) {
    let filter = image
        .filters
        .first()
        .and_then(|f| f.css_filter())
        .map(|css| format!(" filter=\"{css}\""))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  <image xlink:href=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\"{filter} />",
        escape(&image.src),
        image.width,
        image.height
    );
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
