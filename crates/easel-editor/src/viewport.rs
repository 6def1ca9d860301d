//! Viewport: zoom and pan that keep the fixed-size workspace fitted to a
//! container of arbitrary pixel size.

use crate::config::EditorConfig;
use easel_core::{Affine, Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    container: (f64, f64),
    zoom: f64,
    transform: Affine,
    step: f64,
    min_zoom: f64,
    max_zoom: f64,
    margin: f64,
}

impl Viewport {
    pub fn new(container: (f64, f64), config: &EditorConfig) -> Self {
        Self {
            container,
            zoom: 1.0,
            transform: Affine::IDENTITY,
            step: config.zoom_step,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            margin: config.fit_margin,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn container(&self) -> (f64, f64) {
        self.container
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.container = (width, height);
    }

    fn center(&self) -> Point {
        Point::new(self.container.0 / 2.0, self.container.1 / 2.0)
    }

    /// Largest zoom ≤ 1 that fits `workspace` (with the margin on each
    /// side), centering it in the container.
    pub fn fit(&mut self, workspace: Rect) -> Affine {
        let (cw, ch) = self.container;
        let (ww, wh) = (workspace.width(), workspace.height());
        let zoom = if ww > 0.0 && wh > 0.0 && cw > 0.0 && ch > 0.0 {
            let scale = (cw / ww).min(ch / wh);
            (scale * (1.0 - 2.0 * self.margin)).min(1.0)
        } else {
            1.0
        };
        self.zoom = zoom;
        self.transform = Affine::translate(self.center().to_vec2())
            * Affine::scale(zoom)
            * Affine::translate(-workspace.center().to_vec2());
        self.transform
    }

    /// Step the zoom by `delta`, clamped, pivoting on the container center.
    pub fn zoom_by(&mut self, delta: f64) -> Affine {
        let next = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        if next != self.zoom {
            let pivot = self.center().to_vec2();
            self.transform = Affine::translate(pivot)
                * Affine::scale(next / self.zoom)
                * Affine::translate(-pivot)
                * self.transform;
            self.zoom = next;
        }
        self.transform
    }

    pub fn zoom_in(&mut self) -> Affine {
        self.zoom_by(self.step)
    }

    pub fn zoom_out(&mut self) -> Affine {
        self.zoom_by(-self.step)
    }

    /// Identity transform, used while exporting.
    pub fn reset(&mut self) -> Affine {
        self.zoom = 1.0;
        self.transform = Affine::IDENTITY;
        self.transform
    }

    /// Screen → scene coordinates.
    pub fn to_scene(&self, screen: Point) -> Point {
        self.transform.inverse() * screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(w: f64, h: f64) -> Viewport {
        Viewport::new((w, h), &EditorConfig::default())
    }

    #[test]
    fn fit_shrinks_and_centers() {
        let mut vp = viewport(1000.0, 800.0);
        let ws = Rect::new(0.0, 0.0, 900.0, 1200.0);
        let t = vp.fit(ws);
        // 800 / 1200 * 0.9
        assert!((vp.zoom() - 0.6).abs() < 1e-9);
        let screen = t.transform_rect_bbox(ws);
        assert!((screen.center().x - 500.0).abs() < 1e-9);
        assert!((screen.center().y - 400.0).abs() < 1e-9);
        assert!(screen.y0 >= 0.0 && screen.y1 <= 800.0);
    }

    #[test]
    fn fit_never_magnifies() {
        let mut vp = viewport(4000.0, 4000.0);
        vp.fit(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn zoom_steps_are_clamped() {
        let mut vp = viewport(1000.0, 800.0);
        vp.fit(Rect::new(0.0, 0.0, 900.0, 1200.0));
        vp.zoom_in();
        assert!((vp.zoom() - 0.65).abs() < 1e-9);
        for _ in 0..20 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom(), 1.0);
        for _ in 0..40 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom(), 0.2);
    }

    #[test]
    fn zoom_pivots_on_center() {
        let mut vp = viewport(1000.0, 800.0);
        let ws = Rect::new(0.0, 0.0, 900.0, 1200.0);
        vp.fit(ws);
        let before = vp.transform() * ws.center();
        vp.zoom_out();
        let after = vp.transform() * ws.center();
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn screen_to_scene_inverts() {
        let mut vp = viewport(1000.0, 800.0);
        vp.fit(Rect::new(0.0, 0.0, 900.0, 1200.0));
        let p = vp.to_scene(Point::new(500.0, 400.0));
        assert!((p.x - 450.0).abs() < 1e-9 && (p.y - 600.0).abs() < 1e-9);
    }
}
