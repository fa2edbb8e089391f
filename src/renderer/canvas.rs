//! Canvas2D surface (browser only)

use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::camera::Viewport;
use super::surface::{Composite, RadialGradient, Surface};

/// A `<canvas>` and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Re-derive the logical viewport from layout and resize the backing store
    ///
    /// Drawing happens in logical pixels; the device pixel ratio is folded into
    /// the context transform.
    pub fn fit_to_layout(&self, device_pixel_ratio: f64) -> Viewport {
        let rect = self.canvas.get_bounding_client_rect();
        let viewport = Viewport::new(
            rect.width() as f32,
            rect.height() as f32,
            device_pixel_ratio as f32,
        );
        let (w, h) = viewport.backing_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let scale = viewport.scale as f64;
        if let Err(e) = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0) {
            log::warn!("Failed to set canvas transform: {:?}", e);
        }
        log::debug!(
            "Canvas resized to {}x{} (scale {})",
            viewport.width,
            viewport.height,
            viewport.scale
        );
        viewport
    }

    fn circle_path(&self, x: f64, y: f64, radius: f64) {
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU).ok();
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_composite(&mut self, op: Composite) {
        self.ctx.set_global_composite_operation(op.as_str()).ok();
    }

    fn set_fill_color(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_fill_gradient(&mut self, g: &RadialGradient) {
        let gradient = match self.ctx.create_radial_gradient(
            g.x,
            g.y,
            g.inner_radius,
            g.x,
            g.y,
            g.outer_radius.max(g.inner_radius),
        ) {
            Ok(gradient) => gradient,
            Err(e) => {
                log::warn!("Failed to create radial gradient: {:?}", e);
                return;
            }
        };
        for (offset, color) in g.stops {
            gradient.add_color_stop(*offset, color).ok();
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.circle_path(x, y, radius);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.circle_path(x, y, radius);
        self.ctx.stroke();
    }

    fn clip_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.circle_path(x, y, radius);
        self.ctx.clip();
    }

    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64, font: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.fill_text(text, x, y).ok();
    }
}
