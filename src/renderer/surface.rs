//! 2D drawing surface abstraction
//!
//! The scene is described in terms of a handful of Canvas2D-style calls. The
//! browser build draws onto a real canvas; tests and the headless runner use
//! `RecordingSurface`.

/// How new pixels combine with what is already drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Normal painting
    #[default]
    SourceOver,
    /// Subtract: erases existing pixels by the source alpha
    DestinationOut,
    /// Additive blend
    Lighter,
}

impl Composite {
    /// Canvas `globalCompositeOperation` name
    pub fn as_str(&self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
            Composite::Lighter => "lighter",
        }
    }
}

/// Concentric radial gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub x: f64,
    pub y: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// `(offset, css color)` pairs, offsets in `[0, 1]`
    pub stops: &'static [(f32, &'static str)],
}

/// Minimal Canvas2D-like drawing target
///
/// `save`/`restore` cover composite mode, fill/stroke style and clip.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn set_composite(&mut self, op: Composite);
    fn set_fill_color(&mut self, color: &str);
    fn set_fill_gradient(&mut self, gradient: &RadialGradient);
    fn set_stroke_color(&mut self, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64);
    /// Intersect the clip region with a circle
    fn clip_circle(&mut self, x: f64, y: f64, radius: f64);
    /// Draw text horizontally centered on `x` with the current fill
    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64, font: &str);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Composite(Composite),
    FillColor(String),
    FillGradient(RadialGradient),
    StrokeColor(String),
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    FillCircle { x: f64, y: f64, radius: f64 },
    StrokeCircle { x: f64, y: f64, radius: f64 },
    ClipCircle { x: f64, y: f64, radius: f64 },
    Text { text: String, x: f64, y: f64, font: String },
}

/// Surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Index of the first op matching `pred`
    pub fn position(&self, pred: impl Fn(&DrawOp) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn set_composite(&mut self, op: Composite) {
        self.ops.push(DrawOp::Composite(op));
    }

    fn set_fill_color(&mut self, color: &str) {
        self.ops.push(DrawOp::FillColor(color.to_string()));
    }

    fn set_fill_gradient(&mut self, gradient: &RadialGradient) {
        self.ops.push(DrawOp::FillGradient(*gradient));
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ops.push(DrawOp::StrokeColor(color.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::FillRect { x, y, w, h });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::FillCircle { x, y, radius });
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::StrokeCircle { x, y, radius });
    }

    fn clip_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::ClipCircle { x, y, radius });
    }

    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64, font: &str) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: font.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_names() {
        assert_eq!(Composite::default().as_str(), "source-over");
        assert_eq!(Composite::DestinationOut.as_str(), "destination-out");
        assert_eq!(Composite::Lighter.as_str(), "lighter");
    }

    #[test]
    fn test_recording_surface_texts() {
        let mut s = RecordingSurface::new();
        s.fill_rect(0.0, 0.0, 1.0, 1.0);
        s.fill_text_centered("hello", 5.0, 5.0, "10px serif");
        assert_eq!(s.texts(), vec!["hello"]);
        assert_eq!(s.position(|op| matches!(op, DrawOp::Text { .. })), Some(1));
        s.clear();
        assert!(s.ops.is_empty());
    }
}
