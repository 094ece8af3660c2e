//! The surface drawables paint onto.
//!
//! [`Canvas`] is the small command set the draw pass needs; backends
//! implement it over whatever they render with. [`RecordingCanvas`] keeps
//! the commands as data, for headless use and for inspecting a draw pass.

use crate::geom::RectF;
use crate::image::Image;
use crate::paint::Paint;

/// A drawing surface accepting filled rectangles and images.
///
/// All coordinates are in device pixels with the origin at the top left.
pub trait Canvas {
    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: RectF, paint: &Paint);

    /// Fill a rectangle with the same elliptical radius on all four corners.
    fn fill_round_rect(&mut self, rect: RectF, rx: f32, ry: f32, paint: &Paint);

    /// Fill a rectangle with per-corner `(x, y)` radius pairs, given in
    /// clockwise order starting at the top-left corner.
    fn fill_round_rect_radii(&mut self, rect: RectF, radii: &[f32; 8], paint: &Paint);

    /// Draw an image stretched into the destination rectangle.
    ///
    /// The paint's alpha and color filter apply to the sampled pixels.
    fn draw_image(&mut self, image: &Image, dst: RectF, paint: &Paint);
}

/// A single recorded canvas command.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// A [`Canvas::fill_rect`] call.
    Rect {
        /// Destination rectangle.
        rect: RectF,
        /// Paint at the time of the call.
        paint: Paint,
    },
    /// A [`Canvas::fill_round_rect`] call.
    RoundRect {
        /// Destination rectangle.
        rect: RectF,
        /// Corner radius along X.
        rx: f32,
        /// Corner radius along Y.
        ry: f32,
        /// Paint at the time of the call.
        paint: Paint,
    },
    /// A [`Canvas::fill_round_rect_radii`] call.
    RoundRectRadii {
        /// Destination rectangle.
        rect: RectF,
        /// Per-corner `(x, y)` radii, clockwise from top-left.
        radii: [f32; 8],
        /// Paint at the time of the call.
        paint: Paint,
    },
    /// A [`Canvas::draw_image`] call.
    Image {
        /// The image that was drawn (shares the pixel data).
        image: Image,
        /// Destination rectangle.
        dst: RectF,
        /// Paint at the time of the call.
        paint: Paint,
    },
}

/// A canvas that records every command instead of rasterizing.
#[derive(Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// Create an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands recorded so far, in call order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drop all recorded commands.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: RectF, paint: &Paint) {
        self.ops.push(DrawOp::Rect {
            rect,
            paint: paint.clone(),
        });
    }

    fn fill_round_rect(&mut self, rect: RectF, rx: f32, ry: f32, paint: &Paint) {
        self.ops.push(DrawOp::RoundRect {
            rect,
            rx,
            ry,
            paint: paint.clone(),
        });
    }

    fn fill_round_rect_radii(&mut self, rect: RectF, radii: &[f32; 8], paint: &Paint) {
        self.ops.push(DrawOp::RoundRectRadii {
            rect,
            radii: *radii,
            paint: paint.clone(),
        });
    }

    fn draw_image(&mut self, image: &Image, dst: RectF, paint: &Paint) {
        self.ops.push(DrawOp::Image {
            image: image.clone(),
            dst,
            paint: paint.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    #[test]
    fn records_in_call_order() {
        let mut canvas = RecordingCanvas::new();
        let paint = Paint::default();
        canvas.fill_rect(RectF::new(0.0, 0.0, 10.0, 10.0), &paint);
        canvas.fill_round_rect(RectF::new(0.0, 0.0, 10.0, 10.0), 2.0, 2.0, &paint);
        assert_eq!(canvas.ops().len(), 2);
        assert!(matches!(canvas.ops()[0], DrawOp::Rect { .. }));
        assert!(matches!(canvas.ops()[1], DrawOp::RoundRect { .. }));
        canvas.clear();
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn recorded_paint_is_a_snapshot() {
        let mut canvas = RecordingCanvas::new();
        let mut paint = Paint::default();
        canvas.fill_rect(RectF::new(0.0, 0.0, 1.0, 1.0), &paint);
        paint.color = Color::TRANSPARENT;
        let DrawOp::Rect { paint: recorded, .. } = &canvas.ops()[0] else {
            panic!("expected a rect op");
        };
        assert_eq!(recorded.color, Color::BLACK);
    }
}
