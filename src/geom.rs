//! Rectangle types used throughout the crate.
//!
//! [`Rect`] is the integer device-pixel rectangle drawables are bounded by;
//! [`RectF`] is the float rectangle canvases draw with.

/// An axis-aligned rectangle in integer device pixels.
///
/// Follows the half-open convention: `right` and `bottom` are exclusive, so
/// a rectangle with `left == right` or `top == bottom` is empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge, inclusive.
    pub left: i32,
    /// Top edge, inclusive.
    pub top: i32,
    /// Right edge, exclusive.
    pub right: i32,
    /// Bottom edge, exclusive.
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle. Negative if the edges are inverted.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the rectangle. Negative if the edges are inverted.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the rectangle encloses no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Horizontal center, rounded towards the left edge.
    #[must_use]
    pub const fn center_x(&self) -> i32 {
        (self.left + self.right) / 2
    }

    /// Vertical center, rounded towards the top edge.
    #[must_use]
    pub const fn center_y(&self) -> i32 {
        (self.top + self.bottom) / 2
    }
}

/// An axis-aligned rectangle in float coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RectF {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl RectF {
    /// Create a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        // Device-pixel bounds are far below the f32 precision limit.
        #[expect(clippy::cast_precision_loss)]
        Self::new(r.left as f32, r.top as f32, r.right as f32, r.bottom as f32)
    }
}
