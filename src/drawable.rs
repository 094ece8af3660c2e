//! The drawable contract: a paintable object with bounds, paint-level
//! properties, and a cloning factory backed by a shared constant state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::canvas::Canvas;
use crate::geom::Rect;
use crate::inflate::Resources;
use crate::paint::{ColorFilter, Opacity};

/// A drawable held behind shared single-threaded ownership.
///
/// Children of composite drawables are stored this way so that a drawable
/// without constant-state support can be shared between owners as a
/// degraded fallback instead of failing to clone.
pub type SharedDrawable = Rc<RefCell<dyn Drawable>>;

/// Receiver for invalidation originating inside a drawable.
///
/// Hosts install one to learn when a drawable needs repainting; composite
/// drawables install one on their children to forward invalidation upward.
pub trait DrawableCallback {
    /// The drawable's pixels are stale and it should be redrawn.
    fn invalidate_drawable(&self);
}

/// The shareable snapshot behind a drawable, and the factory for spawning
/// further drawables that reference it.
pub trait ConstantState {
    /// Spawn a new drawable sharing this state, at the state's density.
    fn new_drawable(&self) -> SharedDrawable;

    /// Spawn a new drawable for the given resources. If the resources
    /// report a different density, dimension values are rescaled into a
    /// copy; otherwise this is equivalent to [`new_drawable`].
    ///
    /// [`new_drawable`]: ConstantState::new_drawable
    fn new_drawable_with_resources(&self, resources: &dyn Resources) -> SharedDrawable;

    /// Configuration-change bits under which this state must be rebuilt.
    fn changing_configurations(&self) -> u32;
}

/// A paintable object: the surface contract this crate produces.
///
/// Mirrors the classic UI-toolkit drawable interface: a draw pass over a
/// bounds rectangle, alpha/color-filter/opacity plumbing, state and level
/// hooks for stateful children, and copy-on-write cloning through
/// [`ConstantState`].
pub trait Drawable {
    /// Paint this drawable into its current bounds.
    fn draw(&self, canvas: &mut dyn Canvas);

    /// Set the rectangle the drawable must paint within.
    fn set_bounds(&mut self, bounds: Rect);

    /// The rectangle the drawable paints within.
    fn bounds(&self) -> Rect;

    /// Natural width in device pixels, or -1 if the drawable has none.
    fn intrinsic_width(&self) -> i32 {
        -1
    }

    /// Natural height in device pixels, or -1 if the drawable has none.
    fn intrinsic_height(&self) -> i32 {
        -1
    }

    /// Set the overall alpha, 0 (invisible) to 255 (fully visible).
    fn set_alpha(&mut self, alpha: u8);

    /// The current overall alpha.
    fn alpha(&self) -> u8 {
        255
    }

    /// Install or clear a color filter applied to everything drawn.
    fn set_color_filter(&mut self, filter: Option<ColorFilter>);

    /// The installed color filter, if any.
    fn color_filter(&self) -> Option<ColorFilter> {
        None
    }

    /// How fully this drawable covers its bounds.
    fn opacity(&self) -> Opacity;

    /// Whether [`set_state`](Drawable::set_state) can change the rendering.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Supply the owning view's state set (pressed, focused, ...).
    ///
    /// Returns true if the change requires a redraw.
    fn set_state(&mut self, _state: &[i32]) -> bool {
        false
    }

    /// Supply the owning view's level, `0..=10000`.
    ///
    /// Returns true if the change requires a redraw.
    fn set_level(&mut self, _level: i32) -> bool {
        false
    }

    /// The current level.
    fn level(&self) -> i32 {
        0
    }

    /// Set whether the drawable is visible.
    ///
    /// Returns true if the visibility changed.
    fn set_visible(&mut self, _visible: bool, _restart: bool) -> bool {
        false
    }

    /// Install or clear the invalidation callback. Stored weakly; the
    /// drawable never keeps its owner alive.
    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>);

    /// The current callback, if the owner is still alive.
    fn callback(&self) -> Option<Rc<dyn DrawableCallback>>;

    /// The shared snapshot behind this drawable, if it supports cloning.
    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        None
    }

    /// Force this drawable onto a private copy of its state, so later
    /// property changes stop affecting siblings spawned from the same
    /// constant state. One-way and idempotent.
    fn mutate(&mut self) {}

    /// Configuration-change bits under which this drawable must be
    /// reinflated.
    fn changing_configurations(&self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;

    struct Inert {
        bounds: Rect,
    }

    impl Drawable for Inert {
        fn draw(&self, _canvas: &mut dyn Canvas) {}
        fn set_bounds(&mut self, bounds: Rect) {
            self.bounds = bounds;
        }
        fn bounds(&self) -> Rect {
            self.bounds
        }
        fn set_alpha(&mut self, _alpha: u8) {}
        fn set_color_filter(&mut self, _filter: Option<ColorFilter>) {}
        fn opacity(&self) -> Opacity {
            Opacity::Transparent
        }
        fn set_callback(&mut self, _callback: Option<Weak<dyn DrawableCallback>>) {}
        fn callback(&self) -> Option<Rc<dyn DrawableCallback>> {
            None
        }
    }

    #[test]
    fn contract_defaults() {
        let mut d = Inert {
            bounds: Rect::default(),
        };
        assert_eq!(d.intrinsic_width(), -1);
        assert_eq!(d.intrinsic_height(), -1);
        assert_eq!(d.alpha(), 255);
        assert!(!d.is_stateful());
        assert!(!d.set_state(&[1, 2]));
        assert!(!d.set_level(5000));
        assert!(d.constant_state().is_none());
        assert_eq!(d.changing_configurations(), 0);
        d.draw(&mut RecordingCanvas::new());
    }
}
