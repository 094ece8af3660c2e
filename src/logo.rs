//! The rounded-rect-plus-logo drawable and its copy-on-write constant
//! state.
//!
//! A [`LogoDrawable`] paints a filled (optionally round-cornered) rectangle
//! across its bounds and centers an optional child drawable — the logo — on
//! top of it. All paint-level properties live in a [`LogoState`] snapshot
//! shared between the drawable and every sibling spawned from its constant
//! state; [`Drawable::mutate`] forces a private copy before diverging.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::canvas::Canvas;
use crate::density::{resolve_density, scale_pixels, scale_pixels_f, DENSITY_DEFAULT};
use crate::drawable::{ConstantState, Drawable, DrawableCallback, SharedDrawable};
use crate::geom::{Rect, RectF};
use crate::inflate::{AttributeSet, InflateError, Resources, StyledAttributes};
use crate::paint::{resolve_opacity, Color, ColorFilter, Opacity, Paint};

/// Exclusive reference to the nested logo drawable, tagged with the density
/// it was created for.
struct ChildRef {
    drawable: SharedDrawable,
    density: i32,
}

impl ChildRef {
    fn new(drawable: SharedDrawable, density: i32) -> Self {
        Self { drawable, density }
    }

    /// Clone the child for a new owning state.
    ///
    /// Normally spawns a fresh drawable from the child's constant state and
    /// copies over bounds and level. A child without constant-state support
    /// cannot be cloned; it is then shared uncloned — degraded sharing, with
    /// a warning if it visibly still belongs to another owner.
    fn clone_for(
        &self,
        owner: &Weak<dyn DrawableCallback>,
        resources: Option<&dyn Resources>,
    ) -> Self {
        let (constant_state, bounds, level, has_owner) = {
            let source = self.drawable.borrow();
            (
                source.constant_state(),
                source.bounds(),
                source.level(),
                source.callback().is_some(),
            )
        };

        let clone = match constant_state {
            Some(cs) => {
                let spawned = match resources {
                    Some(res) => cs.new_drawable_with_resources(res),
                    None => cs.new_drawable(),
                };
                {
                    let mut d = spawned.borrow_mut();
                    d.set_bounds(bounds);
                    d.set_level(level);
                }
                spawned
            }
            None => {
                if has_owner {
                    log::warn!(
                        "drawable added to a LogoDrawable already belongs to another owner \
                         but does not expose a constant state; sharing it uncloned"
                    );
                }
                Rc::clone(&self.drawable)
            }
        };

        // Set the callback last so invalidation cannot fire into the new
        // owner before its state is in place.
        clone.borrow_mut().set_callback(Some(owner.clone()));

        let density = resolve_density(resources.map(|r| r.density_dpi()), self.density);
        Self::new(clone, density)
    }
}

/// The shareable snapshot behind one or more [`LogoDrawable`]s.
///
/// Invariant: at most one of the radius representations is authoritative.
/// Setting the uniform radius clears the per-corner array and vice versa.
pub struct LogoState {
    paint: Paint,
    /// Uniform corner radius in device pixels. 0 means square corners.
    radius: f32,
    /// Per-corner `(x, y)` radii, clockwise from top-left. Overrides
    /// `radius` when set.
    radii: Option<[f32; 8]>,
    /// Density the radius values are expressed at.
    density: i32,
    child: Option<ChildRef>,
    changing_configurations: u32,
    child_changing_configurations: u32,
    /// Memoized opacity; cleared whenever something it depends on changes.
    opacity: Cell<Option<Opacity>>,
}

impl LogoState {
    fn new() -> Self {
        Self {
            paint: Paint::default(),
            radius: 0.0,
            radii: None,
            density: DENSITY_DEFAULT,
            child: None,
            changing_configurations: 0,
            child_changing_configurations: 0,
            opacity: Cell::new(None),
        }
    }

    /// Deep-copy this state for a (possibly different) density, cloning the
    /// child through its constant state and rescaling radius values iff the
    /// density changed.
    fn clone_for(
        &self,
        owner: &Weak<dyn DrawableCallback>,
        resources: Option<&dyn Resources>,
    ) -> Self {
        let density = resolve_density(resources.map(|r| r.density_dpi()), self.density);
        let mut copy = Self {
            paint: self.paint.clone(),
            radius: self.radius,
            radii: self.radii,
            density,
            child: self.child.as_ref().map(|c| c.clone_for(owner, resources)),
            changing_configurations: self.changing_configurations,
            child_changing_configurations: self.child_changing_configurations,
            opacity: Cell::new(self.opacity.get()),
        };
        if self.density != density {
            copy.apply_density_scaling(self.density, density);
        }
        copy
    }

    fn apply_density_scaling(&mut self, source: i32, target: i32) {
        if self.radius > 0.0 {
            self.radius = scale_pixels_f(self.radius, source, target);
        }
        if let Some(radii) = &mut self.radii {
            for r in radii.iter_mut() {
                // Radii are whole device pixels after inflation; scale with
                // the clamping integer form so none of them collapse to 0.
                #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                {
                    *r = scale_pixels(*r as i32, source, target) as f32;
                }
            }
        }
    }

    fn set_corner_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
        self.radii = None;
        self.invalidate_cache();
    }

    fn set_corner_radii(&mut self, radii: Option<[f32; 8]>) {
        self.radii = radii;
        self.radius = 0.0;
        self.invalidate_cache();
    }

    fn set_density(&mut self, target: i32) {
        if self.density != target {
            let source = self.density;
            self.density = target;
            self.apply_density_scaling(source, target);
        }
    }

    /// Opacity of the state as drawn: transparent without a child,
    /// otherwise the child's opacity resolved against the background's.
    fn opacity(&self) -> Opacity {
        if let Some(memo) = self.opacity.get() {
            return memo;
        }
        let Some(child) = &self.child else {
            self.opacity.set(Some(Opacity::Transparent));
            return Opacity::Transparent;
        };
        let resolved = resolve_opacity(child.drawable.borrow().opacity(), self.background_opacity());
        self.opacity.set(Some(resolved));
        resolved
    }

    /// Opacity of the background fill alone.
    fn background_opacity(&self) -> Opacity {
        if !self.paint.would_draw() {
            Opacity::Transparent
        } else if self.paint.shader.is_none()
            && self.paint.alpha() == 0xFF
            && self.radius <= 0.0
            && self.radii.is_none()
        {
            // An opaque fill with square corners covers every pixel.
            Opacity::Opaque
        } else {
            Opacity::Translucent
        }
    }

    fn invalidate_cache(&self) {
        self.opacity.set(None);
    }

    fn changing_configurations(&self) -> u32 {
        self.changing_configurations | self.child_changing_configurations
    }
}

/// Forwards invalidation from the child: clears the owning state's opacity
/// memo and notifies the host callback, if any.
struct ChildForwarder {
    state: RefCell<Weak<RefCell<LogoState>>>,
    host: RefCell<Option<Weak<dyn DrawableCallback>>>,
}

impl DrawableCallback for ChildForwarder {
    fn invalidate_drawable(&self) {
        if let Some(state) = self.state.borrow().upgrade() {
            state.borrow().invalidate_cache();
        }
        if let Some(host) = self.host.borrow().as_ref().and_then(Weak::upgrade) {
            host.invalidate_drawable();
        }
    }
}

/// A drawable with a (rounded) rectangle background and a centered logo.
///
/// Create one empty with [`new`](LogoDrawable::new) and configure it through
/// the setters, or inflate it from declarative attributes with
/// [`from_attributes`](LogoDrawable::from_attributes). Cloning goes through
/// [`Drawable::constant_state`]: spawned drawables share this drawable's
/// state until one of them calls [`Drawable::mutate`].
pub struct LogoDrawable {
    state: Rc<RefCell<LogoState>>,
    /// Installed as the child's callback; re-pointed when the state is
    /// swapped for a private copy.
    forwarder: Rc<ChildForwarder>,
    mutated: bool,
    bounds: Rect,
    visible: bool,
    callback: Option<Weak<dyn DrawableCallback>>,
}

impl Default for LogoDrawable {
    fn default() -> Self {
        Self::new()
    }
}

impl LogoDrawable {
    /// Create an empty drawable: square corners, default (opaque black)
    /// fill, no logo.
    #[must_use]
    pub fn new() -> Self {
        Self::from_state(Rc::new(RefCell::new(LogoState::new())))
    }

    fn from_state(state: Rc<RefCell<LogoState>>) -> Self {
        let forwarder = Rc::new(ChildForwarder {
            state: RefCell::new(Rc::downgrade(&state)),
            host: RefCell::new(None),
        });
        Self {
            state,
            forwarder,
            mutated: false,
            bounds: Rect::default(),
            visible: true,
            callback: None,
        }
    }

    /// Inflate a drawable from an attribute set.
    ///
    /// Recognized attributes: `radius`, `topLeftRadius`, `topRightRadius`,
    /// `bottomLeftRadius`, `bottomRightRadius` (dimensions; the per-corner
    /// values default to `radius`), `drawable` (a resource reference for
    /// the logo), and `color`.
    ///
    /// # Errors
    ///
    /// Any attribute decode failure or resource-resolution failure is fatal
    /// and propagates.
    pub fn from_attributes(
        resources: &dyn Resources,
        attrs: &AttributeSet,
    ) -> Result<Self, InflateError> {
        let mut drawable = Self::new();
        drawable.inflate(resources, attrs)?;
        Ok(drawable)
    }

    /// Populate this drawable from an attribute set. See
    /// [`from_attributes`](Self::from_attributes).
    ///
    /// # Errors
    ///
    /// Any attribute decode failure or resource-resolution failure is fatal
    /// and propagates.
    pub fn inflate(
        &mut self,
        resources: &dyn Resources,
        attrs: &AttributeSet,
    ) -> Result<(), InflateError> {
        let density = resolve_density(Some(resources.density_dpi()), 0);
        self.state.borrow_mut().set_density(density);

        let a = StyledAttributes::obtain(resources, attrs);

        let radius = a.dimension_pixel_size("radius", 0)?;
        // Radii fit comfortably in f32.
        #[expect(clippy::cast_precision_loss)]
        self.set_corner_radius(radius as f32);

        let top_left = a.dimension_pixel_size("topLeftRadius", radius)?;
        let top_right = a.dimension_pixel_size("topRightRadius", radius)?;
        let bottom_left = a.dimension_pixel_size("bottomLeftRadius", radius)?;
        let bottom_right = a.dimension_pixel_size("bottomRightRadius", radius)?;
        if top_left != radius
            || top_right != radius
            || bottom_left != radius
            || bottom_right != radius
        {
            // Clockwise order starting at the top-left corner.
            #[expect(clippy::cast_precision_loss)]
            self.set_corner_radii(Some([
                top_left as f32,
                top_left as f32,
                top_right as f32,
                top_right as f32,
                bottom_right as f32,
                bottom_right as f32,
                bottom_left as f32,
                bottom_left as f32,
            ]));
        }

        if let Some(child) = a.drawable("drawable")? {
            self.set_child(child);
        }

        let mut state = self.state.borrow_mut();
        let current = state.paint.color;
        state.paint.color = a.color("color", current)?;
        state.invalidate_cache();
        Ok(())
    }

    /// Install a logo drawable, replacing any existing one. The child's
    /// invalidation callback is taken over by this drawable.
    pub fn set_child(&mut self, child: SharedDrawable) {
        let density = self.state.borrow().density;
        let forwarder: Rc<dyn DrawableCallback> = self.forwarder.clone();
        child
            .borrow_mut()
            .set_callback(Some(Rc::downgrade(&forwarder)));
        let mut state = self.state.borrow_mut();
        state.child_changing_configurations = child.borrow().changing_configurations();
        state.child = Some(ChildRef::new(child, density));
        state.invalidate_cache();
        drop(state);
        self.invalidate_self();
    }

    /// The logo drawable, if one is installed.
    #[must_use]
    pub fn child(&self) -> Option<SharedDrawable> {
        self.state
            .borrow()
            .child
            .as_ref()
            .map(|c| Rc::clone(&c.drawable))
    }

    /// Set the background fill color.
    pub fn set_color(&mut self, color: Color) {
        {
            let mut state = self.state.borrow_mut();
            state.paint.color = color;
            state.invalidate_cache();
        }
        self.invalidate_self();
    }

    /// The background fill color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.state.borrow().paint.color
    }

    /// Set a uniform corner radius, clearing any per-corner radii. Negative
    /// values clamp to 0.
    pub fn set_corner_radius(&mut self, radius: f32) {
        self.state.borrow_mut().set_corner_radius(radius);
        self.invalidate_self();
    }

    /// Set per-corner `(x, y)` radii in clockwise order starting top-left,
    /// clearing the uniform radius. `None` restores square corners.
    pub fn set_corner_radii(&mut self, radii: Option<[f32; 8]>) {
        self.state.borrow_mut().set_corner_radii(radii);
        self.invalidate_self();
    }

    /// The uniform corner radius. 0 when square or when per-corner radii
    /// are authoritative.
    #[must_use]
    pub fn corner_radius(&self) -> f32 {
        self.state.borrow().radius
    }

    /// The per-corner radii, if they are authoritative.
    #[must_use]
    pub fn corner_radii(&self) -> Option<[f32; 8]> {
        self.state.borrow().radii
    }

    /// The density this drawable's dimension values are expressed at.
    #[must_use]
    pub fn density(&self) -> i32 {
        self.state.borrow().density
    }

    fn invalidate_self(&self) {
        if let Some(cb) = self.callback() {
            cb.invalidate_drawable();
        }
    }

    #[cfg(test)]
    fn state_rc(&self) -> Rc<RefCell<LogoState>> {
        Rc::clone(&self.state)
    }
}

struct LogoConstantState {
    state: Rc<RefCell<LogoState>>,
}

impl ConstantState for LogoConstantState {
    fn new_drawable(&self) -> SharedDrawable {
        // Same density: the state is shared outright, copy-on-write.
        Rc::new(RefCell::new(LogoDrawable::from_state(Rc::clone(
            &self.state,
        ))))
    }

    fn new_drawable_with_resources(&self, resources: &dyn Resources) -> SharedDrawable {
        let target = resolve_density(Some(resources.density_dpi()), self.state.borrow().density);
        if target == self.state.borrow().density {
            return self.new_drawable();
        }
        // Differing density forces a private, rescaled copy up front.
        let state = Rc::new(RefCell::new(LogoState::new()));
        let drawable = LogoDrawable::from_state(state);
        let forwarder: Rc<dyn DrawableCallback> = drawable.forwarder.clone();
        let copy = self
            .state
            .borrow()
            .clone_for(&Rc::downgrade(&forwarder), Some(resources));
        *drawable.state.borrow_mut() = copy;
        Rc::new(RefCell::new(drawable))
    }

    fn changing_configurations(&self) -> u32 {
        self.state.borrow().changing_configurations()
    }
}

impl Drawable for LogoDrawable {
    fn draw(&self, canvas: &mut dyn Canvas) {
        let bounds = self.bounds;
        if bounds.is_empty() {
            return;
        }
        let state = self.state.borrow();
        let rect = RectF::from(bounds);

        // Background first.
        if let Some(radii) = &state.radii {
            canvas.fill_round_rect_radii(rect, radii, &state.paint);
        } else if state.radius > 0.0 {
            let radius = state.radius.min(rect.width().min(rect.height()) * 0.5);
            canvas.fill_round_rect(rect, radius, radius, &state.paint);
        } else if state.paint.would_draw() {
            canvas.fill_rect(rect, &state.paint);
        }

        // Then the logo, centered by its own intrinsic size.
        if let Some(child) = &state.child {
            let drawable = &child.drawable;
            let (w, h) = {
                let d = drawable.borrow();
                (d.intrinsic_width(), d.intrinsic_height())
            };
            let left = bounds.center_x() - w / 2;
            let top = bounds.center_y() - h / 2;
            drawable
                .borrow_mut()
                .set_bounds(Rect::new(left, top, left + w, top + h));
            drawable.borrow().draw(canvas);
        }
    }

    fn set_bounds(&mut self, bounds: Rect) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.invalidate_self();
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_alpha(&mut self, alpha: u8) {
        if self.state.borrow().paint.alpha() == alpha {
            return;
        }
        // Release the state borrow before calling into the child: its
        // invalidation callback re-enters the state.
        let child = {
            let mut state = self.state.borrow_mut();
            state.paint.set_alpha(alpha);
            state.child.as_ref().map(|c| Rc::clone(&c.drawable))
        };
        if let Some(child) = child {
            child.borrow_mut().set_alpha(alpha);
        }
        self.state.borrow().invalidate_cache();
        self.invalidate_self();
    }

    fn alpha(&self) -> u8 {
        self.state.borrow().paint.alpha()
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        // See set_alpha for the borrow discipline.
        let child = {
            let mut state = self.state.borrow_mut();
            state.paint.color_filter = filter;
            state.child.as_ref().map(|c| Rc::clone(&c.drawable))
        };
        if let Some(child) = child {
            child.borrow_mut().set_color_filter(filter);
        }
        self.state.borrow().invalidate_cache();
        self.invalidate_self();
    }

    fn color_filter(&self) -> Option<ColorFilter> {
        self.state.borrow().paint.color_filter
    }

    fn opacity(&self) -> Opacity {
        self.state.borrow().opacity()
    }

    fn is_stateful(&self) -> bool {
        let state = self.state.borrow();
        state
            .child
            .as_ref()
            .is_some_and(|c| c.drawable.borrow().is_stateful())
    }

    fn set_state(&mut self, view_state: &[i32]) -> bool {
        let state = self.state.borrow();
        let Some(child) = &state.child else {
            return false;
        };
        let drawable = Rc::clone(&child.drawable);
        drop(state);
        let mut d = drawable.borrow_mut();
        d.is_stateful() && d.set_state(view_state)
    }

    fn set_level(&mut self, level: i32) -> bool {
        let state = self.state.borrow();
        let Some(child) = &state.child else {
            return false;
        };
        let drawable = Rc::clone(&child.drawable);
        drop(state);
        let mut d = drawable.borrow_mut();
        d.set_level(level)
    }

    fn set_visible(&mut self, visible: bool, restart: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        let state = self.state.borrow();
        if let Some(child) = &state.child {
            child.drawable.borrow_mut().set_visible(visible, restart);
        }
        changed
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        *self.forwarder.host.borrow_mut() = callback.clone();
        self.callback = callback;
    }

    fn callback(&self) -> Option<Rc<dyn DrawableCallback>> {
        self.callback.as_ref().and_then(Weak::upgrade)
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(Rc::new(LogoConstantState {
            state: Rc::clone(&self.state),
        }))
    }

    fn mutate(&mut self) {
        if self.mutated {
            return;
        }
        let forwarder: Rc<dyn DrawableCallback> = self.forwarder.clone();
        let private = self
            .state
            .borrow()
            .clone_for(&Rc::downgrade(&forwarder), None);
        self.state = Rc::new(RefCell::new(private));
        *self.forwarder.state.borrow_mut() = Rc::downgrade(&self.state);
        if let Some(child) = &self.state.borrow().child {
            child.drawable.borrow_mut().mutate();
        }
        self.mutated = true;
    }

    fn changing_configurations(&self) -> u32 {
        self.state.borrow().changing_configurations()
    }
}

/// Registry factory for the `logo` (and `placeholder`) tags.
pub(crate) fn inflate_logo(
    resources: &dyn Resources,
    attrs: &AttributeSet,
) -> Result<SharedDrawable, InflateError> {
    LogoDrawable::from_attributes(resources, attrs)
        .map(|d| Rc::new(RefCell::new(d)) as SharedDrawable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::image::{Image, ImageDrawable};
    use crate::paint::{Color, Shader};

    struct TestResources {
        density: i32,
    }

    impl Resources for TestResources {
        fn density_dpi(&self) -> i32 {
            self.density
        }

        fn load_drawable(&self, reference: &str) -> Result<SharedDrawable, InflateError> {
            if reference == "@drawable/logo" {
                Ok(shared_image(40, 40))
            } else {
                Err(InflateError::Resource {
                    reference: reference.to_owned(),
                    message: "unknown reference".to_owned(),
                })
            }
        }
    }

    fn shared_image(width: u32, height: u32) -> SharedDrawable {
        let image = Image::from_rgba(vec![0xFF; (width * height * 4) as usize], width, height)
            .expect("valid test image");
        Rc::new(RefCell::new(ImageDrawable::new(image)))
    }

    #[test]
    fn radius_setters_are_mutually_exclusive() {
        let mut drawable = LogoDrawable::new();
        drawable.set_corner_radius(10.0);
        assert!((drawable.corner_radius() - 10.0).abs() < f32::EPSILON);
        assert!(drawable.corner_radii().is_none());

        drawable.set_corner_radii(Some([5.0; 8]));
        assert_eq!(drawable.corner_radii(), Some([5.0; 8]));
        assert!(drawable.corner_radius().abs() < f32::EPSILON);

        drawable.set_corner_radius(-3.0);
        assert!(drawable.corner_radius().abs() < f32::EPSILON);
        assert!(drawable.corner_radii().is_none());
    }

    #[test]
    fn inflate_reads_the_schema() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([
            ("radius", "10px"),
            ("drawable", "@drawable/logo"),
            ("color", "#336699"),
        ]);
        let drawable = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        assert!((drawable.corner_radius() - 10.0).abs() < f32::EPSILON);
        assert!(drawable.corner_radii().is_none());
        assert!(drawable.child().is_some());
        assert_eq!(drawable.color(), Color(0xFF33_6699));
    }

    #[test]
    fn inflate_scales_dp_radii_by_density() {
        let res = TestResources { density: 320 };
        let attrs = AttributeSet::from_pairs([("radius", "10dp")]);
        let drawable = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        // 10dp declared for a 320dpi display is 20 device pixels.
        assert!((drawable.corner_radius() - 20.0).abs() < f32::EPSILON);
        assert_eq!(drawable.density(), 320);
    }

    #[test]
    fn per_corner_overrides_expand_clockwise_from_top_left() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([("radius", "10"), ("topLeftRadius", "5")]);
        let drawable = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        assert_eq!(
            drawable.corner_radii(),
            Some([5.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0])
        );
        assert!(drawable.corner_radius().abs() < f32::EPSILON);
    }

    #[test]
    fn uniform_corners_keep_the_uniform_representation() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([("radius", "10"), ("topLeftRadius", "10")]);
        let drawable = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        assert!(drawable.corner_radii().is_none());
        assert!((drawable.corner_radius() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_attributes_are_fatal() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([("radius", "ten")]);
        assert!(matches!(
            LogoDrawable::from_attributes(&res, &attrs),
            Err(InflateError::InvalidDimension { .. })
        ));

        let attrs = AttributeSet::from_pairs([("drawable", "@drawable/nope")]);
        assert!(matches!(
            LogoDrawable::from_attributes(&res, &attrs),
            Err(InflateError::Resource { .. })
        ));
    }

    #[test]
    fn empty_bounds_draw_nothing() {
        let drawable = LogoDrawable::new();
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn uniform_radius_clamps_to_half_the_shorter_side() {
        let mut drawable = LogoDrawable::new();
        drawable.set_corner_radius(100.0);
        drawable.set_bounds(Rect::new(0, 0, 40, 20));
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let [DrawOp::RoundRect { rx, ry, .. }] = canvas.ops() else {
            panic!("expected a single round-rect op");
        };
        assert!((rx - 10.0).abs() < f32::EPSILON);
        assert!((ry - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn per_corner_radii_draw_as_a_radii_rect() {
        let mut drawable = LogoDrawable::new();
        let radii = [5.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        drawable.set_corner_radii(Some(radii));
        drawable.set_bounds(Rect::new(0, 0, 100, 100));
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let [DrawOp::RoundRectRadii { radii: drawn, .. }] = canvas.ops() else {
            panic!("expected a single radii op");
        };
        assert_eq!(*drawn, radii);
    }

    #[test]
    fn transparent_paint_without_shader_skips_the_background() {
        let mut drawable = LogoDrawable::new();
        drawable.state.borrow_mut().paint.color = Color::TRANSPARENT;
        drawable.set_bounds(Rect::new(0, 0, 10, 10));
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(canvas.ops().is_empty());

        drawable.state.borrow_mut().paint.shader =
            Some(Shader::VerticalGradient(Color::BLACK, Color::TRANSPARENT));
        drawable.draw(&mut canvas);
        assert!(matches!(canvas.ops(), [DrawOp::Rect { .. }]));
    }

    #[test]
    fn child_is_centered_by_its_intrinsic_size() {
        let mut drawable = LogoDrawable::new();
        drawable.set_child(shared_image(40, 40));
        drawable.set_bounds(Rect::new(0, 0, 100, 100));
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let [DrawOp::Rect { .. }, DrawOp::Image { dst, .. }] = canvas.ops() else {
            panic!("expected background then image");
        };
        assert_eq!(*dst, RectF::new(30.0, 30.0, 70.0, 70.0));
        assert_eq!(
            drawable.child().expect("child installed").borrow().bounds(),
            Rect::new(30, 30, 70, 70)
        );
    }

    #[test]
    fn same_density_clone_shares_the_state() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([("radius", "10"), ("topLeftRadius", "5")]);
        let original = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        let cs = original.constant_state().expect("constant state");

        let sibling = cs.new_drawable_with_resources(&TestResources { density: 160 });
        // Radii are byte-for-byte identical because nothing was copied:
        // writes through the sibling land in the shared state.
        sibling.borrow_mut().set_alpha(0x42);
        assert_eq!(original.alpha(), 0x42, "state is shared until mutate()");
        assert_eq!(
            original.corner_radii(),
            Some([5.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0])
        );
    }

    #[test]
    fn cross_density_clone_rescales_radii() {
        let res = TestResources { density: 160 };
        let attrs = AttributeSet::from_pairs([("radius", "10"), ("topLeftRadius", "5")]);
        let original = LogoDrawable::from_attributes(&res, &attrs).expect("inflates");
        let cs = original.constant_state().expect("constant state");

        // Compare the radii that actually reach the canvas after the copy.
        let scaled = cs.new_drawable_with_resources(&TestResources { density: 320 });
        let mut canvas = RecordingCanvas::new();
        scaled.borrow_mut().set_bounds(Rect::new(0, 0, 200, 200));
        scaled.borrow().draw(&mut canvas);
        let [DrawOp::RoundRectRadii { radii, .. }] = canvas.ops() else {
            panic!("expected a radii op");
        };
        assert_eq!(*radii, [10.0, 10.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn mutate_is_idempotent_and_detaches() {
        let mut original = LogoDrawable::new();
        original.set_child(shared_image(8, 8));
        let cs = original.constant_state().expect("constant state");
        let sibling = cs.new_drawable();

        original.mutate();
        let first = original.state_rc();
        original.mutate();
        assert!(
            Rc::ptr_eq(&first, &original.state_rc()),
            "second mutate() must keep the private state"
        );

        original.set_alpha(0x10);
        assert_eq!(sibling.borrow().alpha(), 0xFF);
    }

    #[test]
    fn opacity_is_memoized_and_invalidated() {
        let mut drawable = LogoDrawable::new();
        assert_eq!(drawable.opacity(), Opacity::Transparent);

        drawable.set_child(shared_image(8, 8));
        // set_child cleared the memo; opaque child over an opaque square
        // background resolves opaque.
        assert_eq!(drawable.opacity(), Opacity::Opaque);
        assert_eq!(drawable.state.borrow().opacity.get(), Some(Opacity::Opaque));

        drawable.set_alpha(0x80);
        assert_eq!(drawable.state.borrow().opacity.get(), None);
        assert_eq!(drawable.opacity(), Opacity::Translucent);
    }

    #[test]
    fn rounded_background_is_never_opaque() {
        let mut drawable = LogoDrawable::new();
        drawable.set_child(shared_image(8, 8));
        drawable.set_corner_radius(4.0);
        assert_eq!(drawable.opacity(), Opacity::Translucent);
    }

    #[test]
    fn alpha_and_filter_propagate_to_the_child() {
        let mut drawable = LogoDrawable::new();
        let child = shared_image(8, 8);
        drawable.set_child(Rc::clone(&child));

        drawable.set_alpha(0x77);
        assert_eq!(child.borrow().alpha(), 0x77);

        let filter = ColorFilter {
            color: Color::argb(0xFF, 0x00, 0xFF, 0x00),
        };
        drawable.set_color_filter(Some(filter));
        assert_eq!(child.borrow().color_filter(), Some(filter));
    }

    /// A drawable with no constant state, for the degraded-sharing path.
    struct Unclonable {
        bounds: Rect,
        callback: Option<Weak<dyn DrawableCallback>>,
    }

    impl Drawable for Unclonable {
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
            Opacity::Translucent
        }
        fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
            self.callback = callback;
        }
        fn callback(&self) -> Option<Rc<dyn DrawableCallback>> {
            self.callback.as_ref().and_then(Weak::upgrade)
        }
    }

    #[test]
    fn unclonable_child_falls_back_to_degraded_sharing() {
        let mut original = LogoDrawable::new();
        let child: SharedDrawable = Rc::new(RefCell::new(Unclonable {
            bounds: Rect::default(),
            callback: None,
        }));
        original.set_child(Rc::clone(&child));

        // Forcing a private copy clones the state but must reuse the
        // unclonable child instance.
        original.mutate();
        let kept = original.child().expect("child survives the copy");
        assert!(Rc::ptr_eq(&kept, &child));
    }

    #[test]
    fn child_invalidation_clears_the_opacity_memo() {
        let mut drawable = LogoDrawable::new();
        let child = shared_image(8, 8);
        drawable.set_child(Rc::clone(&child));
        assert_eq!(drawable.opacity(), Opacity::Opaque);

        // The child reports a change through its callback.
        let cb = child.borrow().callback().expect("forwarder installed");
        cb.invalidate_drawable();
        assert_eq!(drawable.state.borrow().opacity.get(), None);
    }

    #[test]
    fn level_and_state_delegate_to_the_child() {
        let mut drawable = LogoDrawable::new();
        assert!(!drawable.set_level(5000));
        assert!(!drawable.set_state(&[1]));
        assert!(!drawable.is_stateful());

        drawable.set_child(shared_image(8, 8));
        // The image child is not stateful and ignores levels.
        assert!(!drawable.set_level(5000));
        assert!(!drawable.set_state(&[1]));
        assert!(!drawable.is_stateful());
        assert_eq!(
            drawable.child().expect("child installed").borrow().level(),
            5000
        );
    }
}
