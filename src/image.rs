//! Decoded images and [`ImageDrawable`], the standard child drawable kind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::density::{resolve_density, scale_pixels, DENSITY_DEFAULT};
use crate::drawable::{ConstantState, Drawable, DrawableCallback, SharedDrawable};
use crate::geom::Rect;
use crate::inflate::Resources;
use crate::paint::{Color, ColorFilter, Opacity, Paint};

/// A decoded RGBA image, cheaply cloneable (the pixel data is shared).
#[derive(Clone)]
pub struct Image {
    /// The shared pixel data.
    pub data: Arc<ImageData>,
}

/// Pixel storage behind an [`Image`].
pub struct ImageData {
    /// Tightly packed RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether every pixel has full alpha.
    pub opaque: bool,
    /// GL texture name, lazily uploaded. `None` until first draw.
    #[cfg(feature = "glow")]
    pub texture: std::sync::RwLock<Option<glow::Texture>>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.data.width)
            .field("height", &self.data.height)
            .field("opaque", &self.data.opaque)
            .finish()
    }
}

impl Image {
    /// Decode an encoded image (PNG or JPEG) into RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error if the bytes are not a supported image.
    pub fn from_memory(data: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(data)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_parts(img.into_raw(), width, height))
    }

    /// Wrap raw RGBA8 pixel data.
    ///
    /// Returns `None` if the buffer length does not match the dimensions or
    /// either dimension is zero.
    #[must_use]
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height * 4) as usize {
            return None;
        }
        Some(Self::from_parts(pixels, width, height))
    }

    fn from_parts(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        let opaque = pixels.chunks_exact(4).all(|px| px[3] == 0xFF);
        Self {
            data: Arc::new(ImageData {
                pixels,
                width,
                height,
                opaque,
                #[cfg(feature = "glow")]
                texture: std::sync::RwLock::new(None),
            }),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.data.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.data.height
    }
}

/// Shared snapshot behind one or more [`ImageDrawable`]s.
struct ImageState {
    image: Image,
    /// Density the pixel dimensions were authored for.
    density: i32,
    alpha: u8,
    color_filter: Option<ColorFilter>,
    changing_configurations: u32,
}

impl ImageState {
    fn copy(&self) -> Self {
        Self {
            image: self.image.clone(),
            density: self.density,
            alpha: self.alpha,
            color_filter: self.color_filter,
            changing_configurations: self.changing_configurations,
        }
    }
}

/// A drawable that paints a single image stretched into its bounds.
///
/// Its intrinsic size is the pixel size rescaled from the density the image
/// was authored for to the density the drawable is displayed at, so a logo
/// authored at the reference density keeps its physical size on denser
/// screens.
pub struct ImageDrawable {
    state: Rc<RefCell<ImageState>>,
    bounds: Rect,
    /// Density intrinsic dimensions are reported for.
    target_density: i32,
    mutated: bool,
    visible: bool,
    level: i32,
    callback: Option<Weak<dyn DrawableCallback>>,
}

impl ImageDrawable {
    /// Create a drawable for an image authored at the reference density.
    #[must_use]
    pub fn new(image: Image) -> Self {
        Self::with_density(image, DENSITY_DEFAULT)
    }

    /// Create a drawable for an image authored at the given density.
    #[must_use]
    pub fn with_density(image: Image, density: i32) -> Self {
        let density = resolve_density(Some(density), 0);
        Self::from_state(
            Rc::new(RefCell::new(ImageState {
                image,
                density,
                alpha: 0xFF,
                color_filter: None,
                changing_configurations: 0,
            })),
            density,
        )
    }

    fn from_state(state: Rc<RefCell<ImageState>>, target_density: i32) -> Self {
        Self {
            state,
            bounds: Rect::default(),
            target_density,
            mutated: false,
            visible: true,
            level: 0,
            callback: None,
        }
    }

    /// The image this drawable paints.
    #[must_use]
    pub fn image(&self) -> Image {
        self.state.borrow().image.clone()
    }

    fn invalidate_self(&self) {
        if let Some(cb) = self.callback() {
            cb.invalidate_drawable();
        }
    }
}

struct ImageConstantState {
    state: Rc<RefCell<ImageState>>,
}

impl ConstantState for ImageConstantState {
    fn new_drawable(&self) -> SharedDrawable {
        let density = self.state.borrow().density;
        Rc::new(RefCell::new(ImageDrawable::from_state(
            Rc::clone(&self.state),
            density,
        )))
    }

    fn new_drawable_with_resources(&self, resources: &dyn Resources) -> SharedDrawable {
        let density = resolve_density(Some(resources.density_dpi()), self.state.borrow().density);
        Rc::new(RefCell::new(ImageDrawable::from_state(
            Rc::clone(&self.state),
            density,
        )))
    }

    fn changing_configurations(&self) -> u32 {
        self.state.borrow().changing_configurations
    }
}

impl Drawable for ImageDrawable {
    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.bounds.is_empty() {
            return;
        }
        let state = self.state.borrow();
        let paint = Paint {
            color: Color::BLACK.with_alpha(state.alpha),
            shader: None,
            color_filter: state.color_filter,
        };
        canvas.draw_image(&state.image, self.bounds.into(), &paint);
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

    fn intrinsic_width(&self) -> i32 {
        let state = self.state.borrow();
        // Image dimensions fit in i32; decoders reject anything larger.
        #[expect(clippy::cast_possible_wrap)]
        scale_pixels(
            state.image.width() as i32,
            state.density,
            self.target_density,
        )
    }

    fn intrinsic_height(&self) -> i32 {
        let state = self.state.borrow();
        #[expect(clippy::cast_possible_wrap)]
        scale_pixels(
            state.image.height() as i32,
            state.density,
            self.target_density,
        )
    }

    fn set_alpha(&mut self, alpha: u8) {
        if self.state.borrow().alpha != alpha {
            self.state.borrow_mut().alpha = alpha;
            self.invalidate_self();
        }
    }

    fn alpha(&self) -> u8 {
        self.state.borrow().alpha
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.state.borrow_mut().color_filter = filter;
        self.invalidate_self();
    }

    fn color_filter(&self) -> Option<ColorFilter> {
        self.state.borrow().color_filter
    }

    fn opacity(&self) -> Opacity {
        let state = self.state.borrow();
        if state.alpha == 0 {
            Opacity::Transparent
        } else if state.alpha == 0xFF && state.image.data.opaque {
            Opacity::Opaque
        } else {
            Opacity::Translucent
        }
    }

    fn set_level(&mut self, level: i32) -> bool {
        self.level = level;
        false
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn set_visible(&mut self, visible: bool, _restart: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        self.callback = callback;
    }

    fn callback(&self) -> Option<Rc<dyn DrawableCallback>> {
        self.callback.as_ref().and_then(Weak::upgrade)
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(Rc::new(ImageConstantState {
            state: Rc::clone(&self.state),
        }))
    }

    fn mutate(&mut self) {
        if !self.mutated {
            let private = self.state.borrow().copy();
            self.state = Rc::new(RefCell::new(private));
            self.mutated = true;
        }
    }

    fn changing_configurations(&self) -> u32 {
        self.state.borrow().changing_configurations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn checker(width: u32, height: u32) -> Image {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for i in 0..width * height {
            let v = if i % 2 == 0 { 0xFF } else { 0x00 };
            pixels.extend_from_slice(&[v, v, v, 0xFF]);
        }
        Image::from_rgba(pixels, width, height).expect("valid dimensions")
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(Image::from_rgba(vec![0; 3], 1, 1).is_none());
        assert!(Image::from_rgba(vec![0; 4], 0, 1).is_none());
        assert!(Image::from_rgba(vec![0; 4], 1, 1).is_some());
    }

    #[test]
    fn png_round_trip_decodes() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut encoded = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut encoded, image::ImageFormat::Png)
            .expect("png encoding");

        let decoded = Image::from_memory(encoded.get_ref()).expect("png decoding");
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
        assert!(decoded.data.opaque);
        assert_eq!(&decoded.data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn intrinsic_size_rescales_with_density() {
        let drawable = ImageDrawable::with_density(checker(40, 20), 160);
        assert_eq!(drawable.intrinsic_width(), 40);
        assert_eq!(drawable.intrinsic_height(), 20);

        let cs = drawable.constant_state().expect("constant state");
        struct Dpi(i32);
        impl Resources for Dpi {
            fn density_dpi(&self) -> i32 {
                self.0
            }
            fn load_drawable(
                &self,
                reference: &str,
            ) -> Result<SharedDrawable, crate::inflate::InflateError> {
                Err(crate::inflate::InflateError::Resource {
                    reference: reference.to_owned(),
                    message: "not available".to_owned(),
                })
            }
        }
        let doubled = cs.new_drawable_with_resources(&Dpi(320));
        assert_eq!(doubled.borrow().intrinsic_width(), 80);
        assert_eq!(doubled.borrow().intrinsic_height(), 40);
    }

    #[test]
    fn opacity_tracks_alpha_and_pixels() {
        let mut opaque = ImageDrawable::new(checker(2, 2));
        assert_eq!(opaque.opacity(), Opacity::Opaque);
        opaque.set_alpha(0x80);
        assert_eq!(opaque.opacity(), Opacity::Translucent);
        opaque.set_alpha(0);
        assert_eq!(opaque.opacity(), Opacity::Transparent);

        let translucent = ImageDrawable::new(
            Image::from_rgba(vec![0xFF, 0xFF, 0xFF, 0x10], 1, 1).expect("valid dimensions"),
        );
        assert_eq!(translucent.opacity(), Opacity::Translucent);
    }

    #[test]
    fn mutate_detaches_from_siblings() {
        let original = ImageDrawable::new(checker(2, 2));
        let cs = original.constant_state().expect("constant state");
        let sibling = cs.new_drawable();

        // Shared state: alpha changes are visible to the sibling.
        sibling.borrow_mut().set_alpha(0x42);
        assert_eq!(original.alpha(), 0x42);

        let mut private = ImageDrawable::new(checker(2, 2));
        let cs2 = private.constant_state().expect("constant state");
        let other = cs2.new_drawable();
        private.mutate();
        private.set_alpha(0x11);
        assert_eq!(other.borrow().alpha(), 0xFF);
    }

    #[test]
    fn draw_covers_bounds() {
        let mut drawable = ImageDrawable::new(checker(4, 4));
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(canvas.ops().is_empty(), "empty bounds must be a no-op");

        drawable.set_bounds(Rect::new(10, 10, 20, 20));
        drawable.draw(&mut canvas);
        let [DrawOp::Image { dst, .. }] = canvas.ops() else {
            panic!("expected a single image op");
        };
        assert_eq!(*dst, crate::geom::RectF::new(10.0, 10.0, 20.0, 20.0));
    }
}
