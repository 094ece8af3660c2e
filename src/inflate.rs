//! Declarative inflation: attribute sets, typed attribute decoding, the
//! resource-provider seam, and the drawable registry.
//!
//! Hosts describe a drawable as named string attributes (the way a
//! declarative resource format would) and hand them to a factory together
//! with a [`Resources`] implementation that supplies density metrics and
//! resolves nested drawable references.

use std::collections::HashMap;

use thiserror::Error;

use crate::density::{resolve_density, DENSITY_DEFAULT};
use crate::drawable::SharedDrawable;
use crate::paint::Color;

/// Errors produced while decoding attributes or resolving resources.
///
/// All of these are fatal to inflation and propagate to the caller.
#[derive(Debug, Error)]
pub enum InflateError {
    /// A dimension attribute held a value that is not `px`, `dp`/`dip`, or
    /// a bare pixel number.
    #[error("invalid dimension {value:?} for attribute {name:?}")]
    InvalidDimension {
        /// Attribute name.
        name: String,
        /// Raw attribute value.
        value: String,
    },
    /// A color attribute held a value that is not `#RRGGBB` or `#AARRGGBB`.
    #[error("invalid color {value:?} for attribute {name:?}")]
    InvalidColor {
        /// Attribute name.
        name: String,
        /// Raw attribute value.
        value: String,
    },
    /// The resource provider failed to resolve a drawable reference.
    #[error("failed to load drawable {reference:?}: {message}")]
    Resource {
        /// The reference as written in the attribute.
        reference: String,
        /// Provider-specific description of the failure.
        message: String,
    },
    /// No factory is registered for the requested tag.
    #[error("no drawable registered for tag {0:?}")]
    UnknownTag(String),
}

/// The resource-resolution service inflation consumes.
///
/// Treated as an opaque input provider: it reports the display density and
/// resolves drawable references named by attributes.
pub trait Resources {
    /// Density of the display this inflation targets, in dpi. A value of 0
    /// means unknown and resolves to the reference density.
    fn density_dpi(&self) -> i32;

    /// Resolve a drawable reference (e.g. `"@drawable/logo"`) to a
    /// drawable.
    ///
    /// # Errors
    ///
    /// Returns [`InflateError::Resource`] if the reference cannot be
    /// resolved.
    fn load_drawable(&self, reference: &str) -> Result<SharedDrawable, InflateError>;
}

/// An ordered set of raw `(name, value)` attribute pairs.
#[derive(Clone, Debug, Default)]
pub struct AttributeSet {
    entries: Vec<(String, String)>,
}

impl AttributeSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(name, value)` pairs, keeping their order.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(n, v)| (n.to_owned(), v.to_owned()))
                .collect(),
        }
    }

    /// Append an attribute. Later entries shadow earlier ones of the same
    /// name.
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_owned(), value.to_owned()));
    }

    /// Look up the raw value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Typed, density-aware view over an [`AttributeSet`].
///
/// Obtained for the duration of one inflation pass; the borrows end with
/// the value's scope, so the set is released even when a getter errors out
/// mid-inflation.
pub struct StyledAttributes<'a> {
    resources: &'a dyn Resources,
    set: &'a AttributeSet,
    density: i32,
}

impl<'a> StyledAttributes<'a> {
    /// Obtain a typed view resolving dimensions against the provider's
    /// density.
    #[must_use]
    pub fn obtain(resources: &'a dyn Resources, set: &'a AttributeSet) -> Self {
        let density = resolve_density(Some(resources.density_dpi()), 0);
        Self {
            resources,
            set,
            density,
        }
    }

    /// The density dimensions are resolved against.
    #[must_use]
    pub fn density(&self) -> i32 {
        self.density
    }

    /// Decode a dimension attribute to device pixels.
    ///
    /// Supported forms: `"12px"`, `"10dp"` / `"10dip"` (scaled by
    /// density / 160), and bare numbers (pixels). Results round to the
    /// nearest pixel.
    ///
    /// # Errors
    ///
    /// Returns [`InflateError::InvalidDimension`] on any other form.
    pub fn dimension_pixel_size(&self, name: &str, default: i32) -> Result<i32, InflateError> {
        let Some(raw) = self.set.get(name) else {
            return Ok(default);
        };
        parse_dimension(raw, self.density).ok_or_else(|| InflateError::InvalidDimension {
            name: name.to_owned(),
            value: raw.to_owned(),
        })
    }

    /// Decode a color attribute (`#RRGGBB` or `#AARRGGBB`).
    ///
    /// # Errors
    ///
    /// Returns [`InflateError::InvalidColor`] on any other form.
    pub fn color(&self, name: &str, default: Color) -> Result<Color, InflateError> {
        let Some(raw) = self.set.get(name) else {
            return Ok(default);
        };
        parse_color(raw).ok_or_else(|| InflateError::InvalidColor {
            name: name.to_owned(),
            value: raw.to_owned(),
        })
    }

    /// Resolve a drawable-reference attribute through the resource
    /// provider. Absent attributes resolve to `None`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`InflateError::Resource`] failure.
    pub fn drawable(&self, name: &str) -> Result<Option<SharedDrawable>, InflateError> {
        match self.set.get(name) {
            Some(reference) => self.resources.load_drawable(reference).map(Some),
            None => Ok(None),
        }
    }
}

fn parse_dimension(raw: &str, density: i32) -> Option<i32> {
    let raw = raw.trim();
    let (number, scale) = if let Some(px) = raw.strip_suffix("px") {
        (px, 1.0)
    } else if let Some(dp) = raw.strip_suffix("dip").or_else(|| raw.strip_suffix("dp")) {
        // Densities are small; f32 holds them exactly.
        #[expect(clippy::cast_precision_loss)]
        {
            (dp, density as f32 / DENSITY_DEFAULT as f32)
        }
    } else {
        (raw, 1.0)
    };
    let value: f32 = number.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    #[expect(clippy::cast_possible_truncation)]
    Some((value * scale).round() as i32)
}

fn parse_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().strip_prefix('#')?;
    match hex.len() {
        6 => u32::from_str_radix(hex, 16)
            .ok()
            .map(|rgb| Color(0xFF00_0000 | rgb)),
        8 => u32::from_str_radix(hex, 16).ok().map(Color),
        _ => None,
    }
}

/// Factory signature for inflating one drawable kind from attributes.
pub type DrawableFactory =
    fn(&dyn Resources, &AttributeSet) -> Result<SharedDrawable, InflateError>;

/// Explicit tag-to-factory registration.
///
/// This is the registration seam hosts extend to add their own drawable
/// kinds; nothing is patched into the host at runtime.
pub struct DrawableRegistry {
    factories: HashMap<String, DrawableFactory>,
}

impl DrawableRegistry {
    /// Create a registry with no registered tags.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the built-in tags: `logo` and `placeholder`
    /// (both the rounded-rect-plus-logo drawable) and `image`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("logo", crate::logo::inflate_logo);
        registry.register("placeholder", crate::logo::inflate_logo);
        registry.register("image", inflate_image);
        registry
    }

    /// Register (or replace) the factory for a tag.
    pub fn register(&mut self, tag: &str, factory: DrawableFactory) {
        self.factories.insert(tag.to_owned(), factory);
    }

    /// Inflate a drawable for the given tag.
    ///
    /// # Errors
    ///
    /// Returns [`InflateError::UnknownTag`] for unregistered tags, or
    /// whatever the factory fails with.
    pub fn inflate(
        &self,
        tag: &str,
        resources: &dyn Resources,
        attrs: &AttributeSet,
    ) -> Result<SharedDrawable, InflateError> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| InflateError::UnknownTag(tag.to_owned()))?;
        factory(resources, attrs)
    }
}

impl Default for DrawableRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Factory for the `image` tag: resolves the `src` reference through the
/// resource provider.
fn inflate_image(
    resources: &dyn Resources,
    attrs: &AttributeSet,
) -> Result<SharedDrawable, InflateError> {
    let attrs_view = StyledAttributes::obtain(resources, attrs);
    attrs_view
        .drawable("src")?
        .ok_or_else(|| InflateError::Resource {
            reference: String::new(),
            message: "image tag requires a src attribute".to_owned(),
        })
}
