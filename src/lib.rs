//! A density-aware logo drawable rendered with OpenGL via [glow].
//!
//! This crate provides [`LogoDrawable`], a drawable that paints a rounded
//! rectangle background with an optional centered child drawable on top,
//! along with the [`Drawable`] contract it implements and the [`Canvas`]
//! abstraction it draws through. Paths are tessellated via [lyon] and
//! rendered as indexed triangle meshes by [`GlCanvas`].
//!
//! # Features
//!
//! - **Shared constant state**: drawables created from the same source share
//!   one state record; [`Drawable::mutate`] splits off a private copy on
//!   demand.
//! - **Density scaling**: pixel dimensions are rescaled when a drawable
//!   crosses display densities, preserving sign and never rounding a
//!   non-zero size to zero.
//! - **Rounded corners**: one uniform radius or eight per-corner radii,
//!   clamped so corners never overlap.
//! - **Resource inflation**: drawables can be built from attribute sets via
//!   a [`DrawableRegistry`], with `px`/`dp` dimension and hex color parsing.
//! - **Lazy texture upload**: images are decoded on the CPU and uploaded to
//!   the GPU only when first drawn.
//!
//! # Safety
//!
//! Creating a [`GlCanvas`] and framing its use requires a valid, current
//! OpenGL context; those methods are `unsafe` because they issue raw GL
//! calls. Drawing itself goes through the safe [`Canvas`] trait. The
//! [`RecordingCanvas`] backend is entirely GL-free and suits headless use.
//!
//! [glow]: https://docs.rs/glow
//! [lyon]: https://docs.rs/lyon

pub mod canvas;
pub mod density;
pub mod drawable;
pub mod geom;
#[cfg(feature = "glow")]
mod geometry;
pub mod image;
pub mod inflate;
pub mod logo;
pub mod paint;
#[cfg(feature = "glow")]
mod render;
#[cfg(feature = "glow")]
mod shaders;

pub use canvas::{Canvas, RecordingCanvas};
pub use drawable::{ConstantState, Drawable, DrawableCallback, SharedDrawable};
pub use geom::{Rect, RectF};
pub use image::{Image, ImageDrawable};
pub use inflate::{AttributeSet, DrawableRegistry, InflateError, Resources};
pub use logo::LogoDrawable;
pub use paint::{Color, ColorFilter, Opacity, Paint, Shader};
#[cfg(feature = "glow")]
pub use render::GlCanvas;
