//! Paint state shared by all canvases: colors, fill shaders, color filters,
//! and the opacity lattice used by the drawable contract.

/// A packed 32-bit ARGB color (`0xAARRGGBB`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent (all zero).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black, the default paint color.
    pub const BLACK: Self = Self(0xFF00_0000);

    /// Build a color from its four channels.
    #[must_use]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// The alpha channel.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The same color with the alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }

    /// Straight (non-premultiplied) RGBA channels in `0.0..=1.0`, in the
    /// order shaders consume them.
    #[must_use]
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            f32::from((self.0 >> 16) as u8) / 255.0,
            f32::from((self.0 >> 8) as u8) / 255.0,
            f32::from(self.0 as u8) / 255.0,
            f32::from(self.alpha()) / 255.0,
        ]
    }
}

/// A gradient fill, interpolated across the painted geometry.
///
/// Solid fills are expressed by the paint color alone; a shader overrides
/// the color when present.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shader {
    /// Interpolates from the first color at the top to the second at the
    /// bottom.
    VerticalGradient(Color, Color),
    /// Interpolates from the first color on the left to the second on the
    /// right.
    HorizontalGradient(Color, Color),
}

/// A per-channel RGBA multiplier applied on top of whatever the paint
/// produces, including sampled image pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorFilter {
    /// The multiplier, one factor per channel.
    pub color: Color,
}

/// Fill state carried by a drawable and handed to the canvas per draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Fill color, used when no shader is set.
    pub color: Color,
    /// Optional gradient overriding the fill color.
    pub shader: Option<Shader>,
    /// Optional color filter applied after the fill resolves.
    pub color_filter: Option<ColorFilter>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            shader: None,
            color_filter: None,
        }
    }
}

impl Paint {
    /// The alpha channel of the fill color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.color.alpha()
    }

    /// Replace the alpha channel of the fill color.
    pub fn set_alpha(&mut self, alpha: u8) {
        self.color = self.color.with_alpha(alpha);
    }

    /// Whether a fill with this paint produces any pixels at all.
    #[must_use]
    pub fn would_draw(&self) -> bool {
        self.color != Color::TRANSPARENT || self.shader.is_some()
    }
}

/// How much a drawable lets the pixels behind it show through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opacity {
    /// Covers nothing.
    Transparent,
    /// Covers some pixels, or covers pixels partially.
    Translucent,
    /// Covers every pixel of its bounds completely.
    Opaque,
}

/// Combine the opacities of two stacked layers into the opacity of the
/// whole: any translucency wins, then any transparency, then opaque.
#[must_use]
pub fn resolve_opacity(a: Opacity, b: Opacity) -> Opacity {
    match (a, b) {
        (Opacity::Translucent, _) | (_, Opacity::Translucent) => Opacity::Translucent,
        (Opacity::Transparent, _) | (_, Opacity::Transparent) => Opacity::Transparent,
        (Opacity::Opaque, Opacity::Opaque) => Opacity::Opaque,
    }
}
