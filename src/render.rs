//! The GL-backed [`Canvas`]: owns GL state and turns canvas commands into
//! draw calls.

use std::sync::Arc;

use glow::{HasContext, PixelUnpackData};

use crate::canvas::Canvas;
use crate::geom::RectF;
use crate::geometry::{self, Mesh};
use crate::image::Image;
use crate::paint::{Paint, Shader};
use crate::shaders;

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// White tint: the identity color filter.
const NO_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Convert a `u32` to `i32` for GL API calls.
///
/// # Panics
///
/// Panics if `value > i32::MAX`. In practice, this is unreachable for
/// normal viewport dimensions and image sizes.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).expect("dimension exceeds i32::MAX")
}

/// Cached uniform locations for the fill shader program.
struct PathUniforms {
    /// `u_scale` — geometry scale.
    scale: glow::UniformLocation,
    /// `u_offset` — geometry translation.
    offset: glow::UniformLocation,
    /// `u_resolution` — viewport size in pixels.
    resolution: glow::UniformLocation,
    /// `u_shader_type` — 0 = solid, 1 = vertical gradient, 2 = horizontal.
    shader_type: glow::UniformLocation,
    /// `u_color_a` — solid color or gradient start.
    color_a: glow::UniformLocation,
    /// `u_color_b` — gradient end color.
    color_b: glow::UniformLocation,
    /// `u_bounds` — `[min, max]` for gradient interpolation axis.
    bounds: glow::UniformLocation,
    /// `u_tint` — color filter multiplier.
    tint: glow::UniformLocation,
}

/// Cached uniform locations for the image shader program.
struct ImageUniforms {
    /// `u_scale` — destination size.
    scale: glow::UniformLocation,
    /// `u_offset` — destination origin.
    offset: glow::UniformLocation,
    /// `u_resolution` — viewport size in pixels.
    resolution: glow::UniformLocation,
    /// `u_texture` — texture unit index (always 0).
    texture: glow::UniformLocation,
    /// `u_tint` — color filter multiplier.
    tint: glow::UniformLocation,
    /// `u_opacity` — opacity multiplier (1.0 = fully opaque).
    opacity: glow::UniformLocation,
}

/// An OpenGL-backed canvas.
///
/// Rectangles are tessellated into triangle meshes via lyon and streamed to
/// the GPU per draw call; images are uploaded lazily the first time they are
/// drawn and reused afterwards.
///
/// # Safety contract
///
/// [`Canvas`] methods are safe to call, but the GL context handed to
/// [`new`](Self::new) must be current on the calling thread for the whole
/// time the canvas is used, from [`begin_frame`](Self::begin_frame) through
/// [`destroy`](Self::destroy).
///
/// # Example
///
/// ```no_run
/// # use logo_drawable::{GlCanvas, LogoDrawable, Drawable};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>, drawable: &LogoDrawable) {
/// // During setup (with a current GL context):
/// let mut canvas = unsafe { GlCanvas::new(gl) }.unwrap();
///
/// // Each frame:
/// unsafe { canvas.begin_frame([800, 600]) };
/// drawable.draw(&mut canvas);
/// unsafe { canvas.end_frame() };
/// # }
/// ```
pub struct GlCanvas {
    /// The OpenGL context, shared via [`Arc`] so it can be stored alongside
    /// resources that reference it.
    gl: Arc<glow::Context>,

    /// Compiled shader program for filled geometry.
    path_program: glow::Program,
    /// Cached uniform locations for [`path_program`](Self::path_program).
    path_uniforms: PathUniforms,

    /// Compiled shader program for textured quads.
    image_program: glow::Program,
    /// Cached uniform locations for [`image_program`](Self::image_program).
    image_uniforms: ImageUniforms,

    /// Vertex array object with a single `vec2` position attribute.
    vao: glow::VertexArray,
    /// Vertex buffer for streaming vertex data per draw call.
    vbo: glow::Buffer,
    /// Element (index) buffer for streaming index data per draw call.
    ebo: glow::Buffer,

    /// Viewport size set by the last [`begin_frame`](Self::begin_frame).
    resolution: [f32; 2],
}

impl GlCanvas {
    /// Create a new canvas.
    ///
    /// Compiles shader programs and creates the GL buffer objects.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid. The caller must ensure
    /// that [`destroy`](Self::destroy) is called before the context is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error string if shader compilation, program linking, or
    /// GL resource creation fails.
    ///
    /// # Panics
    ///
    /// Panics if any shader uniform location cannot be found, which
    /// indicates a bug in the shader source code.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Result<Self, String> {
        let path_program = unsafe {
            shaders::compile_program(&gl, shaders::PATH_VERTEX_SRC, shaders::PATH_FRAGMENT_SRC)?
        };
        let image_program = unsafe {
            shaders::compile_program(&gl, shaders::IMAGE_VERTEX_SRC, shaders::IMAGE_FRAGMENT_SRC)?
        };

        let path_uniforms = unsafe {
            PathUniforms {
                scale: gl
                    .get_uniform_location(path_program, "u_scale")
                    .expect("u_scale missing from path shader"),
                offset: gl
                    .get_uniform_location(path_program, "u_offset")
                    .expect("u_offset missing from path shader"),
                resolution: gl
                    .get_uniform_location(path_program, "u_resolution")
                    .expect("u_resolution missing from path shader"),
                shader_type: gl
                    .get_uniform_location(path_program, "u_shader_type")
                    .expect("u_shader_type missing from path shader"),
                color_a: gl
                    .get_uniform_location(path_program, "u_color_a")
                    .expect("u_color_a missing from path shader"),
                color_b: gl
                    .get_uniform_location(path_program, "u_color_b")
                    .expect("u_color_b missing from path shader"),
                bounds: gl
                    .get_uniform_location(path_program, "u_bounds")
                    .expect("u_bounds missing from path shader"),
                tint: gl
                    .get_uniform_location(path_program, "u_tint")
                    .expect("u_tint missing from path shader"),
            }
        };

        let image_uniforms = unsafe {
            ImageUniforms {
                scale: gl
                    .get_uniform_location(image_program, "u_scale")
                    .expect("u_scale missing from image shader"),
                offset: gl
                    .get_uniform_location(image_program, "u_offset")
                    .expect("u_offset missing from image shader"),
                resolution: gl
                    .get_uniform_location(image_program, "u_resolution")
                    .expect("u_resolution missing from image shader"),
                texture: gl
                    .get_uniform_location(image_program, "u_texture")
                    .expect("u_texture missing from image shader"),
                tint: gl
                    .get_uniform_location(image_program, "u_tint")
                    .expect("u_tint missing from image shader"),
                opacity: gl
                    .get_uniform_location(image_program, "u_opacity")
                    .expect("u_opacity missing from image shader"),
            }
        };

        let (vao, vbo, ebo) = unsafe {
            let vao = gl.create_vertex_array()?;
            let vbo = gl.create_buffer()?;
            let ebo = gl.create_buffer()?;

            // Set up VAO with a single vec2 position attribute.
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                2,
                glow::FLOAT,
                false,
                // Vertex is 8 bytes, well within i32 range.
                #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                {
                    std::mem::size_of::<geometry::Vertex>() as i32
                },
                0,
            );
            gl.bind_vertex_array(None);

            (vao, vbo, ebo)
        };

        Ok(Self {
            gl,
            path_program,
            path_uniforms,
            image_program,
            image_uniforms,
            vao,
            vbo,
            ebo,
            resolution: [0.0, 0.0],
        })
    }

    /// Prepare for drawing a frame into the currently-bound framebuffer:
    /// sets the viewport and enables premultiplied-alpha blending.
    ///
    /// # Safety
    ///
    /// Requires a current GL context matching the one passed to
    /// [`new`](Self::new).
    pub unsafe fn begin_frame(&mut self, [width, height]: [u32; 2]) {
        // Precision loss is acceptable: viewport dimensions are small
        // relative to f32 mantissa range.
        #[expect(clippy::cast_precision_loss)]
        {
            self.resolution = [width as f32, height as f32];
        }

        let gl = &self.gl;
        unsafe {
            gl.viewport(0, 0, gl_size(width), gl_size(height));
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    /// Finish the frame, restoring the blend state.
    ///
    /// # Safety
    ///
    /// Requires a current GL context matching the one passed to
    /// [`new`](Self::new).
    pub unsafe fn end_frame(&self) {
        unsafe { self.gl.disable(glow::BLEND) };
    }

    /// Draw a mesh with the fill program configured for the given paint.
    fn draw_mesh(&self, mesh: &Mesh, paint: &Paint) {
        let gl = &self.gl;
        let u = &self.path_uniforms;
        let tint = paint
            .color_filter
            .map_or(NO_TINT, |f| f.color.to_rgba_f32());

        unsafe {
            gl.use_program(Some(self.path_program));
            gl.uniform_2_f32(Some(&u.resolution), self.resolution[0], self.resolution[1]);
            gl.uniform_2_f32(Some(&u.scale), 1.0, 1.0);
            gl.uniform_2_f32(Some(&u.offset), 0.0, 0.0);
            gl.uniform_4_f32(Some(&u.tint), tint[0], tint[1], tint[2], tint[3]);

            match paint.shader {
                None => {
                    let [r, g, b, a] = paint.color.to_rgba_f32();
                    gl.uniform_1_i32(Some(&u.shader_type), 0);
                    gl.uniform_4_f32(Some(&u.color_a), r, g, b, a);
                }
                Some(Shader::VerticalGradient(top, bottom)) => {
                    let [min, max] = geometry::vertex_bounds(&mesh.vertices, 1);
                    let [tr, tg, tb, ta] = top.to_rgba_f32();
                    let [br, bg, bb, ba] = bottom.to_rgba_f32();
                    gl.uniform_1_i32(Some(&u.shader_type), 1);
                    gl.uniform_4_f32(Some(&u.color_a), tr, tg, tb, ta);
                    gl.uniform_4_f32(Some(&u.color_b), br, bg, bb, ba);
                    gl.uniform_2_f32(Some(&u.bounds), min, max);
                }
                Some(Shader::HorizontalGradient(left, right)) => {
                    let [min, max] = geometry::vertex_bounds(&mesh.vertices, 0);
                    let [lr, lg, lb, la] = left.to_rgba_f32();
                    let [rr, rg, rb, ra] = right.to_rgba_f32();
                    gl.uniform_1_i32(Some(&u.shader_type), 2);
                    gl.uniform_4_f32(Some(&u.color_a), lr, lg, lb, la);
                    gl.uniform_4_f32(Some(&u.color_b), rr, rg, rb, ra);
                    gl.uniform_2_f32(Some(&u.bounds), min, max);
                }
            }

            self.upload_and_draw(mesh);
        }
    }

    /// Upload vertex/index data and issue the draw call.
    ///
    /// # Panics
    ///
    /// Panics if the index count exceeds `i32::MAX`.
    unsafe fn upload_and_draw(&self, mesh: &Mesh) {
        let gl = &self.gl;

        unsafe {
            gl.bind_vertex_array(Some(self.vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.vertices),
                glow::STREAM_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.indices),
                glow::STREAM_DRAW,
            );

            let index_count =
                i32::try_from(mesh.indices.len()).expect("index count exceeds i32::MAX");
            gl.draw_elements(glow::TRIANGLES, index_count, glow::UNSIGNED_INT, 0);

            gl.bind_vertex_array(None);
        }
    }

    /// Ensure an image's pixel data is uploaded as a GL texture, returning
    /// the texture handle.
    ///
    /// On first call for a given image, this creates a new texture, uploads
    /// the RGBA pixel data, and caches the handle in the image. Subsequent
    /// calls return the cached handle.
    ///
    /// # Panics
    ///
    /// Panics if the image's texture [`RwLock`](std::sync::RwLock) is
    /// poisoned, or if the GL context has been lost.
    fn ensure_texture(&self, image: &Image) -> glow::Texture {
        let data = &image.data;
        let mut tex_lock = data.texture.write().expect("texture RwLock poisoned");

        if let Some(tex) = *tex_lock {
            return tex;
        }

        let gl = &self.gl;
        let texture = unsafe { gl.create_texture() }.expect("GL context lost: create_texture");
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                RGBA8_INTERNAL_FORMAT,
                gl_size(data.width),
                gl_size(data.height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(&data.pixels)),
            );
            Self::set_default_tex_params(gl);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        *tex_lock = Some(texture);
        texture
    }

    /// Set default texture filtering and wrapping parameters.
    unsafe fn set_default_tex_params(gl: &glow::Context) {
        // GL constant values are small enough that the cast is always safe.
        #[expect(clippy::cast_possible_wrap)]
        unsafe {
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }

    /// Clean up all GL resources owned by this canvas.
    ///
    /// Textures cached inside [`Image`]s are owned by the images and are
    /// not touched here.
    ///
    /// # Safety
    ///
    /// Must be called with the same GL context that was used to create the
    /// canvas, and must be called exactly once.
    pub unsafe fn destroy(&self) {
        let gl = &self.gl;
        unsafe {
            gl.delete_program(self.path_program);
            gl.delete_program(self.image_program);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

impl Canvas for GlCanvas {
    fn fill_rect(&mut self, rect: RectF, paint: &Paint) {
        if let Some(mesh) = geometry::rect_mesh(rect) {
            self.draw_mesh(&mesh, paint);
        }
    }

    fn fill_round_rect(&mut self, rect: RectF, rx: f32, ry: f32, paint: &Paint) {
        if let Some(mesh) = geometry::round_rect_mesh(rect, rx, ry) {
            self.draw_mesh(&mesh, paint);
        }
    }

    fn fill_round_rect_radii(&mut self, rect: RectF, radii: &[f32; 8], paint: &Paint) {
        if let Some(mesh) = geometry::round_rect_radii_mesh(rect, radii) {
            self.draw_mesh(&mesh, paint);
        }
    }

    fn draw_image(&mut self, image: &Image, dst: RectF, paint: &Paint) {
        let gl = &self.gl;
        let u = &self.image_uniforms;
        let texture = self.ensure_texture(image);
        let tint = paint
            .color_filter
            .map_or(NO_TINT, |f| f.color.to_rgba_f32());
        let opacity = f32::from(paint.alpha()) / 255.0;

        unsafe {
            gl.use_program(Some(self.image_program));
            gl.uniform_2_f32(Some(&u.resolution), self.resolution[0], self.resolution[1]);
            gl.uniform_2_f32(Some(&u.scale), dst.width(), dst.height());
            gl.uniform_2_f32(Some(&u.offset), dst.left, dst.top);
            gl.uniform_4_f32(Some(&u.tint), tint[0], tint[1], tint[2], tint[3]);
            gl.uniform_1_f32(Some(&u.opacity), opacity);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.uniform_1_i32(Some(&u.texture), 0);

            self.upload_and_draw(&geometry::unit_quad());

            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}
