//! Path building and fill tessellation via lyon.
//!
//! Canvas backends that render triangles get their geometry here: plain and
//! round-cornered rectangles are built as lyon paths and tessellated into
//! indexed triangle meshes.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use lyon::math::point;
use lyon::path::Path as LyonPath;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::geom::RectF;

/// Circle-approximation factor for a cubic Bézier quarter arc.
const ARC_KAPPA: f32 = 0.552_284_8;

/// A vertex in a tessellated mesh, ready for the GPU.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in device pixels.
    pub position: [f32; 2],
}

/// An indexed triangle mesh in device pixels.
///
/// Vertex and index buffers are shared so meshes clone cheaply.
#[derive(Clone)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Arc<Vec<Vertex>>,
    /// Triangle indices into `vertices`.
    pub indices: Arc<Vec<u32>>,
}

/// Tessellate a plain rectangle.
///
/// Returns `None` for degenerate rectangles that produce no triangles.
#[must_use]
pub fn rect_mesh(rect: RectF) -> Option<Mesh> {
    let mut builder = LyonPath::builder();
    builder.begin(point(rect.left, rect.top));
    builder.line_to(point(rect.right, rect.top));
    builder.line_to(point(rect.right, rect.bottom));
    builder.line_to(point(rect.left, rect.bottom));
    builder.close();
    tessellate(&builder.build())
}

/// Tessellate a rectangle with the same elliptical radius on every corner.
#[must_use]
pub fn round_rect_mesh(rect: RectF, rx: f32, ry: f32) -> Option<Mesh> {
    round_rect_radii_mesh(rect, &[rx, ry, rx, ry, rx, ry, rx, ry])
}

/// Tessellate a rectangle with per-corner `(x, y)` radius pairs, given in
/// clockwise order starting at the top-left corner.
///
/// Radii are clamped to be non-negative and to half the rectangle's extent
/// so opposite corners cannot overlap.
#[must_use]
pub fn round_rect_radii_mesh(rect: RectF, radii: &[f32; 8]) -> Option<Mesh> {
    let clamp_x = rect.width() * 0.5;
    let clamp_y = rect.height() * 0.5;
    let r = |i: usize| {
        let max = if i % 2 == 0 { clamp_x } else { clamp_y };
        radii[i].clamp(0.0, max.max(0.0))
    };
    let (tl_x, tl_y) = (r(0), r(1));
    let (tr_x, tr_y) = (r(2), r(3));
    let (br_x, br_y) = (r(4), r(5));
    let (bl_x, bl_y) = (r(6), r(7));

    let RectF {
        left,
        top,
        right,
        bottom,
    } = rect;
    let k = ARC_KAPPA;

    // Clockwise outline, one cubic quarter arc per rounded corner.
    let mut builder = LyonPath::builder();
    builder.begin(point(left + tl_x, top));
    builder.line_to(point(right - tr_x, top));
    if tr_x > 0.0 || tr_y > 0.0 {
        builder.cubic_bezier_to(
            point(right - tr_x + k * tr_x, top),
            point(right, top + tr_y - k * tr_y),
            point(right, top + tr_y),
        );
    }
    builder.line_to(point(right, bottom - br_y));
    if br_x > 0.0 || br_y > 0.0 {
        builder.cubic_bezier_to(
            point(right, bottom - br_y + k * br_y),
            point(right - br_x + k * br_x, bottom),
            point(right - br_x, bottom),
        );
    }
    builder.line_to(point(left + bl_x, bottom));
    if bl_x > 0.0 || bl_y > 0.0 {
        builder.cubic_bezier_to(
            point(left + bl_x - k * bl_x, bottom),
            point(left, bottom - bl_y + k * bl_y),
            point(left, bottom - bl_y),
        );
    }
    builder.line_to(point(left, top + tl_y));
    if tl_x > 0.0 || tl_y > 0.0 {
        builder.cubic_bezier_to(
            point(left, top + tl_y - k * tl_y),
            point(left + tl_x - k * tl_x, top),
            point(left + tl_x, top),
        );
    }
    builder.close();
    tessellate(&builder.build())
}

/// The unit square `[0,1]×[0,1]` as two triangles.
///
/// Image draws scale and translate this quad into the destination
/// rectangle; UVs are derived from the vertex positions.
#[must_use]
pub fn unit_quad() -> Mesh {
    Mesh {
        vertices: Arc::new(vec![
            Vertex {
                position: [0.0, 0.0],
            },
            Vertex {
                position: [1.0, 0.0],
            },
            Vertex {
                position: [1.0, 1.0],
            },
            Vertex {
                position: [0.0, 1.0],
            },
        ]),
        indices: Arc::new(vec![0, 1, 2, 0, 2, 3]),
    }
}

/// Tessellate a lyon path into an indexed triangle mesh.
fn tessellate(path: &LyonPath) -> Option<Mesh> {
    let mut geometry: VertexBuffers<Vertex, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    let result = tessellator.tessellate_path(
        path,
        &FillOptions::tolerance(0.01).with_fill_rule(FillRule::NonZero),
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| Vertex {
            position: vertex.position().to_array(),
        }),
    );

    match result {
        Ok(()) if !geometry.indices.is_empty() => Some(Mesh {
            vertices: Arc::new(geometry.vertices),
            indices: Arc::new(geometry.indices),
        }),
        _ => None,
    }
}

/// Compute the min/max of a single axis across all mesh vertices.
///
/// Used to determine the interpolation range for gradient fills.
/// `axis` is the index into [`Vertex::position`] (0 = X, 1 = Y).
///
/// Returns `[0.0, 0.0]` for an empty vertex slice.
#[must_use]
pub fn vertex_bounds(vertices: &[Vertex], axis: usize) -> [f32; 2] {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in vertices {
        let val = v.position[axis];
        min = min.min(val);
        max = max.max(val);
    }
    if max < min {
        [0.0, 0.0]
    } else {
        [min, max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_vertex_near(mesh: &Mesh, x: f32, y: f32) -> bool {
        mesh.vertices
            .iter()
            .any(|v| (v.position[0] - x).abs() < 0.05 && (v.position[1] - y).abs() < 0.05)
    }

    #[test]
    fn rect_mesh_spans_the_rect() {
        let rect = RectF::new(10.0, 20.0, 50.0, 40.0);
        let mesh = rect_mesh(rect).expect("non-degenerate");
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(vertex_bounds(&mesh.vertices, 0), [10.0, 50.0]);
        assert_eq!(vertex_bounds(&mesh.vertices, 1), [20.0, 40.0]);
    }

    #[test]
    fn degenerate_rect_yields_no_mesh() {
        assert!(rect_mesh(RectF::new(5.0, 5.0, 5.0, 40.0)).is_none());
        assert!(rect_mesh(RectF::new(5.0, 5.0, 40.0, 5.0)).is_none());
        assert!(round_rect_mesh(RectF::new(5.0, 5.0, 5.0, 5.0), 2.0, 2.0).is_none());
    }

    #[test]
    fn only_the_requested_corner_is_cut() {
        let rect = RectF::new(0.0, 0.0, 100.0, 100.0);
        // Round only the top-left corner.
        let mesh =
            round_rect_radii_mesh(rect, &[20.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
                .expect("non-degenerate");
        assert!(!has_vertex_near(&mesh, 0.0, 0.0), "top-left must be cut");
        assert!(has_vertex_near(&mesh, 100.0, 0.0));
        assert!(has_vertex_near(&mesh, 100.0, 100.0));
        assert!(has_vertex_near(&mesh, 0.0, 100.0));
    }

    #[test]
    fn oversized_radii_are_clamped() {
        let rect = RectF::new(0.0, 0.0, 40.0, 20.0);
        let mesh = round_rect_mesh(rect, 1000.0, 1000.0).expect("non-degenerate");
        let [min_x, max_x] = vertex_bounds(&mesh.vertices, 0);
        let [min_y, max_y] = vertex_bounds(&mesh.vertices, 1);
        assert!(min_x >= -0.05 && max_x <= 40.05);
        assert!(min_y >= -0.05 && max_y <= 20.05);
    }

    #[test]
    fn unit_quad_is_two_triangles() {
        let quad = unit_quad();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices.len(), 6);
        assert_eq!(vertex_bounds(&quad.vertices, 0), [0.0, 1.0]);
        assert_eq!(vertex_bounds(&quad.vertices, 1), [0.0, 1.0]);
    }

    #[test]
    fn vertex_bounds_of_empty_slice_is_zero() {
        assert_eq!(vertex_bounds(&[], 0), [0.0, 0.0]);
        assert_eq!(vertex_bounds(&[], 1), [0.0, 0.0]);
    }
}
