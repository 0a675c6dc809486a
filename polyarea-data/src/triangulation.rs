//! Fan triangulation for polygon areas.
//!
//! Every triangle shares vertex 0. The input ordering must already describe a
//! convex (or nearly convex) outline; no validation is done here.

use glam::Vec3;
use tracing::trace;

/// Minimum number of points that produce a triangle.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Number of fan triangles for a polygon with `point_count` vertices.
pub fn triangle_count(point_count: usize) -> usize {
    point_count.saturating_sub(2)
}

/// Iterate the fan triangles of a polygon with `point_count` vertices.
///
/// Triangle `i` (for `i` in `1..=n-2`) is `[0, i + 1, i]`. The reversed
/// second and third indices set the front face used by the renderer and must
/// not be swapped.
pub fn fan_triangles(point_count: usize) -> impl Iterator<Item = [u32; 3]> {
    let last = if point_count < MIN_POLYGON_POINTS {
        0
    } else {
        point_count - 2
    };
    (1..=last).map(|i| [0, (i + 1) as u32, i as u32])
}

/// Triangulate a polygon outline as a fan from its first vertex.
///
/// Returns a flat index list of length `3 * (n - 2)`, or an empty list when
/// there are fewer than three points.
pub fn triangulate_fan(points: &[Vec3]) -> Vec<u32> {
    let mut indices = Vec::with_capacity(triangle_count(points.len()) * 3);
    indices.extend(fan_triangles(points.len()).flatten());

    trace!(
        "Fan triangulated {} points into {} triangles",
        points.len(),
        indices.len() / 3
    );

    indices
}
