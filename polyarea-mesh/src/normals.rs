//! Vertex normal computation from triangle winding.
//!
//! Face normals are accumulated at each corner weighted by triangle area and
//! then normalized, so the result follows the front face set by the index
//! order.

use glam::Vec3;

/// Recompute area-weighted vertex normals into `normals`.
///
/// `normals` is resized to `positions.len()`. Vertices not referenced by any
/// triangle, or only by degenerate ones, get a zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32], normals: &mut Vec<Vec3>) {
    normals.clear();
    normals.resize(positions.len(), Vec3::ZERO);

    for tri in indices.chunks_exact(3) {
        let a = tri[0] as usize;
        let b = tri[1] as usize;
        let c = tri[2] as usize;

        // Magnitude is twice the triangle area.
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in normals.iter_mut() {
        *n = n.normalize_or_zero();
    }
}
