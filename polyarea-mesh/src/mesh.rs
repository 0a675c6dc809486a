//! Renderer-facing mesh buffer.

use glam::Vec3;
use polyarea_data::Aabb;

/// Interleaved vertex layout for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Triangle mesh data read by a renderer.
///
/// The buffer object itself is long-lived; its contents are cleared and
/// rewritten on every regeneration. Invariants after any write through
/// [`MeshBuffer::write`] or [`MeshBuffer::clear`]:
/// - `indices.len() % 3 == 0`
/// - every index is `< vertices.len()`
/// - fewer than three vertices means no indices and `visible == false`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    label: String,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    normals: Vec<Vec3>,
    bounds: Aabb,
    visible: bool,
    /// Number of times the contents were rewritten.
    version: u64,
}

impl MeshBuffer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Indices of triangle `t`, or `None` past the last triangle.
    pub fn triangle(&self, t: usize) -> Option<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .nth(t)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Drop all geometry while keeping the allocations for reuse.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.normals.clear();
        self.bounds = Aabb::ZERO;
        self.visible = false;
        self.version += 1;
    }

    /// Replace the geometry with `vertices` and `indices`.
    ///
    /// Normals and bounds are recomputed from the new data. Visibility is left
    /// to the caller.
    pub fn write(&mut self, vertices: &[Vec3], indices: &[u32]) {
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        crate::normals::compute_vertex_normals(&self.vertices, &self.indices, &mut self.normals);
        self.bounds = Aabb::from_points(self.vertices.iter().copied());
        self.version += 1;
    }

    /// Interleaved position/normal data ready for a vertex buffer.
    pub fn gpu_vertices(&self) -> Vec<GpuVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| GpuVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }

    /// Index data as raw bytes for an index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Vec3>, Vec<u32>) {
        (
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            vec![0, 2, 1],
        )
    }

    #[test]
    fn test_write_then_clear() {
        let (vertices, indices) = triangle();
        let mut mesh = MeshBuffer::new("area");
        mesh.write(&vertices, &indices);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangle(0), Some([0, 2, 1]));
        assert_eq!(mesh.triangle(1), None);
        assert_eq!(mesh.normals().len(), 3);
        assert_eq!(mesh.bounds().max, Vec3::new(1.0, 1.0, 0.0));

        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.normals().is_empty());
        assert_eq!(mesh.bounds(), Aabb::ZERO);
        assert!(!mesh.visible());
        assert_eq!(mesh.version(), 2);
    }

    #[test]
    fn test_gpu_layout() {
        let (vertices, indices) = triangle();
        let mut mesh = MeshBuffer::new("area");
        mesh.write(&vertices, &indices);

        assert_eq!(std::mem::size_of::<GpuVertex>(), 24);
        let gpu = mesh.gpu_vertices();
        assert_eq!(gpu.len(), 3);
        assert_eq!(gpu[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.index_bytes().len(), 3 * 4);
    }
}
