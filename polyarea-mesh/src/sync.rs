//! Keeps an area's mesh buffer consistent with its point set.

use crate::material::{Material, RenderState, UNLIT_COLOR_SHADER};
use crate::mesh::MeshBuffer;
use crate::resource::Handle;
use crate::resource_registry::ResourceRegistry;
use polyarea_data::{MIN_POLYGON_POINTS, PointSet, Rgba, triangulate_fan};
use tracing::debug;

/// Visual style applied to the area surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceStyle {
    pub color: Rgba,
}

impl SurfaceStyle {
    pub fn new(color: Rgba) -> Self {
        Self { color }
    }
}

/// Configuration for [`AreaMeshSync`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Shader the surface material must be bound to.
    pub shader_name: String,
    /// Label given to the mesh buffer when it is first created.
    pub mesh_label: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            shader_name: UNLIT_COLOR_SHADER.to_string(),
            mesh_label: "Area Mesh".to_string(),
        }
    }
}

/// Owner of an area's mesh buffer and material.
///
/// The mesh buffer is created on the first [`regenerate`](Self::regenerate)
/// and rewritten in place afterwards, so its handle stays valid for the
/// lifetime of the owner. The material is created lazily and only replaced
/// when it is bound to a different shader than the configured one.
#[derive(Debug)]
pub struct AreaMeshSync {
    config: SyncConfig,
    mesh: Option<Handle<MeshBuffer>>,
    material: Option<Handle<Material>>,
    render_state: RenderState,
    synced_revision: Option<u64>,
}

impl AreaMeshSync {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            config,
            mesh: None,
            material: None,
            render_state: RenderState::default(),
            synced_revision: None,
        }
    }

    /// Handle of the mesh buffer, once it has been created.
    pub fn mesh_handle(&self) -> Option<Handle<MeshBuffer>> {
        self.mesh
    }

    /// Handle of the surface material, once it has been created.
    pub fn material_handle(&self) -> Option<Handle<Material>> {
        self.material
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    /// Whether `points` changed since the last regeneration.
    pub fn is_stale(&self, points: &PointSet) -> bool {
        self.synced_revision != Some(points.revision())
    }

    /// Rebuild the mesh from `points` and reconcile the material with `style`.
    ///
    /// Fewer than three points is a normal in-progress state: the buffer is
    /// cleared, hidden, and styling is left untouched. Calling this twice
    /// without an intervening edit produces identical buffer contents.
    #[tracing::instrument(level = "debug", skip_all, fields(points = points.len()))]
    pub fn regenerate(
        &mut self,
        registry: &mut ResourceRegistry,
        points: &PointSet,
        style: &SurfaceStyle,
    ) -> Handle<MeshBuffer> {
        let label = &self.config.mesh_label;
        let (handle, mesh) =
            registry.mesh_or_insert_with(self.mesh, || MeshBuffer::new(label.clone()));
        if self.mesh != Some(handle) {
            debug!("Created mesh buffer {:?}", handle);
            self.mesh = Some(handle);
        }
        self.synced_revision = Some(points.revision());

        if points.len() < MIN_POLYGON_POINTS {
            mesh.clear();
            debug!("Area has {} points; surface hidden", points.len());
            return handle;
        }

        let indices = triangulate_fan(points.points());
        mesh.write(points.points(), &indices);
        mesh.set_visible(true);
        debug!(
            "Regenerated area mesh: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        self.apply_style(registry, style);
        handle
    }

    /// Regenerate only if `points` changed since the last call or the mesh
    /// buffer is gone; otherwise return the current handle untouched.
    pub fn regenerate_if_stale(
        &mut self,
        registry: &mut ResourceRegistry,
        points: &PointSet,
        style: &SurfaceStyle,
    ) -> Handle<MeshBuffer> {
        if !self.is_stale(points) {
            if let Some(handle) = self.mesh.filter(|&h| registry.mesh(h).is_some()) {
                return handle;
            }
        }
        self.regenerate(registry, points, style)
    }

    /// Free the mesh and material. Only for when the owning area goes away.
    pub fn release(&mut self, registry: &mut ResourceRegistry) {
        if let Some(handle) = self.mesh.take() {
            registry.remove_mesh(handle);
        }
        if let Some(handle) = self.material.take() {
            registry.remove_material(handle);
        }
        self.render_state = RenderState::default();
        self.synced_revision = None;
    }

    fn apply_style(&mut self, registry: &mut ResourceRegistry, style: &SurfaceStyle) {
        self.render_state = RenderState::overlay(self.render_state.material);

        let Some(shader) = registry.find_shader(&self.config.shader_name) else {
            debug!(
                "Shader '{}' is not registered; leaving material untouched",
                self.config.shader_name
            );
            return;
        };

        let reusable = self
            .material
            .filter(|&h| registry.material(h).is_some_and(|m| m.shader() == shader));

        let handle = match reusable {
            Some(handle) => handle,
            None => {
                if let Some(stale) = self.material.take() {
                    registry.remove_material(stale);
                }
                let handle = registry.insert_material(Material::new(shader));
                debug!("Created surface material {:?}", handle);
                handle
            }
        };

        if let Some(material) = registry.material_mut(handle) {
            material.set_color(style.color);
        }
        self.material = Some(handle);
        self.render_state = RenderState::overlay(Some(handle));
    }
}

impl Default for AreaMeshSync {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Shader;
    use glam::Vec3;
    use polyarea_data::Aabb;

    fn triangle() -> PointSet {
        PointSet::from_points(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ])
    }

    fn style() -> SurfaceStyle {
        SurfaceStyle::new(Rgba::new(0.2, 0.4, 0.6, 0.5))
    }

    #[test]
    fn test_empty_set_hides_surface() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let handle = sync.regenerate(&mut registry, &PointSet::new(), &style());

        let mesh = registry.mesh(handle).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(!mesh.visible());
        assert_eq!(mesh.bounds(), Aabb::ZERO);
        assert!(sync.material_handle().is_none());
    }

    #[test]
    fn test_single_triangle() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let points = triangle();
        let handle = sync.regenerate(&mut registry, &points, &style());

        let mesh = registry.mesh(handle).unwrap();
        assert_eq!(mesh.vertices(), points.points());
        assert_eq!(mesh.indices(), &[0, 2, 1]);
        assert!(mesh.visible());
        assert_eq!(mesh.bounds(), Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)));
        for n in mesh.normals() {
            assert!((*n - Vec3::NEG_Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_square() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = triangle();
        points.add(Vec3::new(0.0, 1.0, 0.0));
        let handle = sync.regenerate(&mut registry, &points, &style());
        assert_eq!(registry.mesh(handle).unwrap().indices(), &[0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_third_point_shows_surface() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = PointSet::from_points(vec![Vec3::ZERO, Vec3::X]);

        let handle = sync.regenerate(&mut registry, &points, &style());
        assert!(!registry.mesh(handle).unwrap().visible());

        points.add(Vec3::new(1.0, 1.0, 0.0));
        let same = sync.regenerate(&mut registry, &points, &style());
        assert_eq!(handle, same);
        let mesh = registry.mesh(handle).unwrap();
        assert!(mesh.visible());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_removing_to_two_points_clears_surface() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = triangle();

        let handle = sync.regenerate(&mut registry, &points, &style());
        assert!(registry.mesh(handle).unwrap().visible());

        points.remove_at(1).unwrap();
        sync.regenerate(&mut registry, &points, &style());
        let mesh = registry.mesh(handle).unwrap();
        assert!(!mesh.visible());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices().is_empty());
        assert!(mesh.normals().is_empty());
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = triangle();
        points.add(Vec3::new(0.0, 1.0, 0.5));

        let handle = sync.regenerate(&mut registry, &points, &style());
        let first = registry.mesh(handle).unwrap().clone();
        let material = sync.material_handle();

        sync.regenerate(&mut registry, &points, &style());
        let second = registry.mesh(handle).unwrap();

        assert_eq!(first.vertices(), second.vertices());
        assert_eq!(first.indices(), second.indices());
        assert_eq!(first.normals(), second.normals());
        assert_eq!(first.bounds(), second.bounds());
        assert_eq!(first.visible(), second.visible());
        assert_eq!(sync.material_handle(), material);
        assert_eq!(registry.mesh_count(), 1);
        assert_eq!(registry.material_count(), 1);
    }

    #[test]
    fn test_repeated_edits_do_not_leak_resources() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = PointSet::new();
        for i in 0..10 {
            points.add(Vec3::new(i as f32, (i * i) as f32, 0.0));
            sync.regenerate(&mut registry, &points, &style());
        }
        for _ in 0..10 {
            points.remove_at(0).unwrap();
            sync.regenerate(&mut registry, &points, &style());
        }
        assert_eq!(registry.mesh_count(), 1);
        assert_eq!(registry.material_count(), 1);
    }

    #[test]
    fn test_style_and_shadows_applied() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        sync.regenerate(&mut registry, &triangle(), &style());

        let state = sync.render_state();
        assert!(!state.cast_shadows);
        assert!(!state.receive_shadows);
        assert_eq!(state.material, sync.material_handle());

        let material = registry.material(sync.material_handle().unwrap()).unwrap();
        assert_eq!(material.color(), style().color);
        assert_eq!(
            Some(material.shader()),
            registry.find_shader(UNLIT_COLOR_SHADER)
        );

        let recolored = SurfaceStyle::new(Rgba::new(1.0, 0.0, 0.0, 1.0));
        sync.regenerate(&mut registry, &triangle(), &recolored);
        let material = registry.material(sync.material_handle().unwrap()).unwrap();
        assert_eq!(material.color(), recolored.color);
    }

    #[test]
    fn test_missing_shader_skips_material() {
        let mut registry = ResourceRegistry::new();
        let mut sync = AreaMeshSync::new();
        let handle = sync.regenerate(&mut registry, &triangle(), &style());

        assert!(registry.mesh(handle).unwrap().visible());
        assert!(sync.material_handle().is_none());
        assert_eq!(registry.material_count(), 0);
        assert_eq!(sync.render_state(), RenderState::overlay(None));
    }

    #[test]
    fn test_material_rebound_when_shader_changes() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        sync.regenerate(&mut registry, &triangle(), &style());
        let original = sync.material_handle().unwrap();

        // Point the material at a different shader behind the owner's back.
        let other = registry.register_shader(Shader::new("lit"));
        *registry.material_mut(original).unwrap() = Material::new(other);

        sync.regenerate(&mut registry, &triangle(), &style());
        let replaced = sync.material_handle().unwrap();
        assert_ne!(original, replaced);
        assert!(registry.material(original).is_none());
        assert_eq!(registry.material_count(), 1);
        assert_eq!(
            Some(registry.material(replaced).unwrap().shader()),
            registry.find_shader(UNLIT_COLOR_SHADER)
        );
    }

    #[test]
    fn test_mesh_recreated_if_removed_externally() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let first = sync.regenerate(&mut registry, &triangle(), &style());
        registry.remove_mesh(first);

        let second = sync.regenerate(&mut registry, &triangle(), &style());
        assert_ne!(first, second);
        assert_eq!(sync.mesh_handle(), Some(second));
        assert!(registry.mesh(second).unwrap().visible());
    }

    #[test]
    fn test_staleness_tracking() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let mut points = triangle();
        assert!(sync.is_stale(&points));

        let handle = sync.regenerate_if_stale(&mut registry, &points, &style());
        assert!(!sync.is_stale(&points));
        let version = registry.mesh(handle).unwrap().version();

        assert_eq!(sync.regenerate_if_stale(&mut registry, &points, &style()), handle);
        assert_eq!(registry.mesh(handle).unwrap().version(), version);

        points.set(0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(sync.is_stale(&points));
        assert_eq!(sync.regenerate_if_stale(&mut registry, &points, &style()), handle);
        assert_eq!(registry.mesh(handle).unwrap().version(), version + 1);
        assert_eq!(registry.mesh(handle).unwrap().vertices()[0], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_regenerate_if_stale_recreates_missing_mesh() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        let points = triangle();
        let first = sync.regenerate_if_stale(&mut registry, &points, &style());
        registry.remove_mesh(first);

        let second = sync.regenerate_if_stale(&mut registry, &points, &style());
        assert_ne!(first, second);
        assert!(registry.mesh(second).unwrap().visible());
    }

    #[test]
    fn test_release_frees_resources() {
        let mut registry = ResourceRegistry::with_default_shaders();
        let mut sync = AreaMeshSync::new();
        sync.regenerate(&mut registry, &triangle(), &style());
        sync.release(&mut registry);
        assert_eq!(registry.mesh_count(), 0);
        assert_eq!(registry.material_count(), 0);
        assert!(sync.mesh_handle().is_none());
    }
}
