//! The editable area entity: points, style, transform and mesh sync together.

use glam::Vec3;
use polyarea_data::{PointSet, PointSetError, Rgba};
use polyarea_mesh::{AreaMeshSync, Handle, MeshBuffer, ResourceRegistry, SurfaceStyle};
use tracing::debug;

use crate::frame::LocalFrame;

/// A polygon area as seen by editors.
///
/// Every edit path (viewport gestures, inspector fields, scripts) goes through
/// these methods, and every successful edit regenerates the mesh before
/// returning. Failed edits change nothing and do not regenerate.
#[derive(Debug)]
pub struct EditableArea {
    points: PointSet,
    style: SurfaceStyle,
    frame: LocalFrame,
    sync: AreaMeshSync,
}

impl EditableArea {
    /// A new, empty area. Nothing is allocated until the first edit or
    /// [`initialize`](Self::initialize).
    pub fn new(frame: LocalFrame, style: SurfaceStyle) -> Self {
        Self {
            points: PointSet::new(),
            style,
            frame,
            sync: AreaMeshSync::new(),
        }
    }

    /// Rebuild an area from persisted points and color.
    ///
    /// Call [`initialize`](Self::initialize) before the first render.
    pub fn restore(points: PointSet, color: Rgba, frame: LocalFrame) -> Self {
        Self {
            points,
            style: SurfaceStyle::new(color),
            frame,
            sync: AreaMeshSync::new(),
        }
    }

    /// Bring the mesh in line with the current points. Does nothing if it
    /// already is.
    pub fn initialize(&mut self, registry: &mut ResourceRegistry) -> Handle<MeshBuffer> {
        self.sync
            .regenerate_if_stale(registry, &self.points, &self.style)
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    pub fn sync(&self) -> &AreaMeshSync {
        &self.sync
    }

    pub fn mesh_handle(&self) -> Option<Handle<MeshBuffer>> {
        self.sync.mesh_handle()
    }

    /// Points transformed to world space, for display and hit testing.
    pub fn world_points(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.points.iter().map(|p| self.frame.to_world(p))
    }

    pub fn set_color(&mut self, registry: &mut ResourceRegistry, color: Rgba) {
        self.style.color = color;
        self.regenerate(registry);
    }

    /// Append a local-space point; returns its index.
    pub fn add_point(&mut self, registry: &mut ResourceRegistry, local: Vec3) -> usize {
        self.points.add(local);
        self.regenerate(registry);
        self.points.len() - 1
    }

    pub fn insert_point(
        &mut self,
        registry: &mut ResourceRegistry,
        index: usize,
        local: Vec3,
    ) -> Result<(), PointSetError> {
        self.points.insert(index, local)?;
        self.regenerate(registry);
        Ok(())
    }

    /// Remove a point; returns the removed local position.
    pub fn remove_point(
        &mut self,
        registry: &mut ResourceRegistry,
        index: usize,
    ) -> Result<Vec3, PointSetError> {
        let removed = self.points.remove_at(index)?;
        self.regenerate(registry);
        Ok(removed)
    }

    /// Move a point to a new local position; returns the previous one.
    pub fn move_point(
        &mut self,
        registry: &mut ResourceRegistry,
        index: usize,
        local: Vec3,
    ) -> Result<Vec3, PointSetError> {
        let previous = self.points.set(index, local)?;
        self.regenerate(registry);
        Ok(previous)
    }

    pub fn clear_points(&mut self, registry: &mut ResourceRegistry) {
        self.points.clear();
        self.regenerate(registry);
    }

    /// Free render resources; the area must not be edited afterwards.
    pub fn release(&mut self, registry: &mut ResourceRegistry) {
        self.sync.release(registry);
    }

    fn regenerate(&mut self, registry: &mut ResourceRegistry) -> Handle<MeshBuffer> {
        let handle = self.sync.regenerate(registry, &self.points, &self.style);
        debug!(
            "Area synced at revision {} ({} points)",
            self.points.revision(),
            self.points.len()
        );
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Affine3A;

    fn area() -> (EditableArea, ResourceRegistry) {
        (
            EditableArea::new(LocalFrame::IDENTITY, SurfaceStyle::default()),
            ResourceRegistry::with_default_shaders(),
        )
    }

    #[test]
    fn test_every_edit_regenerates() {
        let (mut area, mut registry) = area();
        area.add_point(&mut registry, Vec3::ZERO);
        area.add_point(&mut registry, Vec3::X);
        let handle = area.mesh_handle().unwrap();
        assert!(!registry.mesh(handle).unwrap().visible());

        area.add_point(&mut registry, Vec3::new(1.0, 0.0, 1.0));
        assert!(registry.mesh(handle).unwrap().visible());
        assert!(!area.sync().is_stale(area.points()));

        area.move_point(&mut registry, 2, Vec3::new(2.0, 0.0, 2.0)).unwrap();
        assert_eq!(registry.mesh(handle).unwrap().vertices()[2], Vec3::new(2.0, 0.0, 2.0));

        area.remove_point(&mut registry, 0).unwrap();
        assert!(!registry.mesh(handle).unwrap().visible());
        assert_eq!(area.mesh_handle(), Some(handle));
    }

    #[test]
    fn test_failed_edit_does_not_touch_mesh() {
        let (mut area, mut registry) = area();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Z] {
            area.add_point(&mut registry, p);
        }
        let handle = area.mesh_handle().unwrap();
        let version = registry.mesh(handle).unwrap().version();

        assert!(area.remove_point(&mut registry, 3).is_err());
        assert!(area.move_point(&mut registry, 7, Vec3::ONE).is_err());
        assert!(area.insert_point(&mut registry, 9, Vec3::ONE).is_err());
        assert_eq!(registry.mesh(handle).unwrap().version(), version);
        assert_eq!(area.points().len(), 3);
    }

    #[test]
    fn test_restore_then_initialize_renders_immediately() {
        let points = PointSet::from_points(vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0)]);
        let color = Rgba::new(1.0, 0.0, 0.0, 0.5);
        let mut area = EditableArea::restore(points, color, LocalFrame::IDENTITY);
        let mut registry = ResourceRegistry::with_default_shaders();

        let handle = area.initialize(&mut registry);
        let mesh = registry.mesh(handle).unwrap();
        assert!(mesh.visible());
        assert_eq!(mesh.indices(), &[0, 2, 1]);

        let material = registry.material(area.sync().material_handle().unwrap()).unwrap();
        assert_eq!(material.color(), color);

        let version = registry.mesh(handle).unwrap().version();
        assert_eq!(area.initialize(&mut registry), handle);
        assert_eq!(registry.mesh(handle).unwrap().version(), version);
    }

    #[test]
    fn test_world_points_follow_frame() {
        let frame = LocalFrame::new(Affine3A::from_translation(Vec3::new(0.0, 5.0, 0.0))).unwrap();
        let mut area = EditableArea::new(frame, SurfaceStyle::default());
        let mut registry = ResourceRegistry::with_default_shaders();
        area.add_point(&mut registry, Vec3::X);
        let world: Vec<Vec3> = area.world_points().collect();
        assert_eq!(world, vec![Vec3::new(1.0, 5.0, 0.0)]);
    }

    #[test]
    fn test_set_color_updates_material() {
        let (mut area, mut registry) = area();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Z] {
            area.add_point(&mut registry, p);
        }
        area.set_color(&mut registry, Rgba::WHITE);
        let material = registry.material(area.sync().material_handle().unwrap()).unwrap();
        assert_eq!(material.color(), Rgba::WHITE);
    }

    #[test]
    fn test_clear_and_release() {
        let (mut area, mut registry) = area();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Z] {
            area.add_point(&mut registry, p);
        }
        area.clear_points(&mut registry);
        assert!(area.points().is_empty());
        assert!(!registry.mesh(area.mesh_handle().unwrap()).unwrap().visible());

        area.release(&mut registry);
        assert_eq!(registry.mesh_count(), 0);
    }
}
