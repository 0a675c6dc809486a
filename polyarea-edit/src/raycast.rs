//! Ray casting against scene surfaces.
//!
//! The editing controller only needs "where does this pointer ray hit the
//! world". Scenes provide that through [`SceneRaycast`].

use glam::Vec3;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Closest intersection of a ray with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Anything a pointer ray can hit.
pub trait SceneRaycast {
    /// Nearest hit within `max_distance` along the ray, if any.
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit>;
}

/// Infinite plane, hit from either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl GroundPlane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Horizontal plane at the given height.
    pub fn horizontal(height: f32) -> Self {
        Self::new(Vec3::new(0.0, height, 0.0), Vec3::Y)
    }
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

impl SceneRaycast for GroundPlane {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / denom;
        if !(0.0..=max_distance).contains(&t) {
            return None;
        }
        let normal = if denom < 0.0 { self.normal } else { -self.normal };
        Some(RaycastHit {
            point: ray.at(t),
            normal,
            distance: t,
        })
    }
}

/// Triangle soup in world space.
#[derive(Debug, Clone, Default)]
pub struct TriangleSurface {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl TriangleSurface {
    /// Build a surface; triangles referencing missing vertices are dropped.
    pub fn new(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let indices = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < positions.len()))
            .flatten()
            .copied()
            .collect();
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl SceneRaycast for TriangleSurface {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let mut closest: Option<RaycastHit> = None;
        for tri in self.indices.chunks_exact(3) {
            let v0 = self.positions[tri[0] as usize];
            let v1 = self.positions[tri[1] as usize];
            let v2 = self.positions[tri[2] as usize];

            let Some(t) = ray_triangle_intersection(ray, v0, v1, v2) else {
                continue;
            };
            if t > max_distance || closest.is_some_and(|hit| hit.distance <= t) {
                continue;
            }

            let mut normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            if normal.dot(ray.direction) > 0.0 {
                normal = -normal;
            }
            closest = Some(RaycastHit {
                point: ray.at(t),
                normal,
                distance: t,
            });
        }
        closest
    }
}

/// Möller–Trumbore intersection; returns the distance along the ray.
fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// A set of surfaces; reports the nearest hit among them.
#[derive(Default)]
pub struct Scene {
    surfaces: Vec<Box<dyn SceneRaycast>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: impl SceneRaycast + 'static) -> &mut Self {
        self.surfaces.push(Box::new(surface));
        self
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SceneRaycast for Scene {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        self.surfaces
            .iter()
            .filter_map(|s| s.raycast(ray, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
