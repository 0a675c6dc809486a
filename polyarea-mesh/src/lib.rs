//! Polyarea Mesh Crate
//!
//! Render resources for polygon areas: handle-addressed mesh buffers and
//! materials, vertex normals, and [`AreaMeshSync`], which keeps a mesh in step
//! with a [`polyarea_data::PointSet`].

pub mod material;
pub mod mesh;
pub mod normals;
pub mod resource;
pub mod resource_registry;
pub mod sync;

pub use material::{Material, RenderState, Shader, UNLIT_COLOR_SHADER};
pub use mesh::{GpuVertex, MeshBuffer};
pub use resource::Handle;
pub use resource_registry::ResourceRegistry;
pub use sync::{AreaMeshSync, SurfaceStyle, SyncConfig};
