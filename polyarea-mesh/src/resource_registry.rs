use crate::material::{Material, Shader};
use crate::mesh::MeshBuffer;
use crate::resource::{Handle, next_handle_id};
use std::collections::HashMap;
use tracing::debug;

/// Registry mapping handles to render resources
/// Owns every mesh buffer, material and shader; owners and renderers only keep handles
pub struct ResourceRegistry {
    meshes: HashMap<u64, MeshBuffer>,
    materials: HashMap<u64, Material>,
    shaders: HashMap<u64, Shader>,
    shader_names: HashMap<String, Handle<Shader>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            materials: HashMap::new(),
            shaders: HashMap::new(),
            shader_names: HashMap::new(),
        }
    }

    /// Registry with the built-in unlit color shader already available
    pub fn with_default_shaders() -> Self {
        let mut registry = Self::new();
        registry.register_shader(Shader::new(crate::material::UNLIT_COLOR_SHADER));
        registry
    }

    /// Get a mesh by handle
    pub fn mesh(&self, handle: Handle<MeshBuffer>) -> Option<&MeshBuffer> {
        self.meshes.get(&handle.id())
    }

    /// Get the mesh behind `handle`, or register a new one if the handle is
    /// absent or no longer valid
    pub fn mesh_or_insert_with(
        &mut self,
        handle: Option<Handle<MeshBuffer>>,
        create: impl FnOnce() -> MeshBuffer,
    ) -> (Handle<MeshBuffer>, &mut MeshBuffer) {
        let handle = handle
            .filter(|h| self.meshes.contains_key(&h.id()))
            .unwrap_or_else(|| Handle::new(next_handle_id()));
        let mesh = self.meshes.entry(handle.id()).or_insert_with(|| {
            let mesh = create();
            debug!("Registered mesh '{}' as {:?}", mesh.label(), handle);
            mesh
        });
        (handle, mesh)
    }

    /// Remove a mesh, invalidating its handle
    pub fn remove_mesh(&mut self, handle: Handle<MeshBuffer>) -> Option<MeshBuffer> {
        self.meshes.remove(&handle.id())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Register a material
    pub fn insert_material(&mut self, material: Material) -> Handle<Material> {
        let handle = Handle::new(next_handle_id());
        self.materials.insert(handle.id(), material);
        handle
    }

    /// Get a material by handle
    pub fn material(&self, handle: Handle<Material>) -> Option<&Material> {
        self.materials.get(&handle.id())
    }

    /// Get a material mutably by handle
    pub fn material_mut(&mut self, handle: Handle<Material>) -> Option<&mut Material> {
        self.materials.get_mut(&handle.id())
    }

    /// Remove a material, invalidating its handle
    pub fn remove_material(&mut self, handle: Handle<Material>) -> Option<Material> {
        self.materials.remove(&handle.id())
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Register a shader; registering an existing name returns the existing handle
    pub fn register_shader(&mut self, shader: Shader) -> Handle<Shader> {
        if let Some(&existing) = self.shader_names.get(shader.name()) {
            return existing;
        }
        let handle = Handle::new(next_handle_id());
        self.shader_names.insert(shader.name().to_string(), handle);
        self.shaders.insert(handle.id(), shader);
        handle
    }

    /// Look up a shader by name
    pub fn find_shader(&self, name: &str) -> Option<Handle<Shader>> {
        self.shader_names.get(name).copied()
    }

    /// Get a shader by handle
    pub fn shader(&self, handle: Handle<Shader>) -> Option<&Shader> {
        self.shaders.get(&handle.id())
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
