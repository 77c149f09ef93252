//! The render surface the engine draws through.
//!
//! The engine does not own a renderer. It hands a [`ParticleMesh`] to a
//! [`RenderSurface`] when it is initialized, removes it again when it is
//! destroyed, and in between the surface reads the engine's
//! [`AttributeBuffers`](crate::AttributeBuffers) every frame.
//!
//! [`Scene`] is an in-memory surface that only keeps track of what is
//! attached. [`ParticleRenderer`](crate::gpu::ParticleRenderer) draws with
//! wgpu.

use std::convert::Infallible;
use std::path::PathBuf;

use crate::buffers::AttributeBuffers;
use crate::config::BlendStyle;

/// Handle of a mesh attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// How particle sprites are shaded and composited.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleMaterial {
    /// Blend mode.
    pub blend: BlendStyle,
    /// Whether sprites are depth tested against the rest of the scene.
    pub depth_test: bool,
    /// Sprite texture, or `None` for the built-in spark.
    pub texture: Option<PathBuf>,
}

impl ParticleMaterial {
    /// Material for a blend style; only normal blending is depth tested.
    pub fn new(blend: BlendStyle, texture: Option<PathBuf>) -> Self {
        Self {
            blend,
            depth_test: blend.depth_test(),
            texture,
        }
    }
}

/// The renderable an engine attaches to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleMesh {
    /// Number of particle slots (one sprite per slot).
    pub capacity: usize,
    pub material: ParticleMaterial,
}

impl ParticleMesh {
    /// Whether `buffers` has exactly one slot per sprite of this mesh.
    ///
    /// False after the engine is reconfigured to a different pool without
    /// being initialized again.
    pub fn fits(&self, buffers: &AttributeBuffers) -> bool {
        self.capacity == buffers.capacity()
    }
}

/// Somewhere particle meshes can be added to and removed from.
pub trait RenderSurface {
    /// Error raised when a mesh cannot be attached.
    type Error;

    /// Attach a mesh; it is drawn every frame until removed.
    fn add(&mut self, mesh: ParticleMesh) -> Result<MeshId, Self::Error>;

    /// Detach a mesh. Returns `None` if `id` is not attached.
    fn remove(&mut self, id: MeshId) -> Option<ParticleMesh>;
}

/// A surface that records attached meshes without drawing them.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<(MeshId, ParticleMesh)>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Look up an attached mesh.
    pub fn get(&self, id: MeshId) -> Option<&ParticleMesh> {
        self.meshes.iter().find(|(m, _)| *m == id).map(|(_, mesh)| mesh)
    }
}

impl RenderSurface for Scene {
    type Error = Infallible;

    fn add(&mut self, mesh: ParticleMesh) -> Result<MeshId, Infallible> {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.push((id, mesh));
        Ok(id)
    }

    fn remove(&mut self, id: MeshId) -> Option<ParticleMesh> {
        let index = self.meshes.iter().position(|(m, _)| *m == id)?;
        Some(self.meshes.remove(index).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(capacity: usize) -> ParticleMesh {
        ParticleMesh {
            capacity,
            material: ParticleMaterial::new(BlendStyle::Normal, None),
        }
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new();
        let a = scene.add(mesh(4)).unwrap();
        let b = scene.add(mesh(8)).unwrap();
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(b).map(|m| m.capacity), Some(8));

        assert_eq!(scene.remove(a).map(|m| m.capacity), Some(4));
        assert_eq!(scene.remove(a), None);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_mesh_fits_matching_buffers() {
        assert!(mesh(4).fits(&AttributeBuffers::new(4)));
        assert!(!mesh(4).fits(&AttributeBuffers::new(5)));
        assert!(!mesh(4).fits(&AttributeBuffers::new(3)));
    }

    #[test]
    fn test_material_depth_follows_blend() {
        assert!(ParticleMaterial::new(BlendStyle::Normal, None).depth_test);
        assert!(!ParticleMaterial::new(BlendStyle::Additive, None).depth_test);
        assert!(!ParticleMaterial::new(BlendStyle::Multiply, None).depth_test);
    }
}
