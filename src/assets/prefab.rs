use std::sync::Arc;

use glam::Affine3A;

use crate::animation::clip::AnimationClip;
use crate::resources::mesh::Mesh;
use crate::scene::transform::Transform;

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: String,
    pub transform: Transform,
    /// Indices into `Prefab::nodes`
    pub children_indices: Vec<usize>,
    pub mesh: Option<Mesh>,
    /// Index into `Prefab::skeletons`
    pub skin_index: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            children_indices: Vec::new(),
            mesh: None,
            skin_index: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrefabSkeleton {
    pub name: String,
    /// Index of the root bone within `bone_indices`
    pub root_bone_index: usize,
    /// Indices into `Prefab::nodes`
    pub bone_indices: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// Decoded model file.
///
/// Thread-safe plain data without any scene handles; turn it into nodes with
/// [`Scene::instantiate`](crate::scene::Scene::instantiate).
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    pub root_indices: Vec<usize>,
    pub skeletons: Vec<PrefabSkeleton>,
    pub animations: Vec<AnimationClip>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

pub type SharedPrefab = Arc<Prefab>;
