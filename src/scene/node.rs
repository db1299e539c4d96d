use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle, SkinBinding};
use glam::Affine3A;

/// A scene node.
///
/// Nodes form a tree through parent-child handles. Components are attached
/// directly: a node may carry a mesh (stored in [`Scene::meshes`]) and, if the
/// mesh is skinned, a [`SkinBinding`] pointing at a skeleton in [`Scene::skins`].
///
/// [`Scene::meshes`]: crate::scene::Scene::meshes
/// [`Scene::skins`]: crate::scene::Scene::skins
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    pub transform: Transform,

    // === Core State ===
    pub visible: bool,
    /// When false the renderer must not cull this node against the view frustum.
    pub frustum_culled: bool,

    // === Components ===
    pub mesh: Option<MeshKey>,
    pub skin: Option<SkinBinding>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            frustum_culled: true,
            mesh: None,
            skin: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }

    /// Returns the world transformation matrix computed by the last
    /// [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
