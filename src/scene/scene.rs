use std::sync::atomic::{AtomicU32, Ordering};

use glam::Affine3A;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::assets::prefab::Prefab;
use crate::resources::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::skeleton::{BindMode, Skeleton, SkinBinding};
use crate::scene::{MeshKey, NodeHandle, SkeletonKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph container.
///
/// Pure data: nodes, their mesh components and the skeletons skinned nodes
/// bind to. Nothing here owns GPU state.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // === Component pools ===
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),
        }
    }

    // ========================================================================
    // Node creation & hierarchy
    // ========================================================================

    /// Creates an empty named node at the root.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Adds a node to the scene as a root node.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        self.link(parent, handle);
        handle
    }

    /// Adds a mesh component on a new node under `parent`.
    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::new(&mesh.name);
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_to_parent(node, parent)
    }

    /// Re-parents `child` under `parent`, detaching it from its previous parent
    /// (or from the root list).
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }

        self.detach(child);
        self.link(parent, child);
    }

    fn detach(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    fn link(&mut self, parent: NodeHandle, child: NodeHandle) {
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Removes a node and its whole subtree, including mesh components and
    /// any skeleton no surviving node binds to.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        let subtree = self.traverse(handle);
        self.detach(handle);

        let mut released_skins = FxHashSet::default();
        for node_handle in subtree {
            if let Some(node) = self.nodes.remove(node_handle) {
                if let Some(mesh) = node.mesh {
                    self.meshes.remove(mesh);
                }
                if let Some(skin) = node.skin {
                    released_skins.insert(skin.skeleton);
                }
            }
        }

        for (_, node) in &self.nodes {
            if let Some(skin) = &node.skin {
                released_skins.remove(&skin.skeleton);
            }
        }
        for key in released_skins {
            self.skins.remove(key);
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.name = name.to_string();
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Pre-order depth-first walk of the subtree rooted at `root`, children
    /// visited in their stored order. Two structurally identical subtrees yield
    /// node lists that correspond index for index.
    #[must_use]
    pub fn traverse(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First node named `name` in the subtree of `root` (pre-order).
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.traverse(root)
            .into_iter()
            .find(|&h| self.nodes.get(h).is_some_and(|n| n.name == name))
    }

    // ========================================================================
    // Cloning & instantiation
    // ========================================================================

    /// Structural copy of a subtree, returned as a new root node.
    ///
    /// Mesh components are duplicated, but skin bindings are copied verbatim,
    /// so the copy still points at the source's skeletons. Use
    /// [`clone_skinned`](crate::scene::clone_skinned) for an independent rig.
    pub fn clone_subtree(&mut self, source: NodeHandle) -> Option<NodeHandle> {
        let root = self.clone_node_recursive(source, None)?;
        self.root_nodes.push(root);
        Some(root)
    }

    fn clone_node_recursive(
        &mut self,
        source: NodeHandle,
        parent: Option<NodeHandle>,
    ) -> Option<NodeHandle> {
        let mut node = self.nodes.get(source)?.clone();
        let children = std::mem::take(&mut node.children);
        node.parent = parent;
        node.transform.mark_dirty();
        node.mesh = node
            .mesh
            .and_then(|key| self.meshes.get(key).cloned())
            .map(|mesh| self.meshes.insert(mesh));

        let handle = self.nodes.insert(node);
        for child in children {
            if let Some(cloned) = self.clone_node_recursive(child, Some(handle)) {
                self.nodes[handle].children.push(cloned);
            }
        }
        Some(handle)
    }

    /// Builds scene nodes from a decoded model. The returned root groups the
    /// prefab's root nodes; every skeleton is created fresh.
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let root = self.create_node_with_name(&prefab.name);

        let mut handles = Vec::with_capacity(prefab.nodes.len());
        for prefab_node in &prefab.nodes {
            let mut node = Node::new(&prefab_node.name);
            node.transform = prefab_node.transform.clone();
            node.mesh = prefab_node
                .mesh
                .as_ref()
                .map(|mesh| self.meshes.insert(mesh.clone()));
            handles.push(self.nodes.insert(node));
        }

        for (i, prefab_node) in prefab.nodes.iter().enumerate() {
            for &child in &prefab_node.children_indices {
                if let Some(&child_handle) = handles.get(child) {
                    self.link(handles[i], child_handle);
                }
            }
        }
        for &index in &prefab.root_indices {
            if let Some(&handle) = handles.get(index) {
                self.link(root, handle);
            }
        }

        let skeleton_keys: Vec<SkeletonKey> = prefab
            .skeletons
            .iter()
            .map(|s| {
                let bones = s
                    .bone_indices
                    .iter()
                    .filter_map(|&i| handles.get(i).copied())
                    .collect();
                self.skins.insert(Skeleton::new(
                    &s.name,
                    bones,
                    s.inverse_bind_matrices.clone(),
                    s.root_bone_index,
                ))
            })
            .collect();

        self.update_subtree(root);

        for (i, prefab_node) in prefab.nodes.iter().enumerate() {
            if let Some(skin_index) = prefab_node.skin_index
                && let Some(&key) = skeleton_keys.get(skin_index)
            {
                let node = &mut self.nodes[handles[i]];
                node.skin = Some(SkinBinding::new(key, node.transform.world_matrix));
            }
        }

        root
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Updates the world matrices of the whole scene. Call once per frame
    /// after animation has written its transforms.
    pub fn update_matrix_world(&mut self) {
        let roots: Vec<_> = self
            .root_nodes
            .iter()
            .map(|&h| (h, Affine3A::IDENTITY, false))
            .collect();
        self.update_hierarchy(roots);
    }

    /// Updates the world matrices of one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        let parent_world = self
            .nodes
            .get(root)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);
        self.update_hierarchy(vec![(root, parent_world, true)]);
    }

    // Iterative to avoid stack overflow on deep rigs.
    fn update_hierarchy(&mut self, mut stack: Vec<(NodeHandle, Affine3A, bool)>) {
        stack.reverse();
        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let changed = node.transform.update_local_matrix() || parent_changed;
            if changed {
                node.transform.world_matrix = parent_world * node.transform.local_matrix;
            }
            let world = node.transform.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world, changed));
            }
        }
    }

    pub fn update_skeletons(&mut self) {
        let mut tasks = Vec::new();
        for (_, node) in &self.nodes {
            if let Some(binding) = &node.skin {
                let root_inv = match binding.bind_mode {
                    BindMode::Attached => node.transform.world_matrix.inverse(),
                    BindMode::Detached => binding.bind_matrix_inv,
                };
                tasks.push((binding.skeleton, root_inv));
            }
        }

        let nodes = &self.nodes;
        for (key, root_inv) in tasks {
            if let Some(skeleton) = self.skins.get_mut(key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }

    /// Per-frame scene update: world matrices, then joint matrices.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }
}
