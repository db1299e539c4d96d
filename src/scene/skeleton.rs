use glam::{Affine3A, Mat4};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::scene::{Node, NodeHandle, SkeletonKey};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindMode {
    /// Bones follow node movement (character skinning).
    /// The mesh-space correction is the skinned node's inverse world matrix.
    Attached,
    /// Bones are detached from the node; the inverse bind matrix recorded at
    /// bind time is used instead.
    Detached,
}

/// Binds a skinned node to a skeleton.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
    pub bind_mode: BindMode,
    /// World matrix of the mesh at bind time.
    pub bind_matrix: Affine3A,
    /// Inverse of `bind_matrix` (used for Detached mode).
    pub bind_matrix_inv: Affine3A,
}

impl SkinBinding {
    #[must_use]
    pub fn new(skeleton: SkeletonKey, bind_matrix: Affine3A) -> Self {
        Self {
            skeleton,
            bind_mode: BindMode::Attached,
            bind_matrix,
            bind_matrix_inv: bind_matrix.inverse(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    /// Ordered bone list; `bones[i]` corresponds to joint `i` of the skinned mesh.
    pub bones: Vec<NodeHandle>,

    /// Transforms vertices from mesh space to bone local space. Static after load.
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    /// Root bone index (usually 0).
    pub(crate) root_bone_index: usize,

    /// Final per-joint matrices, recomputed every frame.
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        let count = bones.len();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Returns an independent copy with a fresh id. Bone handles still point
    /// at the original bones; the caller remaps them.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// Updates the joint matrices.
    ///
    /// * `nodes`: node storage the bones' world matrices are read from
    /// * `root_matrix_inv`: inverse world matrix of the skinned node, bringing
    ///   bone transforms back into mesh space
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Affine3A::IDENTITY);

            self.joint_matrices[i] =
                (root_matrix_inv * bone_node.transform.world_matrix * ibm).into();
        }
    }
}
