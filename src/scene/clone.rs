//! Skeleton-aware deep clone.
//!
//! [`Scene::clone_subtree`] copies nodes and meshes, but a skinned node in the
//! copy still binds to the source's skeleton, whose bones are the source's
//! bone nodes. Animating such a copy would move every instance at once.
//! [`clone_skinned`] finishes the job: every skinned node in the copy gets its
//! own skeleton whose bones are the copy's bone nodes.

use rustc_hash::FxHashMap;

use crate::errors::{MannyError, Result};
use crate::scene::skeleton::SkinBinding;
use crate::scene::{NodeHandle, Scene};

/// Clones the subtree rooted at `source` into a fully independent instance.
///
/// The source and its structural copy are walked in lock-step; any divergence
/// in shape or order, or a bone that lives outside the cloned subtree, is
/// reported as [`MannyError::SkeletonMismatch`] and the partial copy is removed.
pub fn clone_skinned(scene: &mut Scene, source: NodeHandle) -> Result<NodeHandle> {
    let cloned = scene
        .clone_subtree(source)
        .ok_or_else(|| MannyError::NodeNotFound(format!("{source:?}")))?;

    match remap_skeletons(scene, source, cloned) {
        Ok(()) => Ok(cloned),
        Err(err) => {
            scene.remove_node(cloned);
            Err(err)
        }
    }
}

fn remap_skeletons(scene: &mut Scene, source: NodeHandle, cloned: NodeHandle) -> Result<()> {
    let source_nodes = scene.traverse(source);
    let cloned_nodes = scene.traverse(cloned);

    if source_nodes.len() != cloned_nodes.len() {
        return Err(MannyError::SkeletonMismatch(format!(
            "source has {} nodes, clone has {}",
            source_nodes.len(),
            cloned_nodes.len()
        )));
    }

    let mut clone_of: FxHashMap<NodeHandle, NodeHandle> = FxHashMap::default();
    let mut source_of: FxHashMap<NodeHandle, NodeHandle> = FxHashMap::default();

    for (&s, &c) in source_nodes.iter().zip(&cloned_nodes) {
        let (Some(source_node), Some(cloned_node)) = (scene.get_node(s), scene.get_node(c)) else {
            return Err(MannyError::SkeletonMismatch(
                "node vanished during traversal".to_string(),
            ));
        };
        if source_node.name != cloned_node.name
            || source_node.children.len() != cloned_node.children.len()
        {
            return Err(MannyError::SkeletonMismatch(format!(
                "node '{}' does not line up with clone node '{}'",
                source_node.name, cloned_node.name
            )));
        }
        clone_of.insert(s, c);
        source_of.insert(c, s);
    }

    for &c in &cloned_nodes {
        if !scene.nodes[c].is_skinned() {
            continue;
        }

        let s = source_of[&c];
        let source_binding = scene.nodes[s].skin.clone().ok_or_else(|| {
            MannyError::SkeletonMismatch(format!(
                "clone of '{}' is skinned but its source is not",
                scene.nodes[s].name
            ))
        })?;
        let source_skeleton = scene.skins.get(source_binding.skeleton).ok_or_else(|| {
            MannyError::SkeletonMismatch(format!(
                "skeleton of '{}' is missing",
                scene.nodes[s].name
            ))
        })?;

        let mut skeleton = source_skeleton.duplicate();
        skeleton.bones = source_skeleton
            .bones
            .iter()
            .map(|bone| {
                clone_of.get(bone).copied().ok_or_else(|| {
                    MannyError::SkeletonMismatch(format!(
                        "skeleton '{}' references a bone outside the cloned subtree",
                        source_skeleton.name
                    ))
                })
            })
            .collect::<Result<_>>()?;

        let key = scene.skins.insert(skeleton);
        scene.nodes[c].skin = Some(SkinBinding {
            skeleton: key,
            ..source_binding
        });
    }

    Ok(())
}
