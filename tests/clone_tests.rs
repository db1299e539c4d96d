//! Skeletal Clone Tests
//!
//! Tests for:
//! - Structural copy (Scene::clone_subtree) sharing skeletons
//! - clone_skinned giving every copy its own skeleton
//! - Pose independence between clones
//! - Loud failure on bones outside the cloned subtree

mod common;

use glam::{Affine3A, Quat, Vec3};

use manny::scene::{Node, Skeleton, SkinBinding};
use manny::{MannyError, NodeHandle, Scene, clone_skinned};

use common::{quat_approx, rig_prefab};

fn skeleton_of<'a>(scene: &'a Scene, root: NodeHandle, mesh: &str) -> &'a Skeleton {
    let node = scene.find_node_by_name(root, mesh).unwrap();
    let key = scene.get_node(node).unwrap().skin.as_ref().unwrap().skeleton;
    &scene.skins[key]
}

// ============================================================================
// Structural copy
// ============================================================================

#[test]
fn clone_subtree_preserves_shape_and_names() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let copy = scene.clone_subtree(template).unwrap();

    let names = |root| -> Vec<String> {
        scene
            .traverse(root)
            .into_iter()
            .map(|h| scene.get_name(h).unwrap().to_string())
            .collect()
    };
    assert_eq!(names(template), names(copy));
    assert!(scene.get_node(copy).unwrap().parent().is_none());
}

#[test]
fn clone_subtree_alone_shares_skeleton() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let copy = scene.clone_subtree(template).unwrap();

    let original = skeleton_of(&scene, template, "Body").id;
    let shared = skeleton_of(&scene, copy, "Body").id;
    assert_eq!(original, shared);
}

// ============================================================================
// clone_skinned
// ============================================================================

#[test]
fn clone_gets_its_own_skeleton() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let skins_before = scene.skins.len();

    let copy = clone_skinned(&mut scene, template).unwrap();

    assert_eq!(scene.skins.len(), skins_before + 2);
    assert_ne!(
        skeleton_of(&scene, template, "Body").id,
        skeleton_of(&scene, copy, "Body").id
    );
}

#[test]
fn cloned_bones_live_in_the_clone() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let copy = clone_skinned(&mut scene, template).unwrap();

    let copy_nodes = scene.traverse(copy);
    let skeleton = skeleton_of(&scene, copy, "Body");
    assert_eq!(skeleton.bones.len(), 3);
    for bone in &skeleton.bones {
        assert!(copy_nodes.contains(bone));
    }

    let bone_names: Vec<_> = skeleton
        .bones
        .iter()
        .map(|&b| scene.get_name(b).unwrap())
        .collect();
    assert_eq!(bone_names, ["Hips", "Spine", "Head"]);
    assert_eq!(skeleton.root_bone(), scene.find_node_by_name(copy, "Hips"));
}

#[test]
fn bind_matrices_are_copied() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let body = scene.find_node_by_name(template, "Body").unwrap();
    let bind = Affine3A::from_translation(Vec3::new(0.0, 0.5, 0.0));
    {
        let skin = scene.get_node_mut(body).unwrap().skin.as_mut().unwrap();
        *skin = SkinBinding::new(skin.skeleton, bind);
    }

    let copy = clone_skinned(&mut scene, template).unwrap();
    let copy_body = scene.find_node_by_name(copy, "Body").unwrap();
    let copied = scene.get_node(copy_body).unwrap().skin.as_ref().unwrap();
    assert_eq!(copied.bind_matrix, bind);
    assert_eq!(copied.bind_matrix_inv, bind.inverse());
}

#[test]
fn posing_one_clone_leaves_the_other_alone() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let a = clone_skinned(&mut scene, template).unwrap();
    let b = clone_skinned(&mut scene, template).unwrap();
    scene.update();
    let b_joints_before = skeleton_of(&scene, b, "Body").joint_matrices().to_vec();

    let spine_a = scene.find_node_by_name(a, "Spine").unwrap();
    scene.get_node_mut(spine_a).unwrap().transform.rotation = Quat::from_rotation_z(1.0);
    scene.update();

    let spine_b = scene.find_node_by_name(b, "Spine").unwrap();
    assert!(quat_approx(
        scene.get_node(spine_b).unwrap().transform.rotation,
        Quat::IDENTITY
    ));
    assert_eq!(skeleton_of(&scene, b, "Body").joint_matrices(), &b_joints_before[..]);
    assert_ne!(
        skeleton_of(&scene, a, "Body").joint_matrices(),
        &b_joints_before[..]
    );
}

#[test]
fn removing_a_clone_keeps_template_skeleton() {
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(true));
    let skins_before = scene.skins.len();
    let nodes_before = scene.nodes.len();

    let copy = clone_skinned(&mut scene, template).unwrap();
    scene.remove_node(copy);

    assert_eq!(scene.skins.len(), skins_before);
    assert_eq!(scene.nodes.len(), nodes_before);
    assert!(skeleton_of(&scene, template, "Body").root_bone().is_some());
}

// ============================================================================
// Failure
// ============================================================================

#[test]
fn bone_outside_subtree_fails_loudly() {
    let mut scene = Scene::new();
    let outside = scene.create_node_with_name("Stray");
    let template = scene.create_node_with_name("Template");
    let body = scene.add_to_parent(Node::new("Body"), template);

    let key = scene
        .skins
        .insert(Skeleton::new("Rig", vec![outside], vec![Affine3A::IDENTITY], 0));
    scene.get_node_mut(body).unwrap().skin = Some(SkinBinding::new(key, Affine3A::IDENTITY));

    let nodes_before = scene.nodes.len();
    let skins_before = scene.skins.len();
    let err = clone_skinned(&mut scene, template).unwrap_err();

    assert!(matches!(err, MannyError::SkeletonMismatch(_)), "got {err:?}");
    assert_eq!(scene.nodes.len(), nodes_before);
    assert_eq!(scene.skins.len(), skins_before);
}

#[test]
fn missing_source_is_reported() {
    let mut scene = Scene::new();
    let node = scene.create_node_with_name("Gone");
    scene.remove_node(node);

    assert!(matches!(
        clone_skinned(&mut scene, node),
        Err(MannyError::NodeNotFound(_))
    ));
}
