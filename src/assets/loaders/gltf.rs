use glam::{Affine3A, Mat4, Quat, Vec3};
use rustc_hash::FxHashSet;

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::loaders::{SceneDecoder, normalize_clip_name};
use crate::assets::prefab::{Prefab, PrefabNode, PrefabSkeleton};
use crate::errors::Result;
use crate::resources::mesh::Mesh;
use crate::scene::transform::Transform;

/// Decodes self-contained glTF: `.glb` or `.gltf` with embedded buffers.
pub struct GltfDecoder;

impl SceneDecoder for GltfDecoder {
    fn decode(&self, uri: &str, bytes: &[u8]) -> Result<Prefab> {
        let (document, buffers, _images) = ::gltf::import_slice(bytes)?;
        let buffers: Vec<&[u8]> = buffers.iter().map(|b| b.0.as_slice()).collect();

        let mut prefab = Prefab::new(uri);
        prefab.nodes = document.nodes().map(|node| load_node(&node)).collect();
        prefab.root_indices = root_indices(&document);
        prefab.skeletons = document
            .skins()
            .map(|skin| load_skin(&skin, &buffers))
            .collect();
        prefab.animations = document
            .animations()
            .map(|anim| load_animation(&anim, &buffers))
            .collect();

        log::debug!(
            "Decoded {uri}: {} nodes, {} skins, {} animations",
            prefab.nodes.len(),
            prefab.skeletons.len(),
            prefab.animations.len()
        );
        Ok(prefab)
    }
}

fn node_name(node: &::gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn load_node(node: &::gltf::Node) -> PrefabNode {
    let mut prefab_node = PrefabNode::new(&node_name(node));

    let (t, r, s) = node.transform().decomposed();
    prefab_node.transform =
        Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));
    prefab_node.children_indices = node.children().map(|c| c.index()).collect();
    prefab_node.mesh = node.mesh().map(|mesh| {
        Mesh::new(mesh.name().unwrap_or(prefab_node.name.as_str()))
    });
    prefab_node.skin_index = node.skin().map(|skin| skin.index());
    prefab_node
}

fn root_indices(document: &::gltf::Document) -> Vec<usize> {
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }
    let children: FxHashSet<usize> = document
        .nodes()
        .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
        .collect();
    document
        .nodes()
        .map(|n| n.index())
        .filter(|i| !children.contains(i))
        .collect()
}

fn load_skin(skin: &::gltf::Skin, buffers: &[&[u8]]) -> PrefabSkeleton {
    let joints: Vec<_> = skin.joints().collect();

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).copied());
    let inverse_bind_matrices: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter
            .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
            .collect(),
        None => vec![Affine3A::IDENTITY; joints.len()],
    };

    // Root bone: the declared skeleton root, else the first joint whose
    // parent is not itself a joint.
    let joint_indices: FxHashSet<usize> = joints.iter().map(|n| n.index()).collect();
    let child_joints: FxHashSet<usize> = joints
        .iter()
        .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
        .filter(|i| joint_indices.contains(i))
        .collect();
    let root_bone_index = skin
        .skeleton()
        .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
        .or_else(|| joints.iter().position(|n| !child_joints.contains(&n.index())))
        .unwrap_or(0);

    PrefabSkeleton {
        name: skin.name().unwrap_or("Skeleton").to_string(),
        root_bone_index,
        bone_indices: joints.iter().map(|n| n.index()).collect(),
        inverse_bind_matrices,
    }
}

fn load_animation(anim: &::gltf::Animation, buffers: &[&[u8]]) -> AnimationClip {
    use ::gltf::animation::util::ReadOutputs;

    let mut tracks = Vec::new();

    for channel in anim.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).copied());
        let node_name = node_name(&channel.target().node());

        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            ::gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            ::gltf::animation::Interpolation::Step => InterpolationMode::Step,
            ::gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let (target, data) = match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) => (
                TargetPath::Translation,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            Some(ReadOutputs::Rotations(iter)) => (
                TargetPath::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            Some(ReadOutputs::Scales(iter)) => (
                TargetPath::Scale,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            // Morph target weights are not animated on characters.
            _ => continue,
        };

        tracks.push(Track::new(&node_name, target, data));
    }

    AnimationClip::new(normalize_clip_name(anim.name().unwrap_or("anim")), tracks)
}
