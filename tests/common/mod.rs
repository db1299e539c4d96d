//! Shared fixtures: a tiny rig, hand-built clips and a clip source the test
//! completes by hand.

#![allow(dead_code)]

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};
use parking_lot::Mutex;

use manny::animation::binding::TargetPath;
use manny::animation::clip::{AnimationClip, Track, TrackData};
use manny::animation::tracks::{InterpolationMode, KeyframeTrack};
use manny::assets::prefab::{Prefab, PrefabNode, PrefabSkeleton};
use manny::errors::MannyError;
use manny::{AssetServer, ClipRequest, ClipSource, ColorSpace, Mesh, MannyProps, Texture};

pub const EPSILON: f32 = 1e-4;

pub const MODEL: &str = "memory://manny.glb";
pub const TEXTURE: &str = "memory://manny_body_texture.png";
pub const OTHER_TEXTURE: &str = "memory://manny_zombie_texture.png";

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

// ============================================================================
// Rig
// ============================================================================

/// Armature
/// ├── Hips ── Spine ── Head
/// ├── Body (skinned)
/// └── Eyes (skinned)
pub fn rig_prefab(with_eyes: bool) -> Prefab {
    let mut prefab = Prefab::new("manny");

    let mut armature = PrefabNode::new("Armature");
    armature.children_indices = vec![1, 4];
    let mut hips = PrefabNode::new("Hips");
    hips.transform.position = Vec3::new(0.0, 1.0, 0.0);
    hips.children_indices = vec![2];
    let mut spine = PrefabNode::new("Spine");
    spine.transform.position = Vec3::new(0.0, 0.3, 0.0);
    spine.children_indices = vec![3];
    let mut head = PrefabNode::new("Head");
    head.transform.position = Vec3::new(0.0, 0.4, 0.0);

    let mut body = PrefabNode::new("Body");
    body.mesh = Some(Mesh::new("Body"));
    body.skin_index = Some(0);

    prefab.nodes = vec![armature, hips, spine, head, body];

    if with_eyes {
        let mut eyes = PrefabNode::new("Eyes");
        eyes.mesh = Some(Mesh::new("Eyes"));
        eyes.skin_index = Some(0);
        prefab.nodes.push(eyes);
        prefab.nodes[0].children_indices.push(5);
    }

    prefab.root_indices = vec![0];
    prefab.skeletons = vec![PrefabSkeleton {
        name: "Armature".to_string(),
        root_bone_index: 0,
        bone_indices: vec![1, 2, 3],
        inverse_bind_matrices: vec![Affine3A::IDENTITY; 3],
    }];
    prefab
}

pub fn seeded_assets() -> AssetServer {
    let assets = AssetServer::new();
    assets.insert_model(MODEL, rig_prefab(true));
    assets.insert_texture(TEXTURE, Texture::solid("body", [200, 160, 130, 255], ColorSpace::Srgb));
    assets.insert_texture(
        OTHER_TEXTURE,
        Texture::solid("zombie", [90, 140, 90, 255], ColorSpace::Srgb),
    );
    assets
}

pub fn props() -> MannyProps {
    MannyProps::default().with_model(MODEL).with_texture(TEXTURE)
}

// ============================================================================
// Clips
// ============================================================================

/// Turns `Spine` from identity to a quarter turn about Z over `duration`.
pub fn spine_clip(name: &str, duration: f32) -> AnimationClip {
    let track = KeyframeTrack::new(
        vec![0.0, duration],
        vec![Quat::IDENTITY, spine_end_pose()],
        InterpolationMode::Linear,
    );
    AnimationClip::new(
        name.to_string(),
        vec![Track::new("Spine", TargetPath::Rotation, TrackData::Quaternion(track))],
    )
}

pub fn spine_end_pose() -> Quat {
    Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)
}

/// Moves `Hips` from the rest height up to y = 2 over `duration`.
pub fn hips_clip(name: &str, duration: f32) -> AnimationClip {
    let track = KeyframeTrack::new(
        vec![0.0, duration],
        vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
        InterpolationMode::Linear,
    );
    AnimationClip::new(
        name.to_string(),
        vec![Track::new("Hips", TargetPath::Translation, TrackData::Vector3(track))],
    )
}

// ============================================================================
// Clip source
// ============================================================================

/// Records every request; the test decides when and how each completes.
#[derive(Default)]
pub struct ManualClipSource {
    pending: Mutex<Vec<ClipRequest>>,
    history: Mutex<Vec<String>>,
}

impl ManualClipSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every name ever requested, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn pending(&self) -> Vec<String> {
        self.pending.lock().iter().map(|r| r.name.clone()).collect()
    }

    pub fn url_of(&self, name: &str) -> Option<String> {
        self.pending
            .lock()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.url.clone())
    }

    pub fn take(&self, name: &str) -> ClipRequest {
        let mut pending = self.pending.lock();
        let index = pending
            .iter()
            .position(|r| r.name == name)
            .unwrap_or_else(|| panic!("no pending request for '{name}'"));
        pending.remove(index)
    }

    /// Answers the pending request for `name`; false if its requester is gone.
    pub fn complete(&self, name: &str, clip: AnimationClip) -> bool {
        self.take(name).complete(Ok(clip))
    }

    pub fn fail(&self, name: &str) -> bool {
        let request = self.take(name);
        let url = request.url.clone();
        request.complete(Err(MannyError::AssetNotFound(url)))
    }

    /// Names of pending requests whose requester has gone away.
    pub fn abandoned(&self) -> Vec<String> {
        self.pending
            .lock()
            .iter()
            .filter(|r| r.is_abandoned())
            .map(|r| r.name.clone())
            .collect()
    }
}

impl ClipSource for ManualClipSource {
    fn fetch_clip(&self, request: ClipRequest) {
        self.history.lock().push(request.name.clone());
        self.pending.lock().push(request);
    }
}
