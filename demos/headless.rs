//! Headless Manny demo.
//!
//! Spawns two characters that share one model, plays `idle` on one and a
//! lazily fetched clip on the other, then crossfades. Clips are synthesized on
//! worker threads with random latency, so completions arrive out of order.
//!
//! Run with: `RUST_LOG=debug cargo run --example headless [props.json]`

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;
use std::time::Duration;

use glam::{Affine3A, Quat, Vec3};

use manny::animation::binding::TargetPath;
use manny::animation::clip::{AnimationClip, Track, TrackData};
use manny::animation::tracks::{InterpolationMode, KeyframeTrack};
use manny::assets::prefab::{Prefab, PrefabNode, PrefabSkeleton};
use manny::{
    AssetServer, ClipRequest, ClipSource, ColorSpace, Manny, MannyProps, Mesh, Scene, Texture,
    Timer,
};

const MODEL: &str = "demo://manny.glb";
const TEXTURE: &str = "demo://manny_body_texture.png";

/// Builds every requested clip in the background: a sway of the spine whose
/// period depends on the clip name.
struct SynthClips;

impl ClipSource for SynthClips {
    fn fetch_clip(&self, request: ClipRequest) {
        std::thread::spawn(move || {
            let seed = request.name.bytes().map(u64::from).sum::<u64>();
            std::thread::sleep(Duration::from_millis(20 + seed % 80));

            let period = 0.5 + (seed % 10) as f32 * 0.1;
            let track = KeyframeTrack::new(
                vec![0.0, period / 2.0, period],
                vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_z(FRAC_PI_4),
                    Quat::IDENTITY,
                ],
                InterpolationMode::Linear,
            );
            let clip = AnimationClip::new(
                request.name.clone(),
                vec![Track::new("Spine", TargetPath::Rotation, TrackData::Quaternion(track))],
            );
            request.complete(Ok(clip));
        });
    }
}

fn demo_rig() -> Prefab {
    let mut prefab = Prefab::new("manny");
    let mut armature = PrefabNode::new("Armature");
    armature.children_indices = vec![1, 3, 4];
    let mut hips = PrefabNode::new("Hips");
    hips.transform.position = Vec3::Y;
    hips.children_indices = vec![2];
    let spine = PrefabNode::new("Spine");
    let mut body = PrefabNode::new("Body");
    body.mesh = Some(Mesh::new("Body"));
    body.skin_index = Some(0);
    let mut eyes = PrefabNode::new("Eyes");
    eyes.mesh = Some(Mesh::new("Eyes"));
    eyes.skin_index = Some(0);

    prefab.nodes = vec![armature, hips, spine, body, eyes];
    prefab.root_indices = vec![0];
    prefab.skeletons = vec![PrefabSkeleton {
        name: "Armature".to_string(),
        root_bone_index: 0,
        bone_indices: vec![1, 2],
        inverse_bind_matrices: vec![Affine3A::IDENTITY; 2],
    }];
    prefab
}

fn spine_angle(scene: &Scene, manny: &Manny) -> f32 {
    scene
        .find_node_by_name(manny.root(), "Spine")
        .and_then(|h| scene.get_node(h))
        .map_or(0.0, |n| n.transform.rotation.to_euler(glam::EulerRot::XYZ).2)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let base = match std::env::args().nth(1) {
        Some(path) => MannyProps::from_json_file(path)?,
        None => MannyProps::default(),
    };

    let assets = AssetServer::new();
    assets.insert_model(MODEL, demo_rig());
    assets.insert_texture(TEXTURE, Texture::solid("skin", [224, 172, 140, 255], ColorSpace::Srgb));

    let mut scene = Scene::new();
    let source: Arc<dyn ClipSource> = Arc::new(SynthClips);
    let props = base.with_model(MODEL).with_texture(TEXTURE);

    let mut left = Manny::spawn_with_source(
        &mut scene,
        &assets,
        props.clone().with_animation("idle"),
        Arc::clone(&source),
    )?;
    let mut right =
        Manny::spawn_with_source(&mut scene, &assets, props.with_animation("jump"), source)?;

    let mut timer = Timer::new();
    let step = Duration::from_millis(16);
    for frame in 0..240 {
        if frame == 120 {
            log::info!("Switching left character to 'waving'");
            left.set_animation(&scene, Some("waving"));
            right.set_clamp(true);
        }

        let dt = timer.tick_fixed(step);
        left.update(&mut scene, dt);
        right.update(&mut scene, dt);
        scene.update();

        if frame % 30 == 0 {
            log::info!(
                "t={:.2}s left spine {:+.3} rad, right spine {:+.3} rad, left actions {}",
                timer.elapsed.as_secs_f32(),
                spine_angle(&scene, &left),
                spine_angle(&scene, &right),
                left.actions().len(),
            );
        }
        std::thread::sleep(step);
    }

    left.despawn(&mut scene);
    right.despawn(&mut scene);
    log::info!("Done; {} nodes left in scene", scene.nodes.len());
    Ok(())
}
