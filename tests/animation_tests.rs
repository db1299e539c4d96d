//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack interpolation and cursor sampling
//! - AnimationAction loop modes, fades and pause
//! - AnimationMixer binding, memoization and weighted blending
//! - AnimationClip duration and renaming

mod common;

use std::sync::Arc;

use glam::{Quat, Vec3};

use manny::animation::action::{AnimationAction, LoopMode};
use manny::animation::mixer::AnimationMixer;
use manny::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use manny::Scene;

use common::{EPSILON, approx, hips_clip, quat_approx, rig_prefab, spine_clip, spine_end_pose};

fn rig(scene: &mut Scene) -> manny::NodeHandle {
    scene.instantiate(&rig_prefab(true))
}

fn spine_rotation(scene: &Scene, root: manny::NodeHandle) -> Quat {
    let spine = scene.find_node_by_name(root, "Spine").unwrap();
    scene.get_node(spine).unwrap().transform.rotation
}

fn hips_position(scene: &Scene, root: manny::NodeHandle) -> Vec3 {
    let hips = scene.find_node_by_name(root, "Hips").unwrap();
    scene.get_node(hips).unwrap().transform.position
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).unwrap(), 5.0));
}

#[test]
fn track_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(9.0, &mut cursor).unwrap(), 20.0));
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![1.0_f32, 2.0, 3.0],
        InterpolationMode::Step,
    );
    assert!(approx(track.sample(1.99).unwrap(), 2.0));
}

#[test]
fn track_empty_samples_nothing() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    assert!(track.sample(0.5).is_none());
    assert!(track.sample_with_cursor(0.5, &mut KeyframeCursor::default()).is_none());
}

#[test]
fn cursor_agrees_with_binary_search_after_jumps() {
    let times: Vec<f32> = (0..50).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = times.iter().map(|t| t * 2.0).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    for &t in &[0.05, 0.15, 4.2, 0.3, 2.55, 2.45, 4.9] {
        let with_cursor = track.sample_with_cursor(t, &mut cursor).unwrap();
        let stateless = track.sample(t).unwrap();
        assert!(approx(with_cursor, stateless), "t={t}: {with_cursor} vs {stateless}");
    }
}

#[test]
fn quaternion_track_slerps() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_y(std::f32::consts::PI / 2.0)],
        InterpolationMode::Linear,
    );
    let mid = track.sample(0.5).unwrap();
    assert!(quat_approx(mid, Quat::from_rotation_y(std::f32::consts::PI / 4.0)));
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_last_key() {
    let clip = spine_clip("Armature|Wave", 1.5);
    assert!(approx(clip.duration, 1.5));
}

#[test]
fn clip_renamed_keeps_tracks() {
    let clip = spine_clip("Armature|Wave", 1.5).renamed("waving");
    assert_eq!(clip.name, "waving");
    assert_eq!(clip.tracks.len(), 1);
}

// ============================================================================
// AnimationAction: loop modes
// ============================================================================

fn playing(duration: f32) -> AnimationAction {
    let mut action = AnimationAction::new(Arc::new(spine_clip("test", duration)));
    action.play();
    action
}

#[test]
fn action_not_playing_until_play() {
    let mut action = AnimationAction::new(Arc::new(spine_clip("test", 1.0)));
    action.update(0.5);
    assert!(approx(action.time, 0.0));
    assert!(approx(action.effective_weight(), 0.0));
}

#[test]
fn action_loop_wraps() {
    let mut action = playing(1.0);
    action.update(0.75);
    action.update(0.5);
    assert!(approx(action.time, 0.25), "got {}", action.time);
    assert!(!action.is_finished());
}

#[test]
fn action_clamp_once_holds_end() {
    let mut action = playing(1.0);
    action.set_loop(LoopMode::ClampOnce);
    action.update(0.75);
    action.update(0.5);
    assert!(approx(action.time, 1.0));
    assert!(action.is_finished());
    assert!(action.is_running());

    action.update(1.0);
    assert!(approx(action.time, 1.0));
}

#[test]
fn action_switching_back_to_loop_resumes() {
    let mut action = playing(1.0);
    action.set_loop(LoopMode::ClampOnce);
    action.update(2.0);
    assert!(action.is_finished());

    action.set_loop(LoopMode::Loop);
    assert!(!action.is_finished());
    action.update(0.25);
    assert!(approx(action.time, 0.25), "got {}", action.time);
}

#[test]
fn action_reset_rewinds_and_clears_finish() {
    let mut action = playing(1.0);
    action.set_loop(LoopMode::ClampOnce).set_paused(true);
    action.time = 1.0;
    action.reset();
    assert!(approx(action.time, 0.0));
    assert!(!action.paused);
    assert!(!action.is_finished());
}

// ============================================================================
// AnimationAction: fades and pause
// ============================================================================

#[test]
fn fade_in_ramps_linearly() {
    let mut action = playing(1.0);
    action.fade_in(0.2);
    assert!(approx(action.effective_weight(), 0.0));

    action.update(0.05);
    assert!(approx(action.effective_weight(), 0.25));
    action.update(0.15);
    assert!(approx(action.effective_weight(), 1.0));
    assert!(!action.is_fading());
}

#[test]
fn fade_out_stops_action_at_zero() {
    let mut action = playing(1.0);
    action.fade_out(0.2);
    action.update(0.1);
    assert!(approx(action.effective_weight(), 0.5));
    assert!(action.is_running());

    action.update(0.1);
    assert!(!action.is_running());
    assert!(approx(action.effective_weight(), 0.0));
}

#[test]
fn fade_out_starts_from_current_weight() {
    let mut action = playing(1.0);
    action.fade_in(0.2);
    action.update(0.1);
    action.fade_out(0.2);
    assert!(approx(action.fade_weight(), 0.5));
    action.update(0.1);
    assert!(approx(action.fade_weight(), 0.25));
}

#[test]
fn pause_freezes_time_but_not_fade() {
    let mut action = playing(1.0);
    action.set_paused(true).fade_in(0.2);
    action.update(0.1);
    assert!(approx(action.time, 0.0));
    assert!(approx(action.fade_weight(), 0.5));

    action.set_paused(false);
    action.update(0.1);
    assert!(approx(action.time, 0.1));
}

// ============================================================================
// AnimationMixer
// ============================================================================

#[test]
fn mixer_memoizes_actions_per_clip() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let clip = Arc::new(spine_clip("wave", 1.0));
    let a = mixer.clip_action(Arc::clone(&clip), &scene);
    let b = mixer.clip_action(clip, &scene);
    assert_eq!(a, b);
    assert_eq!(mixer.actions().count(), 1);
    assert_eq!(mixer.action(a).unwrap().bindings.len(), 1);
}

#[test]
fn mixer_skips_tracks_for_missing_nodes() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let mut clip = spine_clip("wave", 1.0);
    clip.tracks.extend(spine_clip("tail", 1.0).tracks.into_iter().map(|mut t| {
        t.meta.node_name = "Tail".to_string();
        t
    }));
    let handle = mixer.clip_action(Arc::new(clip), &scene);
    assert_eq!(mixer.action(handle).unwrap().bindings.len(), 1);
}

#[test]
fn mixer_applies_single_action() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let handle = mixer.clip_action(Arc::new(spine_clip("wave", 1.0)), &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(1.0 - EPSILON / 10.0, &mut scene);

    assert!(quat_approx(spine_rotation(&scene, root), spine_end_pose()));
}

#[test]
fn mixer_blends_partial_weight_with_rest_pose() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let handle = mixer.clip_action(Arc::new(hips_clip("rise", 1.0)), &scene);
    let action = mixer.action_mut(handle).unwrap();
    action.weight = 0.5;
    action.set_paused(true).play();
    action.time = 1.0;
    mixer.update(0.0, &mut scene);

    // Halfway between rest (y = 1) and the clip's end pose (y = 2).
    assert!(approx(hips_position(&scene, root).y, 1.5));
}

#[test]
fn mixer_blends_two_actions_by_weight() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let low = mixer.clip_action(Arc::new(hips_clip("low", 1.0)), &scene);
    let high = mixer.clip_action(Arc::new(hips_clip("high", 1.0)), &scene);
    for (handle, time) in [(low, 0.0), (high, 1.0)] {
        let action = mixer.action_mut(handle).unwrap();
        action.set_paused(true).play();
        action.time = time;
        action.weight = 0.5;
    }
    mixer.update(0.0, &mut scene);

    assert!(approx(hips_position(&scene, root).y, 1.5));
}

#[test]
fn mixer_restores_rest_pose_when_undriven() {
    let mut scene = Scene::new();
    let root = rig(&mut scene);
    let mut mixer = AnimationMixer::new(root);

    let handle = mixer.clip_action(Arc::new(hips_clip("rise", 1.0)), &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(0.5, &mut scene);
    assert!(approx(hips_position(&scene, root).y, 1.5));

    mixer.action_mut(handle).unwrap().stop();
    mixer.update(0.1, &mut scene);
    assert!(approx(hips_position(&scene, root).y, 1.0));
}

#[test]
fn mixer_only_touches_its_own_root() {
    let mut scene = Scene::new();
    let a = rig(&mut scene);
    let b = rig(&mut scene);
    let mut mixer = AnimationMixer::new(a);

    let handle = mixer.clip_action(Arc::new(hips_clip("rise", 1.0)), &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(0.5, &mut scene);

    assert!(approx(hips_position(&scene, a).y, 1.5));
    assert!(approx(hips_position(&scene, b).y, 1.0));
}
