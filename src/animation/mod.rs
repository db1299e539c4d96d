//! Animation System
//!
//! Keyframe clips, per-character playback and the clip cache:
//! - [`AnimationClip`]: named keyframe tracks targeting nodes by name
//! - [`AnimationAction`]: playback state of one clip (time, loop, fades)
//! - [`AnimationMixer`]: blends every action of one rig into the scene
//! - [`AnimationController`]: lazy/eager clip loading on top of a mixer
//! - [`AnimationLibrary`]: which clips exist and where they live

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod controller;
pub mod library;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use controller::{AnimationController, LoadState};
pub use library::{
    AnimationDescriptor, AnimationLibrary, CLIPS_HOST, DEFAULT_MODEL_PATH, DEFAULT_TEXTURE_URL,
    default_animation_names, default_library,
};
pub use mixer::AnimationMixer;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;

use slotmap::new_key_type;

new_key_type! {
    pub struct ActionHandle;
}
