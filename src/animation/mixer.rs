use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::animation::ActionHandle;
use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

type PropertyKey = (NodeHandle, TargetPath);

/// Drives the nodes under one root from any number of weighted actions.
///
/// Actions are created per clip name and memoized, so asking twice for the
/// same clip yields the same [`ActionHandle`]. Each frame the mixer advances
/// every action and writes the weight-blended pose into the scene. Properties
/// whose total weight is below 1 are blended towards the rest pose captured
/// when the first action bound them, and properties no action drives any more
/// snap back to that rest pose.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: SlotMap<ActionHandle, AnimationAction>,
    by_clip: FxHashMap<String, ActionHandle>,
    rest_pose: FxHashMap<PropertyKey, TrackValue>,
    driven: FxHashSet<PropertyKey>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: SlotMap::with_key(),
            by_clip: FxHashMap::default(),
            rest_pose: FxHashMap::default(),
            driven: FxHashSet::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>, scene: &Scene) -> ActionHandle {
        if let Some(&handle) = self.by_clip.get(&clip.name) {
            return handle;
        }

        let bindings = Binder::bind(scene, self.root, &clip);
        for binding in &bindings {
            let key = (binding.node_handle, binding.target);
            if self.rest_pose.contains_key(&key) {
                continue;
            }
            if let Some(node) = scene.get_node(binding.node_handle) {
                let t = &node.transform;
                let value = match binding.target {
                    TargetPath::Translation => TrackValue::Vector3(t.position),
                    TargetPath::Rotation => TrackValue::Quaternion(t.rotation),
                    TargetPath::Scale => TrackValue::Vector3(t.scale),
                };
                self.rest_pose.insert(key, value);
            }
        }

        let name = clip.name.clone();
        let mut action = AnimationAction::new(clip);
        action.bindings = bindings;
        let handle = self.actions.insert(action);
        self.by_clip.insert(name, handle);
        handle
    }

    #[must_use]
    pub fn existing_action(&self, clip_name: &str) -> Option<ActionHandle> {
        self.by_clip.get(clip_name).copied()
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    /// Advances all actions by `dt` seconds and writes the blended pose.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in self.actions.values_mut() {
            action.update(dt);
        }

        let mut blended: FxHashMap<PropertyKey, (TrackValue, f32)> = FxHashMap::default();

        for action in self.actions.values_mut() {
            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let key = (binding.node_handle, binding.target);
                match blended.get_mut(&key) {
                    Some((acc, acc_weight)) => {
                        let total = *acc_weight + weight;
                        if let Some(mixed) = mix(*acc, value, weight / total) {
                            *acc = mixed;
                            *acc_weight = total;
                        }
                    }
                    None => {
                        blended.insert(key, (value, weight));
                    }
                }
            }
        }

        for (&key, &(value, weight)) in &blended {
            let value = match self.rest_pose.get(&key) {
                Some(&rest) if weight < 1.0 => mix(rest, value, weight).unwrap_or(value),
                _ => value,
            };
            write_property(scene, key, value);
        }

        for key in &self.driven {
            if !blended.contains_key(key)
                && let Some(&rest) = self.rest_pose.get(key)
            {
                write_property(scene, *key, rest);
            }
        }
        self.driven = blended.into_keys().collect();
    }
}

fn mix(a: TrackValue, b: TrackValue, t: f32) -> Option<TrackValue> {
    match (a, b) {
        (TrackValue::Vector3(a), TrackValue::Vector3(b)) => Some(TrackValue::Vector3(a.lerp(b, t))),
        (TrackValue::Quaternion(a), TrackValue::Quaternion(b)) => {
            Some(TrackValue::Quaternion(a.slerp(b, t)))
        }
        _ => None,
    }
}

fn write_property(scene: &mut Scene, (node, target): PropertyKey, value: TrackValue) {
    let Some(node) = scene.get_node_mut(node) else {
        return;
    };
    let transform = &mut node.transform;
    match (target, value) {
        (TargetPath::Translation, TrackValue::Vector3(v)) => transform.position = v,
        (TargetPath::Scale, TrackValue::Vector3(v)) => transform.scale = v,
        (TargetPath::Rotation, TrackValue::Quaternion(q)) => transform.rotation = q.normalize(),
        _ => return,
    }
    transform.mark_dirty();
}
