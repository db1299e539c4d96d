use std::sync::Arc;

use flume::{Receiver, Sender};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::ActionHandle;
use crate::animation::clip::AnimationClip;
use crate::animation::library::AnimationLibrary;
use crate::animation::mixer::AnimationMixer;
use crate::assets::clips::{ClipLoaded, ClipRequest, ClipSource};
use crate::scene::{NodeHandle, Scene};

/// Load state of one library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotRequested,
    Loading,
    Loaded,
}

/// Owns the clip cache, the mixer and the name → action map of one character.
///
/// Eager clips are requested on the first [`request`](Self::request); lazy
/// clips only once they are named active. Fetches complete in any order and
/// each completion only touches its own entry. A failed fetch is logged and
/// the entry stays `Loading`, so it is never re-requested.
pub struct AnimationController {
    library: AnimationLibrary,
    states: FxHashMap<String, LoadState>,
    cache: FxHashMap<String, Arc<AnimationClip>>,
    mixer: AnimationMixer,
    actions: FxHashMap<String, ActionHandle>,

    source: Arc<dyn ClipSource>,
    tx: Sender<ClipLoaded>,
    rx: Receiver<ClipLoaded>,

    warned_unknown: FxHashSet<String>,
}

impl AnimationController {
    /// Creates a controller for the rig under `root`. `overrides` are merged
    /// over `base`, winning per name.
    pub fn new(
        root: NodeHandle,
        base: &AnimationLibrary,
        overrides: Option<&AnimationLibrary>,
        source: Arc<dyn ClipSource>,
    ) -> Self {
        let library = base.merged(overrides);
        let states = library
            .names()
            .map(|name| (name.to_string(), LoadState::NotRequested))
            .collect();
        let (tx, rx) = flume::unbounded();

        Self {
            library,
            states,
            cache: FxHashMap::default(),
            mixer: AnimationMixer::new(root),
            actions: FxHashMap::default(),
            source,
            tx,
            rx,
            warned_unknown: FxHashSet::default(),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Issues fetches for every entry that should be loading now: all eager
    /// entries, plus `active` if it is lazy. Entries already loading or
    /// loaded are skipped, so calling this repeatedly is harmless.
    pub fn request(&mut self, active: Option<&str>) {
        if let Some(name) = active
            && !self.library.contains(name)
            && self.warned_unknown.insert(name.to_string())
        {
            log::warn!("Animation '{name}' is not in the library; nothing will play");
        }

        for (name, descriptor) in self.library.iter() {
            if self.states.get(name) != Some(&LoadState::NotRequested) {
                continue;
            }
            if !descriptor.load_eagerly() && active != Some(name) {
                continue;
            }

            log::debug!("Fetching clip '{name}' from {}", descriptor.url);
            self.states.insert(name.to_string(), LoadState::Loading);
            self.source
                .fetch_clip(ClipRequest::new(name, &descriptor.url, self.tx.clone()));
        }
    }

    /// Applies every completion that arrived since the last call. Returns
    /// true if at least one clip became available.
    pub fn poll(&mut self, scene: &Scene) -> bool {
        let mut loaded_any = false;
        while let Ok(ClipLoaded { name, result }) = self.rx.try_recv() {
            match result {
                Ok(clip) => loaded_any |= self.insert_clip(&name, clip, scene),
                Err(err) => log::error!("Failed to load animation '{name}': {err}"),
            }
        }
        loaded_any
    }

    fn insert_clip(&mut self, name: &str, clip: AnimationClip, scene: &Scene) -> bool {
        match self.states.get(name) {
            Some(LoadState::Loaded) => {
                log::debug!("Clip '{name}' already loaded; dropping duplicate");
                return false;
            }
            Some(_) => {}
            None => {
                log::debug!("Clip '{name}' is not in the library; dropping");
                return false;
            }
        }

        let clip = Arc::new(clip.renamed(name));
        log::debug!(
            "Loaded animation '{name}' ({:.2}s, {} tracks)",
            clip.duration,
            clip.tracks.len()
        );
        let action = self.mixer.clip_action(Arc::clone(&clip), scene);
        self.cache.insert(name.to_string(), clip);
        self.actions.insert(name.to_string(), action);
        self.states.insert(name.to_string(), LoadState::Loaded);
        true
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Drains completions, then advances the mixer.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.poll(scene);
        self.mixer.update(dt, scene);
    }

    /// Rebuilds the mixer and every action against a new rig root, reusing
    /// the cached clips.
    pub fn rebind(&mut self, scene: &Scene, root: NodeHandle) {
        self.mixer = AnimationMixer::new(root);
        self.actions.clear();
        for (name, clip) in &self.cache {
            let action = self.mixer.clip_action(Arc::clone(clip), scene);
            self.actions.insert(name.clone(), action);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<LoadState> {
        self.states.get(name).copied()
    }

    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.cache.get(name)
    }

    /// Action for `name`, present only once its clip has loaded.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<ActionHandle> {
        self.actions.get(name).copied()
    }

    #[must_use]
    pub fn actions(&self) -> &FxHashMap<String, ActionHandle> {
        &self.actions
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut AnimationMixer {
        &mut self.mixer
    }
}
