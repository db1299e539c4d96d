//! The Manny character: materialized instance + animation controller +
//! active-clip lifecycle.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::animation::{
    ActionHandle, AnimationAction, AnimationController, AnimationLibrary, AnimationMixer,
    DEFAULT_MODEL_PATH, DEFAULT_TEXTURE_URL, LoopMode, default_library,
};
use crate::assets::{AssetServer, ClipSource};
use crate::character::Materializer;
use crate::errors::Result;
use crate::scene::{NodeHandle, Scene};

/// Seconds a crossfade between two active animations takes.
pub const FADE_DURATION: f32 = 0.2;

/// Everything a caller can configure on a character.
///
/// Deserializes from `{ "modelPath", "textureUrl", "animation", "clamp",
/// "paused", "library" }`, every key optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MannyProps {
    pub model_path: String,
    pub texture_url: String,
    /// Active animation; `None` plays nothing.
    pub animation: Option<String>,
    /// Play the active animation once and hold the last pose.
    pub clamp: bool,
    pub paused: bool,
    /// Entries merged over the default library.
    pub library: Option<AnimationLibrary>,
}

impl Default for MannyProps {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            texture_url: DEFAULT_TEXTURE_URL.to_string(),
            animation: None,
            clamp: false,
            paused: false,
            library: None,
        }
    }
}

impl MannyProps {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn with_animation(mut self, name: &str) -> Self {
        self.animation = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model_path: &str) -> Self {
        self.model_path = model_path.to_string();
        self
    }

    #[must_use]
    pub fn with_texture(mut self, texture_url: &str) -> Self {
        self.texture_url = texture_url.to_string();
        self
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    #[must_use]
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    #[must_use]
    pub fn with_library(mut self, library: AnimationLibrary) -> Self {
        self.library = Some(library);
        self
    }
}

/// One animated character in a scene.
///
/// Owns its cloned rig, its clip cache and its mixer. The active animation
/// fades in over [`FADE_DURATION`] once its clip is loaded; switching to
/// another name fades the previous one out over the same window.
pub struct Manny {
    root: NodeHandle,
    model_path: String,
    texture_url: String,
    animation: Option<String>,
    clamp: bool,
    paused: bool,

    current: Option<ActionHandle>,
    controller: AnimationController,
    materializer: Materializer,
}

impl Manny {
    /// Spawns a character whose clips are fetched through `assets`.
    pub fn spawn(scene: &mut Scene, assets: &AssetServer, props: MannyProps) -> Result<Self> {
        let source: Arc<dyn ClipSource> = Arc::new(assets.clone());
        Self::spawn_with_source(scene, assets, props, source)
    }

    /// Spawns a character whose clips are fetched through `source`.
    pub fn spawn_with_source(
        scene: &mut Scene,
        assets: &AssetServer,
        props: MannyProps,
        source: Arc<dyn ClipSource>,
    ) -> Result<Self> {
        let materializer = Materializer::new(assets);
        let root = materializer.materialize(scene, &props.model_path, &props.texture_url)?;
        let controller =
            AnimationController::new(root, default_library(), props.library.as_ref(), source);

        let mut manny = Self {
            root,
            model_path: props.model_path,
            texture_url: props.texture_url,
            animation: props.animation,
            clamp: props.clamp,
            paused: props.paused,
            current: None,
            controller,
            materializer,
        };
        manny.refresh(scene);
        log::info!("Spawned {}", manny.name(scene));
        Ok(manny)
    }

    // ========================================================================
    // Props
    // ========================================================================

    /// Changes the active animation. A lazy clip is fetched now and starts
    /// once it arrives.
    pub fn set_animation(&mut self, scene: &Scene, animation: Option<&str>) {
        if self.animation.as_deref() == animation {
            return;
        }
        self.animation = animation.map(str::to_string);
        self.refresh(scene);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.apply_playback_flags();
    }

    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
        self.apply_playback_flags();
    }

    /// Re-skins the character with another texture. Same URL is a no-op;
    /// otherwise a fresh instance replaces the old one, keeping every loaded
    /// clip and restarting the active animation on it.
    pub fn set_texture(&mut self, scene: &mut Scene, texture_url: &str) -> Result<()> {
        if self.texture_url == texture_url {
            return Ok(());
        }

        let root = self.materializer.materialize(scene, &self.model_path, texture_url)?;
        self.controller.rebind(scene, root);
        self.materializer.release(scene, &self.model_path, self.root);

        self.root = root;
        self.texture_url = texture_url.to_string();
        self.current = None;
        self.sync_active();
        Ok(())
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Applies clips that finished loading, then advances and blends
    /// animation by `dt` seconds.
    pub fn update(&mut self, scene: &mut Scene, dt: f32) {
        if self.controller.poll(scene) {
            self.sync_active();
        }
        self.controller.mixer_mut().update(dt, scene);
    }

    /// Removes the character from `scene`, together with its skin material
    /// and, if it was the last user, the model template. Clips still in
    /// flight are discarded when they complete.
    pub fn despawn(mut self, scene: &mut Scene) {
        if let Some(current) = self.current.take()
            && let Some(action) = self.controller.mixer_mut().action_mut(current)
        {
            action.fade_out(FADE_DURATION);
        }
        log::info!("Despawning {}", self.name(scene));
        self.materializer.release(scene, &self.model_path, self.root);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[must_use]
    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    #[must_use]
    pub fn texture_url(&self) -> &str {
        &self.texture_url
    }

    /// Actions of every loaded clip, by library name.
    #[must_use]
    pub fn actions(&self) -> &FxHashMap<String, ActionHandle> {
        self.controller.actions()
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        let handle = self.controller.action(name)?;
        self.controller.mixer().action(handle)
    }

    /// The action currently faded in (or fading in).
    #[must_use]
    pub fn active_action(&self) -> Option<&AnimationAction> {
        self.controller.mixer().action(self.current?)
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        self.controller.mixer()
    }

    #[must_use]
    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    fn name<'a>(&self, scene: &'a Scene) -> &'a str {
        scene.get_name(self.root).unwrap_or("manny")
    }

    // ========================================================================
    // Active-clip lifecycle
    // ========================================================================

    fn refresh(&mut self, scene: &Scene) {
        self.controller.request(self.animation.as_deref());
        self.controller.poll(scene);
        self.sync_active();
    }

    /// Crossfades from the current action to the one for the active name, if
    /// they differ. A name whose clip is not loaded yet resolves to nothing.
    fn sync_active(&mut self) {
        let desired = self
            .animation
            .as_deref()
            .and_then(|name| self.controller.action(name));
        if desired == self.current {
            return;
        }

        let mixer = self.controller.mixer_mut();
        if let Some(previous) = self.current
            && let Some(action) = mixer.action_mut(previous)
        {
            action.fade_out(FADE_DURATION);
        }
        if let Some(next) = desired
            && let Some(action) = mixer.action_mut(next)
        {
            action.reset().fade_in(FADE_DURATION).play();
        }

        self.current = desired;
        self.apply_playback_flags();
    }

    fn apply_playback_flags(&mut self) {
        let loop_mode = if self.clamp {
            LoopMode::ClampOnce
        } else {
            LoopMode::Loop
        };
        let paused = self.paused;
        if let Some(current) = self.current
            && let Some(action) = self.controller.mixer_mut().action_mut(current)
        {
            action.set_paused(paused).set_loop(loop_mode);
        }
    }
}
