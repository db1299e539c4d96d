//! A rigged, skinned character ("Manny") with a lazily loaded animation
//! library.
//!
//! ```rust,ignore
//! use manny::{AssetServer, Manny, MannyProps, Scene, Timer};
//!
//! let assets = AssetServer::new();
//! let mut scene = Scene::new();
//! let mut manny = Manny::spawn(&mut scene, &assets, MannyProps::default().with_animation("idle"))?;
//!
//! let mut timer = Timer::new();
//! loop {
//!     manny.update(&mut scene, timer.tick());
//!     scene.update();
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod character;
pub mod errors;
pub mod manny;
pub mod resources;
pub mod scene;
pub mod utils;

pub use animation::{
    ActionHandle, AnimationAction, AnimationClip, AnimationController, AnimationDescriptor,
    AnimationLibrary, AnimationMixer, LoadState, LoopMode, default_animation_names,
    default_library,
};
pub use assets::{AssetServer, ClipLoaded, ClipRequest, ClipSource};
pub use character::Materializer;
pub use errors::{MannyError, Result};
pub use manny::{FADE_DURATION, Manny, MannyProps};
pub use resources::{ColorSpace, Mesh, PhongMaterial, Texture};
pub use scene::{Node, NodeHandle, Scene, clone_skinned};
pub use utils::Timer;
