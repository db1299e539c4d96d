//! Asset Layer
//!
//! Loads and caches everything a character is built from:
//! - models (decoded into [`Prefab`]s) and textures, cached by URI
//! - hidden per-scene model templates, reference counted across characters
//! - animation clips, fetched in the background and delivered through
//!   [`ClipRequest`] completions
//!
//! Shared assets are immutable once stored (`Arc`), so any number of
//! character instances can read them concurrently.

pub mod clips;
pub mod io;
pub mod loaders;
pub mod prefab;
pub mod server;
pub mod storage;
pub mod templates;

pub use clips::{ClipLoaded, ClipRequest, ClipSource};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader};
pub use loaders::{DecoderRegistry, SceneDecoder, normalize_clip_name};
pub use prefab::{Prefab, PrefabNode, PrefabSkeleton, SharedPrefab};
pub use server::{AssetServer, MaterialHandle, ModelHandle, TextureHandle};
pub use storage::AssetStorage;
pub use templates::TemplateCache;
