//! Model/clip decoders, dispatched by file extension.
//!
//! glTF (`.gltf`, `.glb`) ships built in behind the `gltf` feature. Other
//! formats, FBX included, are plugged in with
//! [`DecoderRegistry::register`]; until then they fail with
//! [`MannyError::UnsupportedFormat`].

#[cfg(feature = "gltf")]
pub mod gltf;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::assets::io::extension_of;
use crate::assets::prefab::Prefab;
use crate::errors::{MannyError, Result};

/// Turns the raw bytes of a model file into a [`Prefab`].
pub trait SceneDecoder: Send + Sync {
    fn decode(&self, uri: &str, bytes: &[u8]) -> Result<Prefab>;
}

#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: FxHashMap<String, Arc<dyn SceneDecoder>>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::empty();
        #[cfg(feature = "gltf")]
        {
            let decoder: Arc<dyn SceneDecoder> = Arc::new(gltf::GltfDecoder);
            registry.register_arc("gltf", Arc::clone(&decoder));
            registry.register_arc("glb", decoder);
        }
        registry
    }
}

impl DecoderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry without the built-in decoders.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: FxHashMap::default(),
        }
    }

    /// Registers `decoder` for `extension` (case-insensitive, without the dot),
    /// replacing any previous one.
    pub fn register(&mut self, extension: &str, decoder: impl SceneDecoder + 'static) {
        self.register_arc(extension, Arc::new(decoder));
    }

    pub fn register_arc(&mut self, extension: &str, decoder: Arc<dyn SceneDecoder>) {
        self.decoders
            .insert(extension.trim_start_matches('.').to_ascii_lowercase(), decoder);
    }

    #[must_use]
    pub fn supports(&self, extension: &str) -> bool {
        self.decoders.contains_key(&extension.to_ascii_lowercase())
    }

    pub fn decoder_for(&self, uri: &str) -> Result<Arc<dyn SceneDecoder>> {
        let extension = extension_of(uri).unwrap_or_default();
        self.decoders
            .get(&extension)
            .cloned()
            .ok_or_else(|| MannyError::UnsupportedFormat {
                extension,
                uri: uri.to_string(),
            })
    }

    pub fn decode(&self, uri: &str, bytes: &[u8]) -> Result<Prefab> {
        self.decoder_for(uri)?.decode(uri, bytes)
    }
}

/// Clip names exported by DCC tools look like `Armature|Idle`; keep the part
/// after the last `|`, lower-cased.
#[must_use]
pub fn normalize_clip_name(raw: &str) -> String {
    raw.rsplit('|')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_lowercase()
}
