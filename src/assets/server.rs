use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use slotmap::new_key_type;
use tokio::runtime::Runtime;

use crate::animation::clip::AnimationClip;
use crate::assets::clips::{ClipRequest, ClipSource};
use crate::assets::io::AssetReaderVariant;
use crate::assets::loaders::{DecoderRegistry, SceneDecoder};
use crate::assets::prefab::Prefab;
use crate::assets::storage::AssetStorage;
use crate::assets::templates::TemplateCache;
use crate::errors::{MannyError, Result};
use crate::resources::material::PhongMaterial;
use crate::resources::texture::{ColorSpace, Texture};
use crate::scene::{NodeHandle, Scene};

fn asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

// Strongly-typed handles
new_key_type! {
    pub struct ModelHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

/// Shared asset cache.
///
/// Cheap to clone; clones share storage. Models and textures loaded from a
/// URI are cached under that URI, so every character built from the same
/// model reuses one decoded [`Prefab`].
#[derive(Clone)]
pub struct AssetServer {
    pub models: Arc<AssetStorage<ModelHandle, Prefab>>,
    pub materials: Arc<AssetStorage<MaterialHandle, PhongMaterial>>,
    pub textures: Arc<AssetStorage<TextureHandle, Texture>>,
    pub templates: Arc<TemplateCache>,

    decoders: Arc<RwLock<DecoderRegistry>>,
}

impl Default for AssetServer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: Arc::new(AssetStorage::new()),
            materials: Arc::new(AssetStorage::new()),
            textures: Arc::new(AssetStorage::new()),
            templates: Arc::new(TemplateCache::new()),
            decoders: Arc::new(RwLock::new(DecoderRegistry::default())),
        }
    }

    /// Adds or replaces the decoder for a file extension, e.g. an FBX
    /// importer for the default CDN assets.
    pub fn register_decoder(&self, extension: &str, decoder: impl SceneDecoder + 'static) {
        self.decoders.write().register(extension, decoder);
    }

    // ========================================================================
    // Pre-decoded assets
    // ========================================================================

    /// Registers an already decoded model under `uri`. Later loads of `uri`
    /// hit this entry instead of fetching.
    pub fn insert_model(&self, uri: &str, prefab: Prefab) -> ModelHandle {
        self.models.add_with_uri(uri, prefab)
    }

    pub fn insert_texture(&self, uri: &str, texture: Texture) -> TextureHandle {
        self.textures.add_with_uri(uri, texture)
    }

    pub fn add_material(&self, material: PhongMaterial) -> MaterialHandle {
        self.materials.add(material)
    }

    pub fn remove_material(&self, handle: MaterialHandle) -> Option<Arc<PhongMaterial>> {
        self.materials.remove(handle)
    }

    #[must_use]
    pub fn get_model(&self, handle: ModelHandle) -> Option<Arc<Prefab>> {
        self.models.get(handle)
    }

    #[must_use]
    pub fn get_texture(&self, handle: TextureHandle) -> Option<Arc<Texture>> {
        self.textures.get(handle)
    }

    #[must_use]
    pub fn get_material(&self, handle: MaterialHandle) -> Option<Arc<PhongMaterial>> {
        self.materials.get(handle)
    }

    // ========================================================================
    // Synchronous loading
    // ========================================================================

    /// Loads and decodes a model, blocking until done. Cached by URI.
    pub fn load_model(&self, uri: &str) -> Result<ModelHandle> {
        if let Some(handle) = self.models.get_handle_by_uri(uri) {
            log::debug!("Model cache hit: {uri}");
            return Ok(handle);
        }
        asset_runtime().block_on(self.load_model_async(uri))
    }

    /// Loads and decodes a texture, blocking until done. Cached by URI.
    pub fn load_texture(&self, uri: &str, color_space: ColorSpace) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.get_handle_by_uri(uri) {
            log::debug!("Texture cache hit: {uri}");
            return Ok(handle);
        }
        asset_runtime().block_on(self.load_texture_async(uri, color_space))
    }

    // ========================================================================
    // Scene templates
    // ========================================================================

    /// Hidden instance of `model_path` in `scene`, shared by every caller
    /// until the matching [`release_template`](Self::release_template).
    pub fn acquire_template(&self, scene: &mut Scene, model_path: &str) -> Result<NodeHandle> {
        let model = self.load_model(model_path)?;
        let prefab = self
            .get_model(model)
            .ok_or_else(|| MannyError::AssetNotFound(model_path.to_string()))?;
        Ok(self.templates.acquire(scene, model, &prefab))
    }

    pub fn release_template(&self, scene: &mut Scene, model_path: &str) {
        if let Some(model) = self.models.get_handle_by_uri(model_path) {
            self.templates.release(scene, model);
        }
    }

    // ========================================================================
    // Async loading
    // ========================================================================

    pub async fn load_model_async(&self, uri: &str) -> Result<ModelHandle> {
        if let Some(handle) = self.models.get_handle_by_uri(uri) {
            return Ok(handle);
        }

        let bytes = AssetReaderVariant::for_uri(uri)?.read_bytes(uri).await?;
        let prefab = self.decode_async(uri, bytes).await?;
        log::info!("Loaded model {uri}");
        Ok(self.models.add_with_uri(uri, prefab))
    }

    pub async fn load_texture_async(
        &self,
        uri: &str,
        color_space: ColorSpace,
    ) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.get_handle_by_uri(uri) {
            return Ok(handle);
        }

        let bytes = AssetReaderVariant::for_uri(uri)?.read_bytes(uri).await?;
        let label = uri.to_string();
        let texture =
            tokio::task::spawn_blocking(move || Texture::decode(&label, &bytes, color_space))
                .await??;
        log::info!("Loaded texture {uri} ({}x{})", texture.width, texture.height);
        Ok(self.textures.add_with_uri(uri, texture))
    }

    /// Fetches a clip file and returns its first animation.
    pub async fn load_clip_async(&self, uri: &str) -> Result<AnimationClip> {
        let bytes = AssetReaderVariant::for_uri(uri)?.read_bytes(uri).await?;
        let prefab = self.decode_async(uri, bytes).await?;
        prefab
            .animations
            .into_iter()
            .next()
            .ok_or_else(|| MannyError::MissingClip(uri.to_string()))
    }

    // Decoding is CPU bound; keep it off the async workers.
    async fn decode_async(&self, uri: &str, bytes: Vec<u8>) -> Result<Prefab> {
        let decoder = self.decoders.read().decoder_for(uri)?;
        let uri = uri.to_string();
        tokio::task::spawn_blocking(move || decoder.decode(&uri, &bytes)).await?
    }
}

impl ClipSource for AssetServer {
    fn fetch_clip(&self, request: ClipRequest) {
        let server = self.clone();
        asset_runtime().spawn(async move {
            let result = server.load_clip_async(&request.url).await;
            request.complete(result);
        });
    }
}
