//! Character materialization: one independent, skinned instance per call.

use rustc_hash::FxHashSet;

use crate::assets::{AssetServer, MaterialHandle, TextureHandle};
use crate::errors::Result;
use crate::resources::material::PhongMaterial;
use crate::resources::texture::ColorSpace;
use crate::scene::{NodeHandle, Scene, clone_skinned};

/// Sub-node whose bounds do not follow the head; never frustum-culled.
pub const EYES_NODE_NAME: &str = "Eyes";

/// Builds character instances from shared model and texture assets.
///
/// Each model is instantiated once per scene as a hidden template, held in
/// the asset server and shared by every materializer built on it. Every
/// [`materialize`](Self::materialize) clones that template with its own
/// skeleton, so instances never share pose state. Pair it with
/// [`release`](Self::release).
#[derive(Clone)]
pub struct Materializer {
    assets: AssetServer,
}

impl Materializer {
    #[must_use]
    pub fn new(assets: &AssetServer) -> Self {
        Self {
            assets: assets.clone(),
        }
    }

    /// Loads `model_path` and `texture_url` (both cached by the asset
    /// server) and returns the root of a new, visible instance named
    /// `manny-<texture_url>`.
    pub fn materialize(
        &self,
        scene: &mut Scene,
        model_path: &str,
        texture_url: &str,
    ) -> Result<NodeHandle> {
        let template = self.assets.acquire_template(scene, model_path)?;
        let root = self
            .assets
            .load_texture(texture_url, ColorSpace::Srgb)
            .and_then(|texture| instantiate_skinned(scene, &self.assets, template, texture));
        let root = match root {
            Ok(root) => root,
            Err(err) => {
                self.assets.release_template(scene, model_path);
                return Err(err);
            }
        };

        scene.set_name(root, &format!("manny-{texture_url}"));
        log::debug!("Materialized character '{model_path}' with texture '{texture_url}'");
        Ok(root)
    }

    /// Removes an instance made by [`materialize`](Self::materialize), frees
    /// its skin material and drops its hold on the model template.
    pub fn release(&self, scene: &mut Scene, model_path: &str, root: NodeHandle) {
        let materials: FxHashSet<MaterialHandle> = scene
            .traverse(root)
            .into_iter()
            .filter_map(|h| scene.get_node(h)?.mesh)
            .filter_map(|key| scene.meshes.get(key)?.material)
            .collect();

        scene.remove_node(root);
        for material in materials {
            self.assets.remove_material(material);
        }
        self.assets.release_template(scene, model_path);
    }
}

/// Clones `template` into an independent instance, skins it with `texture`
/// and applies the eye fix-up.
pub fn instantiate_skinned(
    scene: &mut Scene,
    assets: &AssetServer,
    template: NodeHandle,
    texture: TextureHandle,
) -> Result<NodeHandle> {
    let root = clone_skinned(scene, template)?;
    if let Some(node) = scene.get_node_mut(root) {
        node.visible = true;
    }

    apply_skin(scene, assets, root, texture);
    disable_eye_culling(scene, root);
    scene.update_subtree(root);
    Ok(root)
}

/// Assigns one shared non-specular material sampling `texture` to every mesh
/// under `root`.
pub fn apply_skin(
    scene: &mut Scene,
    assets: &AssetServer,
    root: NodeHandle,
    texture: TextureHandle,
) -> MaterialHandle {
    let material = assets.add_material(PhongMaterial::skin(texture));
    for handle in scene.traverse(root) {
        let Some(mesh_key) = scene.get_node(handle).and_then(|n| n.mesh) else {
            continue;
        };
        if let Some(mesh) = scene.meshes.get_mut(mesh_key) {
            mesh.material = Some(material);
        }
    }
    material
}

fn disable_eye_culling(scene: &mut Scene, root: NodeHandle) {
    match scene
        .find_node_by_name(root, EYES_NODE_NAME)
        .and_then(|h| scene.get_node_mut(h))
    {
        Some(eyes) => eyes.frustum_culled = false,
        None => log::debug!("No '{EYES_NODE_NAME}' node; skipping culling fix-up"),
    }
}
