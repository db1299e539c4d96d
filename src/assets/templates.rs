use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::assets::prefab::Prefab;
use crate::assets::server::ModelHandle;
use crate::scene::{NodeHandle, Scene};

struct Template {
    root: NodeHandle,
    users: usize,
}

/// Hidden per-scene instances of decoded models, shared by every character
/// built from the same model.
///
/// Each [`acquire`](Self::acquire) must be paired with a
/// [`release`](Self::release); the template leaves the scene with its last
/// user.
#[derive(Default)]
pub struct TemplateCache {
    entries: Mutex<FxHashMap<(u32, ModelHandle), Template>>,
}

impl TemplateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hidden template of `model` in `scene`, instantiating
    /// `prefab` on first use, and counts one more user.
    pub fn acquire(&self, scene: &mut Scene, model: ModelHandle, prefab: &Prefab) -> NodeHandle {
        let mut entries = self.entries.lock();
        let entry = entries.entry((scene.id, model)).or_insert(Template {
            root: NodeHandle::default(),
            users: 0,
        });

        // Also covers a template the caller removed from the scene by hand.
        if scene.get_node(entry.root).is_none() {
            entry.root = scene.instantiate(prefab);
            if let Some(node) = scene.get_node_mut(entry.root) {
                node.visible = false;
            }
            log::debug!("Instantiated template '{}' in scene {}", prefab.name, scene.id);
        }

        entry.users += 1;
        entry.root
    }

    /// Drops one user; the last one removes the template from `scene`.
    pub fn release(&self, scene: &mut Scene, model: ModelHandle) {
        let mut entries = self.entries.lock();
        let key = (scene.id, model);
        let Some(entry) = entries.get_mut(&key) else {
            log::warn!("Released a template that was never acquired");
            return;
        };

        entry.users = entry.users.saturating_sub(1);
        if entry.users == 0 {
            scene.remove_node(entry.root);
            entries.remove(&key);
        }
    }

    /// The live template of `model` in `scene`, if any.
    #[must_use]
    pub fn get(&self, scene: &Scene, model: ModelHandle) -> Option<NodeHandle> {
        let entries = self.entries.lock();
        entries
            .get(&(scene.id, model))
            .map(|t| t.root)
            .filter(|&root| scene.get_node(root).is_some())
    }

    #[must_use]
    pub fn users(&self, scene: &Scene, model: ModelHandle) -> usize {
        self.entries
            .lock()
            .get(&(scene.id, model))
            .map_or(0, |t| t.users)
    }
}
