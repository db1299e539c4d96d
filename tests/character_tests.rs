//! Character Materializer Tests
//!
//! Tests for:
//! - One shared non-specular skin material per instance
//! - Eyes culling fix-up (and tolerance of a missing Eyes node)
//! - Root naming and visibility
//! - Template sharing, release and model/texture caching

mod common;

use glam::Vec3;

use manny::character::{Materializer, instantiate_skinned};
use manny::{AssetServer, ColorSpace, NodeHandle, Scene, Texture};

use common::{MODEL, OTHER_TEXTURE, TEXTURE, rig_prefab, seeded_assets};

fn mesh_materials(scene: &Scene, root: NodeHandle) -> Vec<manny::assets::MaterialHandle> {
    scene
        .traverse(root)
        .into_iter()
        .filter_map(|h| scene.get_node(h)?.mesh)
        .map(|key| scene.meshes[key].material.expect("mesh without material"))
        .collect()
}

// ============================================================================
// Material
// ============================================================================

#[test]
fn every_mesh_shares_one_skin_material() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let root = Materializer::new(&assets)
        .materialize(&mut scene, MODEL, TEXTURE)
        .unwrap();

    let materials = mesh_materials(&scene, root);
    assert_eq!(materials.len(), 2);
    assert!(materials.iter().all(|&m| m == materials[0]));

    let material = assets.get_material(materials[0]).unwrap();
    assert_eq!(material.map, assets.textures.get_handle_by_uri(TEXTURE));
    assert_eq!(material.specular, Vec3::ZERO);
    assert!(!material.transparent);
}

#[test]
fn instances_get_separate_materials() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let materializer = Materializer::new(&assets);
    let a = materializer.materialize(&mut scene, MODEL, TEXTURE).unwrap();
    let b = materializer.materialize(&mut scene, MODEL, OTHER_TEXTURE).unwrap();

    assert_ne!(mesh_materials(&scene, a)[0], mesh_materials(&scene, b)[0]);
}

// ============================================================================
// Eyes
// ============================================================================

#[test]
fn eyes_are_never_frustum_culled() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let root = Materializer::new(&assets)
        .materialize(&mut scene, MODEL, TEXTURE)
        .unwrap();

    let eyes = scene.find_node_by_name(root, "Eyes").unwrap();
    let body = scene.find_node_by_name(root, "Body").unwrap();
    assert!(!scene.get_node(eyes).unwrap().frustum_culled);
    assert!(scene.get_node(body).unwrap().frustum_culled);
}

#[test]
fn missing_eyes_is_tolerated() {
    let assets = AssetServer::new();
    let mut scene = Scene::new();
    let template = scene.instantiate(&rig_prefab(false));
    let texture = assets.insert_texture(TEXTURE, Texture::solid("t", [255; 4], ColorSpace::Srgb));

    let root = instantiate_skinned(&mut scene, &assets, template, texture).unwrap();
    assert!(scene.find_node_by_name(root, "Eyes").is_none());
    assert_eq!(mesh_materials(&scene, root).len(), 1);
}

// ============================================================================
// Instances
// ============================================================================

#[test]
fn root_is_named_after_texture_and_visible() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let root = Materializer::new(&assets)
        .materialize(&mut scene, MODEL, TEXTURE)
        .unwrap();

    assert_eq!(scene.get_name(root), Some(format!("manny-{TEXTURE}").as_str()));
    assert!(scene.get_node(root).unwrap().visible);
}

#[test]
fn template_is_hidden_and_shared() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let a = Materializer::new(&assets).materialize(&mut scene, MODEL, TEXTURE).unwrap();
    let b = Materializer::new(&assets).materialize(&mut scene, MODEL, TEXTURE).unwrap();

    let model = assets.models.get_handle_by_uri(MODEL).unwrap();
    let template = assets.templates.get(&scene, model).unwrap();
    assert_ne!(a, b);
    assert!(!scene.get_node(template).unwrap().visible);
    assert_eq!(assets.templates.users(&scene, model), 2);
    assert_eq!(scene.root_nodes.len(), 3);
    assert_eq!(assets.models.len(), 1);
}

#[test]
fn template_is_rebuilt_per_scene() {
    let assets = seeded_assets();
    let materializer = Materializer::new(&assets);
    let mut first = Scene::new();
    let mut second = Scene::new();

    materializer.materialize(&mut first, MODEL, TEXTURE).unwrap();
    let root = materializer.materialize(&mut second, MODEL, TEXTURE).unwrap();
    assert!(second.get_node(root).is_some());
    assert!(second.find_node_by_name(root, "Hips").is_some());

    let model = assets.models.get_handle_by_uri(MODEL).unwrap();
    assert_eq!(assets.templates.users(&first, model), 1);
    assert_eq!(assets.templates.users(&second, model), 1);
}

#[test]
fn unknown_model_is_an_error() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let result = Materializer::new(&assets).materialize(&mut scene, "missing/manny.glb", TEXTURE);
    assert!(result.is_err());
    assert!(scene.nodes.is_empty());
}

#[test]
fn unknown_texture_releases_the_template() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let result = Materializer::new(&assets).materialize(&mut scene, MODEL, "missing/skin.png");

    assert!(result.is_err());
    assert!(scene.nodes.is_empty());
    assert!(scene.skins.is_empty());
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn release_frees_instance_material_and_template() {
    let assets = seeded_assets();
    let mut scene = Scene::new();
    let materializer = Materializer::new(&assets);
    let a = materializer.materialize(&mut scene, MODEL, TEXTURE).unwrap();
    let b = materializer.materialize(&mut scene, MODEL, OTHER_TEXTURE).unwrap();
    let b_material = mesh_materials(&scene, b)[0];

    materializer.release(&mut scene, MODEL, a);
    assert!(scene.get_node(a).is_none());
    assert_eq!(assets.materials.len(), 1);
    assert!(assets.get_material(b_material).is_some());

    materializer.release(&mut scene, MODEL, b);
    assert!(scene.nodes.is_empty());
    assert!(scene.skins.is_empty());
    assert!(scene.meshes.is_empty());
    assert!(assets.materials.is_empty());
    // Models and textures stay cached for the next spawn.
    assert_eq!(assets.models.len(), 1);
    assert_eq!(assets.textures.len(), 2);
}
