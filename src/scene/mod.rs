//! Scene Graph
//!
//! A deliberately small scene graph that hosts character instances:
//! - [`Node`]: hierarchy + transform + optional mesh/skin components
//! - [`Transform`]: TRS with cached local/world matrices
//! - [`Skeleton`] / [`SkinBinding`]: bone lists and their binding to a skinned node
//! - [`Scene`]: slotmap-backed container, traversal, structural cloning
//! - [`clone_skinned`]: deep clone that gives every copy its own skeleton

pub mod clone;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use clone::clone_skinned;
pub use node::Node;
pub use scene::Scene;
pub use skeleton::{BindMode, Skeleton, SkinBinding};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkeletonKey;
}
