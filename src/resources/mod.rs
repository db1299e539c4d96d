//! Resource types attached to scene nodes or stored in the asset server.

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::PhongMaterial;
pub use mesh::Mesh;
pub use texture::{ColorSpace, Texture};
