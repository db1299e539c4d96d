use glam::Vec3;

use crate::assets::TextureHandle;

/// Blinn-Phong surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    pub color: Vec3,
    pub map: Option<TextureHandle>,
    pub specular: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    pub transparent: bool,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            map: None,
            specular: Vec3::splat(0.067),
            shininess: 30.0,
            opacity: 1.0,
            transparent: false,
        }
    }
}

impl PhongMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opaque, non-specular material sampling `map`.
    #[must_use]
    pub fn skin(map: TextureHandle) -> Self {
        Self {
            map: Some(map),
            specular: Vec3::ZERO,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn with_specular(mut self, specular: Vec3) -> Self {
        self.specular = specular;
        self
    }
}
