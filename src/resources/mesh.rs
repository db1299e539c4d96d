use crate::assets::MaterialHandle;

/// Mesh component.
///
/// Geometry stays with the decoder that produced the model; the scene only
/// tracks which material a mesh is drawn with.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub material: Option<MaterialHandle>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            material: None,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = Some(material);
        self
    }
}
