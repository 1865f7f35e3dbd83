use std::collections::HashMap;

use cgmath::{vec3, Vector3};

/// Lighting reflectance coefficients pushed to `material.*` uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vector3<f32>,
    pub ambient_strength: f32,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
}

impl Material {
    pub fn new(
        tag: &str,
        ambient_color: Vector3<f32>,
        ambient_strength: f32,
        diffuse_color: Vector3<f32>,
        specular_color: Vector3<f32>,
        shininess: f32,
    ) -> Self {
        Self {
            tag: tag.to_string(),
            ambient_color,
            ambient_strength,
            diffuse_color,
            specular_color,
            shininess,
        }
    }
}

/// The materials every scene is prepared with.
pub fn scene_materials() -> Vec<Material> {
    vec![
        Material::new("default", vec3(0.3, 0.3, 0.3), 0.4, vec3(0.5, 0.5, 0.5), vec3(0.2, 0.2, 0.2), 16.0),
        Material::new("metal", vec3(0.2, 0.2, 0.2), 0.3, vec3(0.2, 0.2, 0.2), vec3(0.5, 0.5, 0.5), 22.0),
        Material::new("wood", vec3(0.1, 0.1, 0.1), 0.2, vec3(0.3, 0.3, 0.3), vec3(0.3, 0.3, 0.3), 22.0),
        Material::new("picture frame", vec3(0.1, 0.1, 0.1), 0.5, vec3(0.3, 0.3, 0.3), vec3(0.1, 0.1, 0.01), 80.0),
        Material::new("woodNoShine", vec3(0.1, 0.1, 0.1), 0.2, vec3(0.3, 0.3, 0.3), vec3(0.3, 0.3, 0.3), 0.3),
        Material::new("wall", vec3(0.2, 0.2, 0.2), 0.2, vec3(0.5, 0.5, 0.5), vec3(0.01, 0.01, 0.01), 3.0),
        Material::new("glass", vec3(0.4, 0.4, 0.4), 0.3, vec3(0.3, 0.3, 0.3), vec3(0.1, 0.1, 0.01), 12.0),
    ]
}

/// Append-only table of named materials, filled before the first frame.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    by_tag: HashMap<String, usize>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, material: Material) {
        let index = self.materials.len();
        self.by_tag.entry(material.tag.clone()).or_insert(index);
        self.materials.push(material);
    }

    /// Registers [`scene_materials`]. Only the first call has an effect.
    pub fn define_all(&mut self) {
        if !self.materials.is_empty() {
            log::warn!("Scene materials are already defined");
            return;
        }
        for material in scene_materials() {
            self.define(material);
        }
    }

    /// First material registered under `tag`.
    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.by_tag.get(tag).map(|&index| &self.materials[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_materials_are_all_findable() {
        let mut registry = MaterialRegistry::new();
        registry.define_all();

        for tag in ["default", "metal", "wood", "glass", "picture frame", "wall", "woodNoShine"] {
            assert_eq!(registry.find(tag).map(|m| m.tag.as_str()), Some(tag));
        }
        assert_eq!(registry.find("plastic"), None);
        assert_eq!(registry.find("").map(|m| m.tag.as_str()), None);
    }

    #[test]
    fn define_all_runs_once() {
        let mut registry = MaterialRegistry::new();
        registry.define_all();
        let count = registry.len();
        registry.define_all();
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn first_definition_wins() {
        let mut registry = MaterialRegistry::new();
        let shiny = Material::new("steel", vec3(0.0, 0.0, 0.0), 0.1, vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0), 64.0);
        let dull = Material { shininess: 1.0, ..shiny.clone() };
        registry.define(shiny);
        registry.define(dull);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("steel").map(|m| m.shininess), Some(64.0));
    }
}
