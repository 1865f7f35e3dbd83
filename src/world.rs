use cgmath::{vec2, vec3, vec4, Matrix4, Vector2, Vector3, Vector4};

use crate::error::SceneError;
use crate::mesh::{Drawable, PrimitiveShape};
use crate::renderer::model_matrix;

/// A drawable placed in the scene with its own transform and shading state.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    pub tag: String,
    pub position: Vector3<f32>,
    /// Euler angles in degrees.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Empty means no material is pushed for this instance.
    pub material_tag: String,
    /// Empty means the instance is drawn with its flat color.
    pub texture_tag: String,
    pub uv_scale: Vector2<f32>,
    pub shader_color: Vector4<f32>,
    /// `None` makes the instance inert: it is kept and saved but never drawn.
    pub drawable: Option<Drawable>,
    pub is_rotating: bool,
}

impl MeshInstance {
    /// An inert instance at the origin with unit scale and a white color.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            position: vec3(0.0, 0.0, 0.0),
            rotation: vec3(0.0, 0.0, 0.0),
            scale: vec3(1.0, 1.0, 1.0),
            material_tag: String::new(),
            texture_tag: String::new(),
            uv_scale: vec2(1.0, 1.0),
            shader_color: vec4(1.0, 1.0, 1.0, 1.0),
            drawable: None,
            is_rotating: false,
        }
    }

    pub fn primitive(shape: PrimitiveShape) -> Self {
        Self::new(shape.tag()).with_drawable(Drawable::Primitive(shape.into()))
    }

    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        model_matrix(self.scale, self.rotation, self.position)
    }

    /// Turns the instance about Y, keeping the angle below 360 degrees.
    pub fn advance_rotation(&mut self, degrees: f32) {
        self.rotation.y += degrees;
        if self.rotation.y >= 360.0 {
            self.rotation.y -= 360.0;
        }
    }
}

/// Ordered list of the instances the user placed. Draw order is insertion
/// order; indices shift down after a removal.
#[derive(Debug, Default)]
pub struct SceneGraph {
    instances: Vec<MeshInstance>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instance(&mut self, instance: MeshInstance) -> usize {
        self.instances.push(instance);
        self.instances.len() - 1
    }

    /// Removes and returns the instance at `index`, or does nothing when the
    /// index is out of range.
    pub fn remove_instance(&mut self, index: usize) -> Option<MeshInstance> {
        if index < self.instances.len() {
            Some(self.instances.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Result<&MeshInstance, SceneError> {
        let len = self.instances.len();
        self.instances
            .get(index)
            .ok_or(SceneError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut MeshInstance, SceneError> {
        let len = self.instances.len();
        self.instances
            .get_mut(index)
            .ok_or(SceneError::IndexOutOfRange { index, len })
    }

    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeshInstance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MeshInstance> {
        self.instances.iter_mut()
    }

    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// Swaps in a whole new instance list, as a scene load does.
    pub fn replace_all(&mut self, instances: Vec<MeshInstance>) {
        self.instances = instances;
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}
