use cgmath::{Deg, Matrix4, Vector2, Vector3, Vector4};

use crate::material::MaterialRegistry;
use crate::mesh::{self, MeshLibrary, Primitive};
use crate::shaders::{self, ShaderBackend};
use crate::textures::TextureRegistry;
use crate::world::MeshInstance;

/// Translation * RotX * RotY * RotZ * Scale, angles in degrees.
pub fn model_matrix(
    scale: Vector3<f32>,
    rotation: Vector3<f32>,
    position: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(position)
        * Matrix4::from_angle_x(Deg(rotation.x))
        * Matrix4::from_angle_y(Deg(rotation.y))
        * Matrix4::from_angle_z(Deg(rotation.z))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// What happened to the `material.*` uniforms for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialBinding {
    /// Empty tag, nothing pushed.
    Unset,
    Applied,
    /// Unknown tag, nothing pushed: the previous draw's material stays active.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    Untextured,
    Bound { slot: usize },
    /// Unknown tag, drawn untextured.
    Missing,
}

/// Pushes per-draw state into the shader and issues the draw call. The
/// fixed environment and the user's instances both go through here.
pub struct Renderer<'a> {
    shader: &'a mut dyn ShaderBackend,
    meshes: &'a mut dyn MeshLibrary,
    textures: &'a TextureRegistry,
    materials: &'a MaterialRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(
        shader: &'a mut dyn ShaderBackend,
        meshes: &'a mut dyn MeshLibrary,
        textures: &'a TextureRegistry,
        materials: &'a MaterialRegistry,
    ) -> Self {
        Self {
            shader,
            meshes,
            textures,
            materials,
        }
    }

    pub fn set_transformations(
        &mut self,
        scale: Vector3<f32>,
        rotation: Vector3<f32>,
        position: Vector3<f32>,
    ) {
        let model = model_matrix(scale, rotation, position);
        self.shader.set_mat4(shaders::MODEL, &model);
    }

    pub fn set_material(&mut self, tag: &str) -> MaterialBinding {
        if tag.is_empty() {
            return MaterialBinding::Unset;
        }
        let Some(material) = self.materials.find(tag) else {
            log::debug!("Material {tag:?} is not defined, keeping the previous one");
            return MaterialBinding::Missing;
        };

        self.shader
            .set_vec3(shaders::MATERIAL_AMBIENT_COLOR, material.ambient_color);
        self.shader
            .set_float(shaders::MATERIAL_AMBIENT_STRENGTH, material.ambient_strength);
        self.shader
            .set_vec3(shaders::MATERIAL_DIFFUSE_COLOR, material.diffuse_color);
        self.shader
            .set_vec3(shaders::MATERIAL_SPECULAR_COLOR, material.specular_color);
        self.shader
            .set_float(shaders::MATERIAL_SHININESS, material.shininess);
        MaterialBinding::Applied
    }

    pub fn set_texture(&mut self, tag: &str) -> TextureBinding {
        if tag.is_empty() {
            self.shader.set_bool(shaders::USE_TEXTURE, false);
            return TextureBinding::Untextured;
        }
        match self.textures.find_slot(tag) {
            Some(slot) => {
                self.shader.set_bool(shaders::USE_TEXTURE, true);
                self.shader.set_sampler(shaders::OBJECT_TEXTURE, slot as i32);
                TextureBinding::Bound { slot }
            }
            None => {
                log::debug!("Texture {tag:?} is not loaded, drawing untextured");
                self.shader.set_bool(shaders::USE_TEXTURE, false);
                TextureBinding::Missing
            }
        }
    }

    pub fn set_uv_scale(&mut self, uv_scale: Vector2<f32>) {
        self.shader.set_vec2(shaders::UV_SCALE, uv_scale);
    }

    pub fn set_color(&mut self, color: Vector4<f32>) {
        self.shader.set_vec4(shaders::OBJECT_COLOR, color);
    }

    pub fn draw_primitive(&mut self, primitive: Primitive) {
        self.meshes.draw_primitive(primitive);
    }

    /// Runs the full per-instance sequence. Returns whether anything was
    /// drawn; inert instances still push their state but draw nothing.
    pub fn draw_instance(&mut self, instance: &MeshInstance) -> bool {
        self.set_transformations(instance.scale, instance.rotation, instance.position);
        self.set_material(&instance.material_tag);
        self.set_texture(&instance.texture_tag);
        self.set_uv_scale(instance.uv_scale);
        self.set_color(instance.shader_color);

        match &instance.drawable {
            Some(drawable) => {
                mesh::draw(drawable, self.meshes);
                true
            }
            None => false,
        }
    }
}
