use cgmath::{Matrix4, Vector2, Vector3, Vector4};

pub const MODEL: &str = "model";
pub const VIEW: &str = "view";
pub const PROJECTION: &str = "projection";
pub const VIEW_POSITION: &str = "viewPosition";
pub const OBJECT_COLOR: &str = "objectColor";
pub const OBJECT_TEXTURE: &str = "objectTexture";
pub const USE_TEXTURE: &str = "bUseTexture";
pub const USE_LIGHTING: &str = "bUseLighting";
pub const UV_SCALE: &str = "UVscale";

pub const MATERIAL_AMBIENT_COLOR: &str = "material.ambientColor";
pub const MATERIAL_AMBIENT_STRENGTH: &str = "material.ambientStrength";
pub const MATERIAL_DIFFUSE_COLOR: &str = "material.diffuseColor";
pub const MATERIAL_SPECULAR_COLOR: &str = "material.specularColor";
pub const MATERIAL_SHININESS: &str = "material.shininess";

/// Number of `lightSources[]` entries declared by the fragment shader.
pub const MAX_LIGHTS: usize = 4;

pub fn light_uniform(index: usize, field: &str) -> String {
    format!("lightSources[{index}].{field}")
}

/// Uniform-setting contract of the shader program every draw goes through.
///
/// Uniforms are addressed by name. Setting a name the program does not
/// declare is silently ignored, like `glUniform*` with location -1.
pub trait ShaderBackend {
    fn use_program(&mut self);

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>);
    fn set_vec2(&mut self, name: &str, value: Vector2<f32>);
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_vec4(&mut self, name: &str, value: Vector4<f32>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_int(name, value as i32);
    }

    fn set_sampler(&mut self, name: &str, unit: i32) {
        self.set_int(name, unit);
    }
}
