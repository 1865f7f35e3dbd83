//! Recording fakes for the backend traits, plus temp-file helpers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

use crate::error::BackendError;
use crate::handles::{MeshHandle, TextureId};
use crate::mesh::{MeshLibrary, Primitive};
use crate::shaders::ShaderBackend;
use crate::textures::{DecodedImage, TextureBackend};

#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Mat4(Matrix4<f32>),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Float(f32),
    Int(i32),
    Bool(bool),
    Sampler(i32),
}

/// Remembers every uniform write in order.
#[derive(Debug, Default)]
pub struct RecordingShader {
    pub calls: Vec<(String, Uniform)>,
    pub uses: usize,
}

impl RecordingShader {
    /// Last value written to `name`.
    pub fn value(&self, name: &str) -> Option<&Uniform> {
        self.calls
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn writes_to(&self, name: &str) -> usize {
        self.calls.iter().filter(|(n, _)| n == name).count()
    }

    fn record(&mut self, name: &str, value: Uniform) {
        self.calls.push((name.to_string(), value));
    }
}

impl ShaderBackend for RecordingShader {
    fn use_program(&mut self) {
        self.uses += 1;
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.record(name, Uniform::Mat4(*value));
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        self.record(name, Uniform::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.record(name, Uniform::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        self.record(name, Uniform::Vec4(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.record(name, Uniform::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.record(name, Uniform::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.record(name, Uniform::Bool(value));
    }

    fn set_sampler(&mut self, name: &str, unit: i32) {
        self.record(name, Uniform::Sampler(unit));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Primitive(Primitive),
    Mesh(MeshHandle),
}

#[derive(Debug, Default)]
pub struct RecordingMeshes {
    pub draws: Vec<DrawCall>,
    pub uploads: Vec<(Vec<f32>, Vec<u32>)>,
    /// Uploads fail once this many have succeeded.
    pub fail_after: Option<usize>,
}

impl RecordingMeshes {
    pub fn failing_after(uploads: usize) -> Self {
        Self {
            fail_after: Some(uploads),
            ..Self::default()
        }
    }
}

impl MeshLibrary for RecordingMeshes {
    fn draw_primitive(&mut self, primitive: Primitive) {
        self.draws.push(DrawCall::Primitive(primitive));
    }

    fn upload_mesh(&mut self, vertices: &[f32], indices: &[u32]) -> Result<MeshHandle, BackendError> {
        if self.fail_after.is_some_and(|limit| self.uploads.len() >= limit) {
            return Err(BackendError("out of buffer memory".into()));
        }
        let handle = MeshHandle {
            id: self.uploads.len(),
            index_count: indices.len(),
        };
        self.uploads.push((vertices.to_vec(), indices.to_vec()));
        Ok(handle)
    }

    fn draw_mesh(&mut self, handle: MeshHandle) {
        self.draws.push(DrawCall::Mesh(handle));
    }
}

#[derive(Debug, Default)]
pub struct FakeTextures {
    /// Width, height and channel count of each upload.
    pub uploaded: Vec<(u32, u32, u8)>,
    pub bound: Vec<(u32, TextureId)>,
}

impl TextureBackend for FakeTextures {
    fn upload(&mut self, image: &DecodedImage) -> Result<TextureId, BackendError> {
        let id = TextureId(self.uploaded.len());
        self.uploaded.push((image.width, image.height, image.channels));
        Ok(id)
    }

    fn bind(&mut self, unit: u32, texture: TextureId) {
        self.bound.push((unit, texture));
    }
}

/// A fresh path in the system temp dir, unique per call.
pub fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("credenza-{}-{}-{}", std::process::id(), n, name))
}

/// Writes a 2x2 PNG with the given channel count (1, 3 or 4).
pub fn write_test_image(path: &Path, channels: u8) {
    let result = match channels {
        1 => image::GrayImage::from_pixel(2, 2, image::Luma([128])).save(path),
        3 => image::RgbImage::from_pixel(2, 2, image::Rgb([200, 100, 50])).save(path),
        4 => image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255])).save(path),
        _ => panic!("no test image with {channels} channels"),
    };
    result.unwrap();
}
