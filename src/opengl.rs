//! OpenGL implementations of the backend traits, on top of `glow`.
//!
//! Everything here needs a current GL context and is therefore only
//! exercised by the editor binary.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use cgmath::{Matrix4, Vector2, Vector3, Vector4};
use glow::HasContext;

use crate::data::IMPORTED_VERTEX_FLOATS;
use crate::error::{BackendError, GlError};
use crate::geometry::{self, ShapeMesh, FLOATS_PER_VERTEX};
use crate::handles::{MeshHandle, TextureId};
use crate::mesh::{MeshLibrary, Primitive, PrimitiveShape};
use crate::shaders::ShaderBackend;
use crate::textures::{DecodedImage, TextureBackend};

const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;
const INDEX_SIZE: i32 = std::mem::size_of::<u32>() as i32;

/// One float vertex attribute inside an interleaved buffer.
#[derive(Debug, Clone)]
pub struct Layout {
    pub index: u32,
    pub size: i32,
    /// Offset in floats from the start of the vertex.
    pub offset: i32,
}

impl Layout {
    pub const fn new(index: u32, size: i32, offset: i32) -> Self {
        Self {
            index,
            size,
            offset,
        }
    }
}

/// Position, normal, texture coordinate.
const SHAPE_LAYOUTS: [Layout; 3] = [
    Layout::new(0, 3, 0),
    Layout::new(1, 3, 3),
    Layout::new(2, 2, 6),
];

/// Position, normal. Imported meshes carry no texture coordinates.
const IMPORTED_LAYOUTS: [Layout; 2] = [Layout::new(0, 3, 0), Layout::new(1, 3, 3)];

/// Vertex array plus the buffers it reads from.
#[derive(Debug)]
struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: u32,
}

fn create_error(what: &'static str) -> impl Fn(String) -> GlError {
    move |message| GlError::Create { what, message }
}

impl GpuMesh {
    fn upload(
        gl: &glow::Context,
        vertices: &[f32],
        indices: &[u32],
        floats_per_vertex: usize,
        layouts: &[Layout],
    ) -> Result<Self, GlError> {
        let stride = floats_per_vertex as i32 * FLOAT_SIZE;

        unsafe {
            let vao = gl.create_vertex_array().map_err(create_error("vertex array"))?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().map_err(create_error("vertex buffer"))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            let ebo = gl.create_buffer().map_err(create_error("index buffer"))?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            for layout in layouts {
                gl.vertex_attrib_pointer_f32(
                    layout.index,
                    layout.size,
                    glow::FLOAT,
                    false,
                    stride,
                    layout.offset * FLOAT_SIZE,
                );
                gl.enable_vertex_attrib_array(layout.index);
            }

            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count: indices.len() as u32,
            })
        }
    }

    fn draw(&self, gl: &glow::Context, range: Range<u32>) {
        if range.is_empty() {
            return;
        }
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(
                glow::TRIANGLES,
                range.len() as i32,
                glow::UNSIGNED_INT,
                range.start as i32 * INDEX_SIZE,
            );
        }
    }

    fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

/// The ten built-in shapes, uploaded once, plus every imported mesh.
pub struct GlMeshLibrary {
    gl: Arc<glow::Context>,
    shapes: HashMap<PrimitiveShape, (GpuMesh, ShapeMesh)>,
    meshes: Vec<GpuMesh>,
}

impl GlMeshLibrary {
    pub fn new(gl: Arc<glow::Context>) -> Result<Self, GlError> {
        let mut shapes = HashMap::new();
        for shape in PrimitiveShape::ALL {
            let mesh = geometry::generate(shape);
            let gpu = GpuMesh::upload(
                &gl,
                &mesh.vertices,
                &mesh.indices,
                FLOATS_PER_VERTEX,
                &SHAPE_LAYOUTS,
            )?;
            log::debug!(
                "Uploaded {} ({} vertices, {} indices)",
                shape.tag(),
                mesh.vertex_count(),
                mesh.indices.len()
            );
            shapes.insert(shape, (gpu, mesh));
        }

        Ok(Self {
            gl,
            shapes,
            meshes: Vec::new(),
        })
    }

    /// Frees every buffer. The context must still be current.
    pub fn destroy(&mut self) {
        for (gpu, _) in self.shapes.values() {
            gpu.delete(&self.gl);
        }
        for gpu in &self.meshes {
            gpu.delete(&self.gl);
        }
        self.shapes.clear();
        self.meshes.clear();
    }
}

impl MeshLibrary for GlMeshLibrary {
    fn draw_primitive(&mut self, primitive: Primitive) {
        if let Some((gpu, mesh)) = self.shapes.get(&primitive.shape) {
            for range in mesh.ranges(primitive.parts) {
                gpu.draw(&self.gl, range);
            }
        }
    }

    fn upload_mesh(&mut self, vertices: &[f32], indices: &[u32]) -> Result<MeshHandle, BackendError> {
        let gpu = GpuMesh::upload(
            &self.gl,
            vertices,
            indices,
            IMPORTED_VERTEX_FLOATS,
            &IMPORTED_LAYOUTS,
        )?;
        let handle = MeshHandle {
            id: self.meshes.len(),
            index_count: indices.len(),
        };
        self.meshes.push(gpu);
        Ok(handle)
    }

    fn draw_mesh(&mut self, handle: MeshHandle) {
        match self.meshes.get(handle.id) {
            Some(gpu) => gpu.draw(&self.gl, 0..gpu.index_count),
            None => log::warn!("Mesh handle {} was never uploaded", handle.id),
        }
    }
}

/// A linked vertex + fragment program with cached uniform locations.
pub struct GlShaderProgram {
    gl: Arc<glow::Context>,
    program: glow::Program,
    locations: HashMap<String, Option<glow::UniformLocation>>,
}

impl GlShaderProgram {
    pub fn from_files(
        gl: Arc<glow::Context>,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, GlError> {
        unsafe {
            let vertex = compile_shader(&gl, glow::VERTEX_SHADER, vertex_path)?;
            let fragment = match compile_shader(&gl, glow::FRAGMENT_SHADER, fragment_path) {
                Ok(fragment) => fragment,
                Err(e) => {
                    gl.delete_shader(vertex);
                    return Err(e);
                }
            };

            let program = gl.create_program().map_err(create_error("shader program"))?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(GlError::Link(log));
            }

            log::info!(
                "Linked shader program from {:?} and {:?}",
                vertex_path,
                fragment_path
            );
            Ok(Self {
                gl,
                program,
                locations: HashMap::new(),
            })
        }
    }

    fn location(&mut self, name: &str) -> Option<glow::UniformLocation> {
        if let Some(location) = self.locations.get(name) {
            return location.clone();
        }

        let location = unsafe { self.gl.get_uniform_location(self.program, name) };
        if location.is_none() {
            log::debug!("Shader program has no uniform called {:?}", name);
        }
        self.locations.insert(name.to_string(), location.clone());
        location
    }

    pub fn destroy(&self) {
        unsafe { self.gl.delete_program(self.program) };
    }
}

fn compile_shader(gl: &glow::Context, kind: u32, path: &Path) -> Result<glow::Shader, GlError> {
    let source = std::fs::read_to_string(path).map_err(|source| GlError::Source {
        path: path.to_path_buf(),
        source,
    })?;

    unsafe {
        let shader = gl.create_shader(kind).map_err(create_error("shader"))?;
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(GlError::Compile {
                path: path.to_path_buf(),
                log,
            });
        }
        Ok(shader)
    }
}

impl ShaderBackend for GlShaderProgram {
    fn use_program(&mut self) {
        unsafe { self.gl.use_program(Some(self.program)) };
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        let location = self.location(name);
        let values: &[f32; 16] = value.as_ref();
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(location.as_ref(), false, values)
        };
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        let location = self.location(name);
        unsafe { self.gl.uniform_2_f32(location.as_ref(), value.x, value.y) };
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let location = self.location(name);
        unsafe {
            self.gl
                .uniform_3_f32(location.as_ref(), value.x, value.y, value.z)
        };
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        let location = self.location(name);
        unsafe {
            self.gl
                .uniform_4_f32(location.as_ref(), value.x, value.y, value.z, value.w)
        };
    }

    fn set_float(&mut self, name: &str, value: f32) {
        let location = self.location(name);
        unsafe { self.gl.uniform_1_f32(location.as_ref(), value) };
    }

    fn set_int(&mut self, name: &str, value: i32) {
        let location = self.location(name);
        unsafe { self.gl.uniform_1_i32(location.as_ref(), value) };
    }
}

/// 2D textures created with repeat wrapping, linear filtering and mipmaps.
pub struct GlTextures {
    gl: Arc<glow::Context>,
    textures: Vec<glow::Texture>,
}

impl GlTextures {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self {
            gl,
            textures: Vec::new(),
        }
    }

    pub fn destroy(&mut self) {
        for texture in self.textures.drain(..) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }
}

impl TextureBackend for GlTextures {
    fn upload(&mut self, image: &DecodedImage) -> Result<TextureId, BackendError> {
        let format = match image.channels {
            3 => glow::RGB,
            4 => glow::RGBA,
            channels => {
                return Err(BackendError(format!(
                    "cannot upload an image with {} channels",
                    channels
                )))
            }
        };

        let gl = &self.gl;
        unsafe {
            let texture = gl.create_texture().map_err(create_error("texture"))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );

            // RGB rows are not 4-byte aligned in general.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                image.width as i32,
                image.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&image.pixels)),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);

            self.textures.push(texture);
        }
        Ok(TextureId(self.textures.len() - 1))
    }

    fn bind(&mut self, unit: u32, texture: TextureId) {
        let Some(&texture) = self.textures.get(texture.0) else {
            log::warn!("Texture {:?} was never uploaded", texture);
            return;
        };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }
}
