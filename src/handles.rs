/// Opaque handle to a texture owned by a [`crate::textures::TextureBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Handle to geometry uploaded through [`crate::mesh::MeshLibrary::upload_mesh`].
///
/// The library keeps the buffers alive for the rest of the program, so the
/// handle can be copied into any number of instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    pub id: usize,
    pub index_count: usize,
}
