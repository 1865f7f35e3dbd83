use std::path::PathBuf;

/// Floats per imported vertex: position (3) + normal (3).
pub const IMPORTED_VERTEX_FLOATS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub positions: Vec<[f32; 3]>, // Required

    pub normals: Option<Vec<[f32; 3]>>, // Optional
}

impl VertexData {
    /// Position/normal pairs laid out for upload. Vertices without a normal
    /// get the zero vector.
    pub fn interleave(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.positions.len() * IMPORTED_VERTEX_FLOATS);
        for (i, position) in self.positions.iter().enumerate() {
            let normal = self
                .normals
                .as_ref()
                .and_then(|normals| normals.get(i))
                .copied()
                .unwrap_or([0.0; 3]);
            out.extend_from_slice(position);
            out.extend_from_slice(&normal);
        }
        out
    }
}

/// One triangle list read from a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPrimitive {
    pub vertex_data: VertexData,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub name: String,
    pub path: PathBuf,
    /// Leaves in node-walk order; the position in this list is the leaf ordinal.
    pub primitives: Vec<LoadedPrimitive>,
}
