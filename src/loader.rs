use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gltf::{mesh::Mode, Gltf, Node};

use crate::data::*;
use crate::error::ImportError;
use crate::handles::MeshHandle;
use crate::mesh::{Drawable, ImportedMesh, MeshLibrary};
use crate::world::MeshInstance;

/// Reads every triangle primitive reachable from the model's scene graph.
///
/// Nodes are visited depth first, parents before children, starting from the
/// default scene (or from every scene when the file names no default).
pub fn load_gltf(path: &Path) -> Result<LoadedModel, ImportError> {
    let parse_error = |source: gltf::Error| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let Gltf { document, blob } = Gltf::open(path).map_err(parse_error)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(parse_error)?;

    let roots: Vec<Node> = match document.default_scene() {
        Some(scene) => scene.nodes().collect(),
        None => document.scenes().flat_map(|scene| scene.nodes()).collect(),
    };

    let mut primitives = Vec::new();
    for node in roots {
        collect_node(path, &node, &buffers, &mut primitives)?;
    }

    if primitives.is_empty() {
        return Err(ImportError::NoMeshes(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(LoadedModel {
        name,
        path: path.to_path_buf(),
        primitives,
    })
}

fn collect_node(
    path: &Path,
    node: &Node,
    buffers: &[gltf::buffer::Data],
    primitives: &mut Vec<LoadedPrimitive>,
) -> Result<(), ImportError> {
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let leaf = primitives.len();
            if primitive.mode() != Mode::Triangles {
                log::warn!(
                    "Skipping {:?} primitive in mesh {:?} of {:?}",
                    primitive.mode(),
                    mesh.name().unwrap_or("<unnamed>"),
                    path
                );
                continue;
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| ImportError::MissingPositions {
                    path: path.to_path_buf(),
                    mesh: leaf,
                })?
                .collect();
            let normals = reader.read_normals().map(|normals| normals.collect());

            let count = positions.len();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..count as u32).collect(),
            };
            if let Some(&index) = indices.iter().find(|&&index| index as usize >= count) {
                return Err(ImportError::IndexOutOfBounds {
                    path: path.to_path_buf(),
                    mesh: leaf,
                    index,
                    count,
                });
            }

            primitives.push(LoadedPrimitive {
                vertex_data: VertexData { positions, normals },
                indices,
            });
        }
    }

    for child in node.children() {
        collect_node(path, &child, buffers, primitives)?;
    }
    Ok(())
}

/// Turns model files into scene instances. Each file is parsed and uploaded
/// once; later imports of the same path reuse the uploaded meshes.
#[derive(Debug, Default)]
pub struct ModelImporter {
    cache: HashMap<PathBuf, Vec<MeshHandle>>,
}

impl ModelImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploaded meshes of `path`, one per leaf. Either every leaf uploads or
    /// the whole file fails.
    pub fn meshes(
        &mut self,
        path: &Path,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<Vec<MeshHandle>, ImportError> {
        if let Some(handles) = self.cache.get(path) {
            return Ok(handles.clone());
        }

        let model = load_gltf(path)?;
        let handles = model
            .primitives
            .iter()
            .map(|primitive| meshes.upload_mesh(&primitive.vertex_data.interleave(), &primitive.indices))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Loaded model {:?} from {:?}: {} meshes",
            model.name,
            path,
            handles.len()
        );
        self.cache.insert(path.to_path_buf(), handles.clone());
        Ok(handles)
    }

    /// One instance per leaf mesh, copying everything but the tag and the
    /// drawable from `template`. Tags are the template's tag plus the leaf
    /// ordinal.
    pub fn import(
        &mut self,
        path: &Path,
        template: &MeshInstance,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<Vec<MeshInstance>, ImportError> {
        let handles = self.meshes(path, meshes)?;

        Ok(handles
            .into_iter()
            .enumerate()
            .map(|(ordinal, handle)| {
                let mut instance = template.clone();
                instance.tag = format!("{}{}", template.tag, ordinal);
                instance.drawable = Some(Drawable::Imported(ImportedMesh {
                    path: path.to_path_buf(),
                    ordinal,
                    handle,
                }));
                instance
            })
            .collect())
    }

    /// The drawable for one saved leaf of `path`, if the file still has it.
    pub fn leaf(
        &mut self,
        path: &Path,
        ordinal: usize,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<Option<Drawable>, ImportError> {
        let handles = self.meshes(path, meshes)?;
        Ok(handles.get(ordinal).map(|&handle| {
            Drawable::Imported(ImportedMesh {
                path: path.to_path_buf(),
                ordinal,
                handle,
            })
        }))
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{temp_path, RecordingMeshes};
    use cgmath::vec3;

    /// Writes a two-node model: a root with a lit triangle and a child whose
    /// mesh has an unlit triangle plus a line strip.
    pub(crate) fn write_test_model(name: &str, indices: [u32; 3]) -> PathBuf {
        let gltf_path = temp_path(&format!("{name}.gltf"));
        let bin_path = gltf_path.with_extension("bin");

        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals: [f32; 9] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(bytemuck::cast_slice(&positions));
        bytes.extend_from_slice(bytemuck::cast_slice(&normals));
        bytes.extend_from_slice(bytemuck::cast_slice(&indices));
        std::fs::write(&bin_path, &bytes).unwrap();

        let bin_uri = bin_path.file_name().unwrap().to_string_lossy();
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "children": [1] }}, {{ "mesh": 1 }}],
  "meshes": [
    {{ "primitives": [{{ "attributes": {{ "POSITION": 0, "NORMAL": 1 }}, "indices": 2 }}] }},
    {{ "primitives": [
      {{ "attributes": {{ "POSITION": 0 }}, "indices": 2 }},
      {{ "attributes": {{ "POSITION": 0 }}, "mode": 3 }}
    ] }}
  ],
  "buffers": [{{ "uri": "{bin_uri}", "byteLength": {len} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 72, "byteLength": 12 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }},
    {{ "bufferView": 2, "componentType": 5125, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            len = bytes.len()
        );
        std::fs::write(&gltf_path, json).unwrap();
        gltf_path
    }

    #[test]
    fn walks_parents_before_children_and_skips_non_triangles() {
        let path = write_test_model("walk", [0, 1, 2]);
        let model = load_gltf(&path).unwrap();

        assert_eq!(model.primitives.len(), 2);
        assert_eq!(
            model.primitives[0].vertex_data.normals.as_deref(),
            Some(&[[0.0, 0.0, 1.0]; 3][..])
        );
        assert_eq!(model.primitives[1].vertex_data.normals, None);
        assert_eq!(model.primitives[1].indices, vec![0, 1, 2]);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = temp_path("broken.gltf");
        std::fs::write(&path, "{ this is not a model").unwrap();

        assert!(matches!(load_gltf(&path), Err(ImportError::Parse { .. })));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let path = write_test_model("bad-index", [0, 1, 7]);
        assert!(matches!(
            load_gltf(&path),
            Err(ImportError::IndexOutOfBounds { index: 7, count: 3, .. })
        ));
    }

    #[test]
    fn import_makes_one_instance_per_leaf() {
        let path = write_test_model("import", [0, 1, 2]);
        let mut meshes = RecordingMeshes::default();
        let mut importer = ModelImporter::new();

        let mut template = MeshInstance::new("Suzanne");
        template.position = vec3(1.0, 2.0, 3.0);
        template.material_tag = "glass".into();

        let instances = importer.import(&path, &template, &mut meshes).unwrap();

        let tags: Vec<&str> = instances.iter().map(|i| i.tag.as_str()).collect();
        assert_eq!(tags, vec!["Suzanne0", "Suzanne1"]);
        assert!(instances.iter().all(|i| i.position == template.position));
        assert!(instances.iter().all(|i| i.material_tag == "glass"));
        assert_eq!(meshes.uploads.len(), 2);
        // Second leaf has no normals, so they are zero-filled.
        assert_eq!(meshes.uploads[1].0[3..6], [0.0, 0.0, 0.0]);
        assert_eq!(
            instances[1].drawable,
            Some(Drawable::Imported(ImportedMesh {
                path: path.clone(),
                ordinal: 1,
                handle: MeshHandle { id: 1, index_count: 3 },
            }))
        );
    }

    #[test]
    fn reimporting_reuses_uploaded_meshes() {
        let path = write_test_model("cached", [0, 1, 2]);
        let mut meshes = RecordingMeshes::default();
        let mut importer = ModelImporter::new();
        let template = MeshInstance::new("Teapot");

        let first = importer.import(&path, &template, &mut meshes).unwrap();
        let second = importer.import(&path, &template, &mut meshes).unwrap();

        assert_eq!(first, second);
        assert_eq!(meshes.uploads.len(), 2);
        assert!(importer.is_cached(&path));
    }

    #[test]
    fn failed_upload_imports_nothing() {
        let path = write_test_model("upload-fails", [0, 1, 2]);
        let mut meshes = RecordingMeshes::failing_after(1);
        let mut importer = ModelImporter::new();

        let result = importer.import(&path, &MeshInstance::new("Lucy"), &mut meshes);

        assert!(matches!(result, Err(ImportError::Upload(_))));
        assert!(!importer.is_cached(&path));
    }

    #[test]
    fn leaf_lookup_by_ordinal() {
        let path = write_test_model("leaf", [0, 1, 2]);
        let mut meshes = RecordingMeshes::default();
        let mut importer = ModelImporter::new();

        assert!(importer.leaf(&path, 1, &mut meshes).unwrap().is_some());
        assert_eq!(importer.leaf(&path, 5, &mut meshes).unwrap(), None);
        assert_eq!(meshes.uploads.len(), 2);
    }
}
