//! JSON scene files.
//!
//! Scenes are written as `{ "version": 1, "instances": [...] }`. Older files
//! are a bare array of records without a `kind`; those are rebuilt by
//! looking for known model names and shape names inside each tag.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::KnownModel;
use crate::error::SceneFileError;
use crate::loader::ModelImporter;
use crate::mesh::{Drawable, MeshLibrary, MeshParts, Primitive, PrimitiveShape};
use crate::world::MeshInstance;

pub const SCENE_FORMAT_VERSION: u32 = 1;

/// What a record draws. Records without one are legacy or inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecordKind {
    Primitive {
        shape: PrimitiveShape,
        #[serde(default)]
        parts: MeshParts,
    },
    Imported {
        path: PathBuf,
        /// Leaf ordinal within the model file.
        mesh: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub tag: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub material_tag: String,
    pub texture_tag: String,
    pub uv_scale: [f32; 2],
    pub shader_color: [f32; 4],
    #[serde(default)]
    pub is_rotating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
}

impl InstanceRecord {
    pub fn from_instance(instance: &MeshInstance) -> Self {
        let kind = instance.drawable.as_ref().map(|drawable| match drawable {
            Drawable::Primitive(primitive) => RecordKind::Primitive {
                shape: primitive.shape,
                parts: primitive.parts,
            },
            Drawable::Imported(imported) => RecordKind::Imported {
                path: imported.path.clone(),
                mesh: imported.ordinal,
            },
        });

        Self {
            tag: instance.tag.clone(),
            position: instance.position.into(),
            rotation: instance.rotation.into(),
            scale: instance.scale.into(),
            material_tag: instance.material_tag.clone(),
            texture_tag: instance.texture_tag.clone(),
            uv_scale: instance.uv_scale.into(),
            shader_color: instance.shader_color.into(),
            is_rotating: instance.is_rotating,
            kind,
        }
    }

    /// The record's fields as an instance with no drawable yet.
    fn to_inert_instance(&self) -> MeshInstance {
        MeshInstance {
            tag: self.tag.clone(),
            position: self.position.into(),
            rotation: self.rotation.into(),
            scale: self.scale.into(),
            material_tag: self.material_tag.clone(),
            texture_tag: self.texture_tag.clone(),
            uv_scale: self.uv_scale.into(),
            shader_color: self.shader_color.into(),
            drawable: None,
            is_rotating: self.is_rotating,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneDocument {
    Versioned {
        version: u32,
        instances: Vec<InstanceRecord>,
    },
    Legacy(Vec<InstanceRecord>),
}

impl SceneDocument {
    pub fn into_records(self) -> Vec<InstanceRecord> {
        match self {
            SceneDocument::Versioned { version, instances } => {
                if version > SCENE_FORMAT_VERSION {
                    log::warn!(
                        "Scene file version {} is newer than {}, reading it anyway",
                        version,
                        SCENE_FORMAT_VERSION
                    );
                }
                instances
            }
            SceneDocument::Legacy(instances) => instances,
        }
    }
}

/// Pretty-printed with four-space indentation.
pub fn to_json(instances: &[MeshInstance]) -> Result<String, SceneFileError> {
    let document = SceneDocument::Versioned {
        version: SCENE_FORMAT_VERSION,
        instances: instances.iter().map(InstanceRecord::from_instance).collect(),
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn save(path: &Path, instances: &[MeshInstance]) -> Result<(), SceneFileError> {
    let json = to_json(instances)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn parse(text: &str) -> Result<Vec<InstanceRecord>, SceneFileError> {
    let document: SceneDocument = serde_json::from_str(text)?;
    Ok(document.into_records())
}

pub fn read(path: &Path) -> Result<Vec<InstanceRecord>, SceneFileError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Rebuilds instances from records, in order. Every record yields an
/// instance; ones whose geometry cannot be recovered come back inert.
pub fn restore(
    records: &[InstanceRecord],
    importer: &mut ModelImporter,
    meshes: &mut dyn MeshLibrary,
    models: &[KnownModel],
) -> Vec<MeshInstance> {
    records
        .iter()
        .map(|record| {
            let mut instance = record.to_inert_instance();
            instance.drawable = match &record.kind {
                Some(RecordKind::Primitive { shape, parts }) => Some(Drawable::Primitive(Primitive {
                    shape: *shape,
                    parts: *parts,
                })),
                Some(RecordKind::Imported { path, mesh }) => {
                    imported_leaf(&record.tag, path, *mesh, importer, meshes)
                }
                None => legacy_drawable(&record.tag, importer, meshes, models),
            };
            instance
        })
        .collect()
}

fn imported_leaf(
    tag: &str,
    path: &Path,
    ordinal: usize,
    importer: &mut ModelImporter,
    meshes: &mut dyn MeshLibrary,
) -> Option<Drawable> {
    match importer.leaf(path, ordinal, meshes) {
        Ok(Some(drawable)) => Some(drawable),
        Ok(None) => {
            log::warn!("{:?} has no mesh {}, {:?} will not be drawn", path, ordinal, tag);
            None
        }
        Err(e) => {
            log::error!("Could not restore {:?}: {}", tag, e);
            None
        }
    }
}

/// Known model names are checked before shape names, so "Teapot box" is a
/// teapot.
fn legacy_drawable(
    tag: &str,
    importer: &mut ModelImporter,
    meshes: &mut dyn MeshLibrary,
    models: &[KnownModel],
) -> Option<Drawable> {
    if let Some(model) = models.iter().find(|model| tag.contains(model.name.as_str())) {
        return imported_leaf(tag, &model.path, trailing_ordinal(tag), importer, meshes);
    }

    if let Some(shape) = PrimitiveShape::find_in_tag(tag) {
        return Some(Drawable::Primitive(Primitive {
            shape,
            parts: MeshParts::ALL,
        }));
    }

    log::debug!("{:?} matches no known shape or model, restoring it inert", tag);
    None
}

/// Imported tags end in their leaf ordinal ("Suzanne2"); no digits means 0.
fn trailing_ordinal(tag: &str) -> usize {
    let stem = tag.trim_end_matches(|c: char| c.is_ascii_digit());
    tag[stem.len()..].parse().unwrap_or(0)
}
