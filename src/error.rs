use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a graphics backend (buffer/texture creation, etc).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("could not load image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path:?} has {channels} channels, only RGB and RGBA images are supported")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error("all {capacity} texture slots are taken, cannot register {tag:?}")]
    CapacityExceeded { tag: String, capacity: usize },

    #[error("texture upload failed: {0}")]
    Upload(#[from] BackendError),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not parse model {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model {0:?} contains no triangle meshes")]
    NoMeshes(PathBuf),

    #[error("mesh {mesh} of model {path:?} has no vertex positions")]
    MissingPositions { path: PathBuf, mesh: usize },

    #[error("mesh {mesh} of model {path:?} references vertex {index} but only has {count}")]
    IndexOutOfBounds {
        path: PathBuf,
        mesh: usize,
        index: u32,
        count: usize,
    },

    #[error("no known model is called {0:?}")]
    UnknownModel(String),

    #[error("mesh upload failed: {0}")]
    Upload(#[from] BackendError),
}

#[derive(Error, Debug)]
pub enum SceneFileError {
    #[error("scene file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("instance index {index} is out of range, the scene holds {len} instances")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum GlError {
    #[error("failed to create {what}: {message}")]
    Create { what: &'static str, message: String },

    #[error("could not read shader source {path:?}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error compiling shader {path:?}: {log}")]
    Compile { path: PathBuf, log: String },

    #[error("shader link error: {0}")]
    Link(String),
}

impl From<GlError> for BackendError {
    fn from(error: GlError) -> Self {
        BackendError(error.to_string())
    }
}
