//! Editor configuration, read from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::textures::TextureSpec;

/// How fast rotating instances turn about Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSpeed {
    /// Fixed step every frame, so the speed follows the frame rate.
    PerFrame(f32),
    PerSecond(f32),
}

impl RotationSpeed {
    pub fn degrees_for_frame(self, delta_seconds: f32) -> f32 {
        match self {
            RotationSpeed::PerFrame(degrees) => degrees,
            RotationSpeed::PerSecond(degrees) => degrees * delta_seconds,
        }
    }
}

impl Default for RotationSpeed {
    fn default() -> Self {
        RotationSpeed::PerFrame(0.2)
    }
}

/// A point light as the fragment shader's `lightSources[]` expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSource {
    pub position: [f32; 3],
    pub ambient_color: [f32; 3],
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub focal_strength: f32,
    pub specular_intensity: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            ambient_color: [0.0; 3],
            diffuse_color: [0.0; 3],
            specular_color: [0.0; 3],
            focal_strength: 0.0,
            specular_intensity: 0.0,
        }
    }
}

/// A model the editor can import by name. Scene files written before
/// records carried a kind are matched against these names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownModel {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees; -90 looks down -Z.
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse drag.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 5.5, 14.0],
            yaw: -90.0,
            pitch: -10.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_title: String,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Where Save and Load go when no path is given.
    pub scene_file: PathBuf,
    pub rotation: RotationSpeed,
    pub camera: CameraConfig,
    /// Loaded in order; the n-th texture that loads gets slot n.
    pub textures: Vec<TextureSpec>,
    pub models: Vec<KnownModel>,
    pub lights: Vec<LightSource>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_title: "Credenza".to_string(),
            vertex_shader: PathBuf::from("shaders/vertex.glsl"),
            fragment_shader: PathBuf::from("shaders/fragment.glsl"),
            scene_file: PathBuf::from("scene.json"),
            rotation: RotationSpeed::default(),
            camera: CameraConfig::default(),
            textures: default_textures(),
            models: default_models(),
            lights: default_lights(),
        }
    }
}

fn default_textures() -> Vec<TextureSpec> {
    [
        ("hardwood.jpg", "floor"),
        ("gold-seamless-texture.jpg", "knobs"),
        ("ornate_wood.png", "doors"),
        ("rusticwood.jpg", "credenza"),
        ("stucco_wall.jpg", "backdrop"),
        ("picture_frame.jpg", "picture frame"),
        ("glass_texture1.png", "candle holders"),
        ("glass_texture2.png", "vase"),
        ("stainless.jpg", "stainless"),
    ]
    .into_iter()
    .map(|(file, tag)| TextureSpec {
        path: Path::new("assets/textures").join(file),
        tag: tag.to_string(),
    })
    .collect()
}

fn default_models() -> Vec<KnownModel> {
    [
        ("Stanford Bunny", "bunny.glb"),
        ("Lucy", "lucy.glb"),
        ("Suzanne", "suzanne.glb"),
        ("Teapot", "teapot.glb"),
    ]
    .into_iter()
    .map(|(name, file)| KnownModel {
        name: name.to_string(),
        path: Path::new("assets/models").join(file),
    })
    .collect()
}

fn default_lights() -> Vec<LightSource> {
    vec![
        LightSource {
            position: [-50.0, 30.0, 0.0],
            ambient_color: [0.1, 0.1, 0.01],
            focal_strength: 10.0,
            specular_intensity: 0.1,
            ..LightSource::default()
        },
        LightSource {
            position: [0.0, 8.0, 15.0],
            ambient_color: [0.1, 0.1, 0.01],
            diffuse_color: [0.5, 0.5, 0.5],
            specular_color: [0.2, 0.2, 0.2],
            focal_strength: 5.0,
            specular_intensity: 0.1,
        },
        LightSource {
            position: [50.0, 30.0, 0.0],
            diffuse_color: [0.5, 0.5, 0.5],
            focal_strength: 10.0,
            specular_intensity: 0.1,
            ..LightSource::default()
        },
    ]
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => {
                let config = Self::load(path)?;
                log::info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            Some(path) => {
                log::info!("No configuration at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_model(&self, name: &str) -> Option<&KnownModel> {
        self.models.iter().find(|model| model.name == name)
    }
}
