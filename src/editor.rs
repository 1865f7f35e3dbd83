use std::path::{Path, PathBuf};

use cgmath::Vector3;

use crate::commands::EditorCommand;
use crate::config::EditorConfig;
use crate::environment::draw_environment;
use crate::error::{ImportError, SceneFileError};
use crate::loader::ModelImporter;
use crate::material::MaterialRegistry;
use crate::mesh::{Drawable, MeshLibrary, PrimitiveShape};
use crate::renderer::Renderer;
use crate::scene_file;
use crate::shaders::{self, ShaderBackend, MAX_LIGHTS};
use crate::textures::{TextureBackend, TextureRegistry};
use crate::world::{MeshInstance, SceneGraph};

/// Everything the editor knows about the scene. Built once, then handed to
/// the frame loop by reference.
pub struct Editor {
    config: EditorConfig,
    textures: TextureRegistry,
    materials: MaterialRegistry,
    scene: SceneGraph,
    importer: ModelImporter,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::new(),
            scene: SceneGraph::new(),
            importer: ModelImporter::new(),
        }
    }

    /// Loads and binds textures, defines materials and pushes the lights.
    /// Must run once, with a current GL context, before the first frame.
    pub fn prepare(&mut self, shader: &mut dyn ShaderBackend, textures: &mut dyn TextureBackend) {
        let loaded = self.textures.load_all(textures, &self.config.textures);
        if loaded < self.config.textures.len() {
            log::warn!(
                "Only {} of {} textures loaded",
                loaded,
                self.config.textures.len()
            );
        }
        self.textures.bind_all(textures);
        self.materials.define_all();

        shader.use_program();
        self.setup_lights(shader);
    }

    pub fn setup_lights(&self, shader: &mut dyn ShaderBackend) {
        shader.set_bool(shaders::USE_LIGHTING, true);

        if self.config.lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights configured, only the first {} are used",
                self.config.lights.len(),
                MAX_LIGHTS
            );
        }
        for (i, light) in self.config.lights.iter().take(MAX_LIGHTS).enumerate() {
            let name = |field: &str| shaders::light_uniform(i, field);
            shader.set_vec3(&name("position"), Vector3::from(light.position));
            shader.set_vec3(&name("ambientColor"), Vector3::from(light.ambient_color));
            shader.set_vec3(&name("diffuseColor"), Vector3::from(light.diffuse_color));
            shader.set_vec3(&name("specularColor"), Vector3::from(light.specular_color));
            shader.set_float(&name("focalStrength"), light.focal_strength);
            shader.set_float(&name("specularIntensity"), light.specular_intensity);
        }
    }

    /// Draws the furniture, then every instance in order. Rotating instances
    /// are turned just before they are drawn.
    pub fn render_frame(
        &mut self,
        shader: &mut dyn ShaderBackend,
        meshes: &mut dyn MeshLibrary,
        delta_seconds: f32,
    ) {
        let step = self.config.rotation.degrees_for_frame(delta_seconds);
        let mut renderer = Renderer::new(shader, meshes, &self.textures, &self.materials);

        draw_environment(&mut renderer);

        for instance in self.scene.iter_mut() {
            if instance.is_rotating {
                instance.advance_rotation(step);
            }
            renderer.draw_instance(instance);
        }
    }

    pub fn add_primitive(&mut self, shape: PrimitiveShape) -> usize {
        let index = self.scene.add_instance(MeshInstance::primitive(shape));
        log::info!("Added {} at index {}", shape.tag(), index);
        index
    }

    /// Negative and out-of-range indices leave the scene alone.
    pub fn remove_instance(&mut self, index: i64) -> Option<MeshInstance> {
        let index = usize::try_from(index).ok()?;
        self.scene.remove_instance(index)
    }

    /// Imports one of the configured models at the origin, tagged with its
    /// name. Returns how many instances were added.
    pub fn import_known_model(
        &mut self,
        name: &str,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<usize, ImportError> {
        let model = self
            .config
            .find_model(name)
            .ok_or_else(|| ImportError::UnknownModel(name.to_string()))?;
        let path = model.path.clone();
        self.import_model(&path, &MeshInstance::new(name), meshes)
    }

    /// Adds one instance per mesh in the file, or nothing if any of them
    /// fails to load.
    pub fn import_model(
        &mut self,
        path: &Path,
        template: &MeshInstance,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<usize, ImportError> {
        let instances = self.importer.import(path, template, meshes)?;
        let count = instances.len();
        for instance in instances {
            self.scene.add_instance(instance);
        }
        Ok(count)
    }

    pub fn save_scene(&self, path: Option<&Path>) -> Result<PathBuf, SceneFileError> {
        let path = path.unwrap_or(self.config.scene_file.as_path()).to_path_buf();
        scene_file::save(&path, self.scene.instances())?;
        log::info!("Saved {} instances to {:?}", self.scene.count(), path);
        Ok(path)
    }

    /// Replaces the scene with the file's contents. If the file cannot be
    /// read or parsed the current scene is kept as it is.
    pub fn load_scene(
        &mut self,
        path: Option<&Path>,
        meshes: &mut dyn MeshLibrary,
    ) -> Result<usize, SceneFileError> {
        let path = path.unwrap_or(self.config.scene_file.as_path()).to_path_buf();
        let records = scene_file::read(&path)?;
        let instances =
            scene_file::restore(&records, &mut self.importer, meshes, &self.config.models);

        let count = instances.len();
        self.scene.replace_all(instances);
        log::info!("Loaded {} instances from {:?}", count, path);
        Ok(count)
    }

    /// Runs a queued command and returns a line for the console.
    pub fn apply(&mut self, command: EditorCommand, meshes: &mut dyn MeshLibrary) -> String {
        match command {
            EditorCommand::AddPrimitive(shape) => {
                let index = self.add_primitive(shape);
                format!("Added {} at index {}", shape.tag(), index)
            }
            EditorCommand::Remove(index) => match self.remove_instance(index) {
                Some(removed) => format!("Removed {} from index {}", removed.tag, index),
                None => format!("No instance at index {}", index),
            },
            EditorCommand::ImportModel(name) => match self.import_known_model(&name, meshes) {
                Ok(count) => format!("Imported {} meshes of {}", count, name),
                Err(e) => {
                    log::error!("Import of {:?} failed: {}", name, e);
                    format!("Import failed: {}", e)
                }
            },
            EditorCommand::Save(path) => match self.save_scene(path.as_deref()) {
                Ok(path) => format!("Saved scene to {}", path.display()),
                Err(e) => {
                    log::error!("Saving the scene failed: {}", e);
                    format!("Save failed: {}", e)
                }
            },
            EditorCommand::Load(path) => match self.load_scene(path.as_deref(), meshes) {
                Ok(count) => format!("Loaded {} instances", count),
                Err(e) => {
                    log::error!("Loading the scene failed: {}", e);
                    format!("Load failed: {}", e)
                }
            },
            EditorCommand::SetRotating { index, rotating } => match self.scene.get_mut(index) {
                Ok(instance) => {
                    instance.is_rotating = rotating;
                    format!(
                        "{} {} rotating",
                        instance.tag,
                        if rotating { "is" } else { "stopped" }
                    )
                }
                Err(e) => e.to_string(),
            },
            EditorCommand::List => {
                if self.scene.is_empty() {
                    return "The scene is empty".to_string();
                }
                self.scene
                    .iter()
                    .enumerate()
                    .map(|(i, instance)| format!("{}: {} ({})", i, instance.tag, describe(instance)))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            EditorCommand::Echo(text) => text,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }
}

fn describe(instance: &MeshInstance) -> String {
    match &instance.drawable {
        Some(Drawable::Primitive(primitive)) => primitive.shape.label().to_string(),
        Some(Drawable::Imported(imported)) => {
            format!("mesh {} of {}", imported.ordinal, imported.path.display())
        }
        None => "not drawn".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KnownModel;
    use crate::environment::ENVIRONMENT;
    use crate::loader::tests::write_test_model;
    use crate::testing::{
        temp_path, write_test_image, FakeTextures, RecordingMeshes, RecordingShader, Uniform,
    };
    use crate::textures::TextureSpec;
    use approx::assert_abs_diff_eq;
    use cgmath::vec3;

    fn editor_with(shapes: &[PrimitiveShape]) -> Editor {
        let mut editor = Editor::new(EditorConfig {
            textures: Vec::new(),
            ..EditorConfig::default()
        });
        for &shape in shapes {
            editor.add_primitive(shape);
        }
        editor
    }

    fn three() -> Editor {
        editor_with(&[PrimitiveShape::Box, PrimitiveShape::Cone, PrimitiveShape::Sphere])
    }

    #[test]
    fn removal_bounds() {
        let mut editor = three();
        let mut meshes = RecordingMeshes::default();

        editor.apply(EditorCommand::Remove(-1), &mut meshes);
        assert_eq!(editor.scene().count(), 3);

        editor.apply(EditorCommand::Remove(3), &mut meshes);
        assert_eq!(editor.scene().count(), 3);

        let message = editor.apply(EditorCommand::Remove(2), &mut meshes);
        assert_eq!(message, "Removed sphere from index 2");
        assert_eq!(editor.scene().count(), 2);

        editor.apply(EditorCommand::Remove(0), &mut meshes);
        assert_eq!(editor.scene().get(0).map(|i| i.tag.as_str()), Ok("cone"));
    }

    #[test]
    fn prepare_loads_textures_materials_and_lights() {
        let floor = temp_path("floor.png");
        write_test_image(&floor, 3);
        let mut editor = Editor::new(EditorConfig {
            textures: vec![
                TextureSpec { path: floor, tag: "floor".into() },
                TextureSpec { path: temp_path("missing.png"), tag: "knobs".into() },
            ],
            ..EditorConfig::default()
        });
        let mut shader = RecordingShader::default();
        let mut backend = FakeTextures::default();

        editor.prepare(&mut shader, &mut backend);

        assert_eq!(editor.textures().find_slot("floor"), Some(0));
        assert_eq!(editor.textures().find_slot("knobs"), None);
        assert_eq!(backend.bound.len(), 1);
        assert!(editor.materials().find("woodNoShine").is_some());
        assert_eq!(shader.uses, 1);
        assert_eq!(shader.value("bUseLighting"), Some(&Uniform::Bool(true)));
        assert_eq!(
            shader.value("lightSources[1].position"),
            Some(&Uniform::Vec3(vec3(0.0, 8.0, 15.0)))
        );
        assert_eq!(
            shader.value("lightSources[2].focalStrength"),
            Some(&Uniform::Float(10.0))
        );
        assert_eq!(shader.value("lightSources[3].position"), None);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let mut config = EditorConfig::default();
        config.lights = vec![config.lights[0].clone(); MAX_LIGHTS + 2];
        let editor = Editor::new(config);
        let mut shader = RecordingShader::default();

        editor.setup_lights(&mut shader);

        assert_eq!(shader.writes_to("lightSources[3].position"), 1);
        assert_eq!(shader.writes_to("lightSources[4].position"), 0);
    }

    #[test]
    fn frame_draws_furniture_then_scene() {
        let mut editor = three();
        editor.scene_mut().add_instance(MeshInstance::new("inert"));
        let mut shader = RecordingShader::default();
        let mut meshes = RecordingMeshes::default();

        editor.render_frame(&mut shader, &mut meshes, 1.0 / 60.0);

        assert_eq!(meshes.draws.len(), ENVIRONMENT.len() + 3);
        assert_eq!(shader.writes_to("model"), ENVIRONMENT.len() + 4);
    }

    #[test]
    fn rotating_instances_wrap_each_frame() {
        let mut editor = editor_with(&[PrimitiveShape::Torus, PrimitiveShape::Box]);
        {
            let spinning = editor.scene_mut().get_mut(0).unwrap();
            spinning.is_rotating = true;
            spinning.rotation.y = 359.9;
        }
        let mut shader = RecordingShader::default();
        let mut meshes = RecordingMeshes::default();

        editor.render_frame(&mut shader, &mut meshes, 1.0 / 30.0);

        assert_abs_diff_eq!(editor.scene().get(0).unwrap().rotation.y, 0.1, epsilon = 1e-3);
        assert_eq!(editor.scene().get(1).unwrap().rotation.y, 0.0);
    }

    #[test]
    fn failed_load_keeps_the_scene() {
        let mut editor = three();
        let mut meshes = RecordingMeshes::default();

        let missing = temp_path("no-scene.json");
        assert!(editor.load_scene(Some(&missing), &mut meshes).is_err());
        assert_eq!(editor.scene().count(), 3);

        let broken = temp_path("broken-scene.json");
        std::fs::write(&broken, "[{\"tag\": \"box\"").unwrap();
        let message = editor.apply(EditorCommand::Load(Some(broken)), &mut meshes);
        assert!(message.starts_with("Load failed"));
        assert_eq!(editor.scene().count(), 3);
    }

    #[test]
    fn save_and_load_through_commands() {
        let path = temp_path("commands-scene.json");
        let mut editor = three();
        let mut meshes = RecordingMeshes::default();
        editor.scene_mut().get_mut(1).unwrap().position = vec3(0.5, 1.0, 2.0);

        editor.apply(EditorCommand::Save(Some(path.clone())), &mut meshes);
        let saved: Vec<MeshInstance> = editor.scene().instances().to_vec();

        editor.apply(EditorCommand::Remove(0), &mut meshes);
        editor.apply(EditorCommand::Load(Some(path)), &mut meshes);

        assert_eq!(editor.scene().instances(), &saved[..]);
    }

    #[test]
    fn import_is_all_or_nothing() {
        let model = write_test_model("editor-import", [0, 1, 2]);
        let mut editor = Editor::new(EditorConfig {
            textures: Vec::new(),
            models: vec![KnownModel {
                name: "Teapot".into(),
                path: model,
            }],
            ..EditorConfig::default()
        });

        let mut failing = RecordingMeshes::failing_after(1);
        let message = editor.apply(EditorCommand::ImportModel("Teapot".into()), &mut failing);
        assert!(message.starts_with("Import failed"));
        assert!(editor.scene().is_empty());

        let mut meshes = RecordingMeshes::default();
        assert_eq!(editor.import_known_model("Teapot", &mut meshes).unwrap(), 2);
        let tags: Vec<&str> = editor.scene().iter().map(|i| i.tag.as_str()).collect();
        assert_eq!(tags, vec!["Teapot0", "Teapot1"]);
    }

    #[test]
    fn unknown_models_are_reported() {
        let mut editor = three();
        let mut meshes = RecordingMeshes::default();
        assert!(matches!(
            editor.import_known_model("Utah Gnome", &mut meshes),
            Err(ImportError::UnknownModel(_))
        ));
        assert_eq!(editor.scene().count(), 3);
    }

    #[test]
    fn rotate_and_list() {
        let mut editor = three();
        let mut meshes = RecordingMeshes::default();

        editor.apply(EditorCommand::SetRotating { index: 1, rotating: true }, &mut meshes);
        assert!(editor.scene().get(1).unwrap().is_rotating);

        let message = editor.apply(EditorCommand::SetRotating { index: 9, rotating: true }, &mut meshes);
        assert!(message.contains("out of range"));

        let listing = editor.apply(EditorCommand::List, &mut meshes);
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.starts_with("0: box (Box)"));
    }
}
