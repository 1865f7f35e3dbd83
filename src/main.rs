use std::ffi::CString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context as _};
use clap::{value_parser, Arg, Command};
use egui_glow::Painter;
use egui_winit::State as EguiState;
use glow::HasContext;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use credenza::camera::PerspectiveCamera;
use credenza::commands::CommandQueue;
use credenza::config::EditorConfig;
use credenza::editor::Editor;
use credenza::opengl::{GlMeshLibrary, GlShaderProgram, GlTextures};
use credenza::shaders::ShaderBackend;

mod gui;
use gui::Gui;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

struct Timer {
    last_frame: Instant,
    delta_time: f32,
}

impl Timer {
    fn new() -> Timer {
        Timer {
            last_frame: Instant::now(),
            delta_time: 0.0,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }
}

/// Everything that only exists while there is a window and a GL context.
struct Session {
    window: Window,
    current_context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    gl: Arc<glow::Context>,

    egui_context: egui::Context,
    egui_painter: Painter,
    egui_state: EguiState,
    gui: Gui,

    editor: Editor,
    queue: CommandQueue,
    camera: PerspectiveCamera,
    shader: GlShaderProgram,
    meshes: GlMeshLibrary,
    textures: GlTextures,
    timer: Timer,
}

fn display_preference(window: &Window) -> anyhow::Result<DisplayApiPreference> {
    #[cfg(target_os = "windows")]
    {
        let window_handle = window.window_handle()?;
        Ok(DisplayApiPreference::Wgl(Some(window_handle.into())))
    }
    #[cfg(target_os = "macos")]
    {
        let _ = window;
        Ok(DisplayApiPreference::Cgl)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let _ = window;
        Ok(DisplayApiPreference::Egl)
    }
}

impl Session {
    fn create(
        event_loop: &ActiveEventLoop,
        config: EditorConfig,
        initial_scene: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let window = event_loop
            .create_window(Window::default_attributes().with_title(config.window_title.as_str()))
            .context("Failed to create the window")?;

        // Get platform-specific handles to the display and window
        let display_handle = window.display_handle()?;
        let window_handle = window.window_handle()?;

        let display = unsafe {
            Display::new(display_handle.into(), display_preference(&window)?)
                .context("Failed to create the GL display")?
        };

        let config_template = ConfigTemplateBuilder::new().with_depth_size(24).build();
        let gl_config = unsafe {
            display
                .find_configs(config_template)?
                .next()
                .ok_or_else(|| anyhow!("No GL config with a depth buffer is available"))?
        };

        let physical_size = window.inner_size();
        let width = NonZeroU32::new(physical_size.width.max(1)).unwrap_or(NonZeroU32::MIN);
        let height = NonZeroU32::new(physical_size.height.max(1)).unwrap_or(NonZeroU32::MIN);

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window_handle.into(),
            width,
            height,
        );
        let context_attributes = ContextAttributesBuilder::new().build(Some(window_handle.into()));

        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes)? };
        let non_current_context = unsafe { display.create_context(&gl_config, &context_attributes)? };
        let current_context = non_current_context.make_current(&surface)?;

        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function(|s| match CString::new(s) {
                Ok(c_str) => display.get_proc_address(&c_str) as *const _,
                Err(_) => std::ptr::null(),
            }))
        };

        let egui_context = egui::Context::default();
        let egui_painter = Painter::new(gl.clone(), "", None, false)
            .map_err(|e| anyhow!("Failed to create the egui painter: {}", e))?;
        let egui_state = EguiState::new(
            egui_context.clone(),
            egui_context.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let mut shader =
            GlShaderProgram::from_files(gl.clone(), &config.vertex_shader, &config.fragment_shader)?;
        let mut meshes = GlMeshLibrary::new(gl.clone())?;
        let mut textures = GlTextures::new(gl.clone());

        let aspect_ratio = width.get() as f32 / height.get() as f32;
        let camera = PerspectiveCamera::from_config(&config.camera, aspect_ratio);

        let queue = CommandQueue::new();
        let gui = Gui::new(
            queue.sender(),
            config.scene_file.to_string_lossy().into_owned(),
        );

        let mut editor = Editor::new(config);
        editor.prepare(&mut shader, &mut textures);

        if let Some(path) = initial_scene {
            if let Err(e) = editor.load_scene(Some(&path), &mut meshes) {
                log::error!("Could not load scene {:?}: {}", path, e);
            }
        }

        Ok(Self {
            window,
            current_context,
            surface,
            gl,

            egui_context,
            egui_painter,
            egui_state,
            gui,

            editor,
            queue,
            camera,
            shader,
            meshes,
            textures,
            timer: Timer::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.current_context, width, height);
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        self.timer.update();
        let delta_time = self.timer.delta_time;

        for command in self.queue.drain() {
            let line = self.editor.apply(command, &mut self.meshes);
            self.gui.append_terminal(line);
        }

        unsafe {
            let [r, g, b, a] = CLEAR_COLOR;
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        // Run the UI code
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.gui.update(
            raw_input,
            &self.egui_context,
            &mut self.editor,
            &mut self.camera,
            delta_time,
        );
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let clipped_primitives = self
            .egui_context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let physical_size = self.window.inner_size();
        self.egui_painter.paint_and_update_textures(
            [physical_size.width, physical_size.height],
            full_output.pixels_per_point,
            &clipped_primitives,
            &full_output.textures_delta,
        );

        if let Some(viewport) = self.gui.viewport(physical_size.height) {
            if let Some(aspect_ratio) = viewport.aspect_ratio() {
                self.camera.set_aspect_ratio(aspect_ratio);
            }
            self.render_scene(viewport);
        }

        self.surface.swap_buffers(&self.current_context)?;
        self.window.request_redraw();
        Ok(())
    }

    fn render_scene(&mut self, viewport: credenza::viewport::Viewport) {
        let gl = &self.gl;
        unsafe {
            // Makes sure that everything is renderered in the central panel of the ui
            gl.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::BLEND);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.clear(glow::DEPTH_BUFFER_BIT);
            if self.gui.wireframe() {
                gl.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
            }
        }

        self.shader.use_program();
        // The egui painter rebinds texture unit 0 every frame.
        self.editor.textures().bind_all(&mut self.textures);
        self.camera.apply(&mut self.shader);
        self.editor
            .render_frame(&mut self.shader, &mut self.meshes, self.timer.delta_time);

        unsafe {
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
            gl.disable(glow::DEPTH_TEST);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.egui_painter.destroy();
        self.meshes.destroy();
        self.textures.destroy();
        self.shader.destroy();
    }
}

struct App {
    config: Option<EditorConfig>,
    initial_scene: Option<PathBuf>,
    session: Option<Session>,
    error: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };
        match Session::create(event_loop, config, self.initial_scene.take()) {
            Ok(session) => self.session = Some(session),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // give egui any winit events
        let _ = session.egui_state.on_window_event(&session.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => session.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if let Err(e) = session.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session = None;
    }
}

fn cli() -> Command {
    Command::new("credenza")
        .about("Interactive 3D scene editor")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .default_value("credenza.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration file"),
        )
        .arg(
            Arg::new("scene")
                .long("scene")
                .short('s')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Scene file to load at startup"),
        )
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config");
    let config = EditorConfig::load_or_default(config_path.map(PathBuf::as_path))
        .context("Could not read the editor configuration")?;

    let event_loop = EventLoop::new()?;
    // ControlFlow::Wait pauses the event loop if no events are available to process.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        config: Some(config),
        initial_scene: matches.get_one::<PathBuf>("scene").cloned(),
        session: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
