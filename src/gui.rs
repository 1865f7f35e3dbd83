use std::collections::VecDeque;
use std::time::{Duration, Instant};

use cgmath::Vector3;
use crossbeam_channel::Sender;
use egui::{Align, Key, Layout, PointerButton, ScrollArea, TextEdit};

use credenza::camera::{Movement, PerspectiveCamera};
use credenza::commands::{parse_console_command, EditorCommand};
use credenza::editor::Editor;
use credenza::mesh::PrimitiveShape;
use credenza::viewport::Viewport;

const MAX_TERMINAL_LINES: usize = 100;

/// Three drag values laid out right to left after a label.
fn vector_row(ui: &mut egui::Ui, label: &str, value: &mut Vector3<f32>, speed: f64) {
    ui.horizontal(|ui| {
        ui.label(label);
        // Adds space between the text and inputs
        ui.allocate_ui_with_layout(
            ui.available_size(),
            Layout::right_to_left(Align::Center),
            |ui| {
                // The inputs are in the reverse order
                ui.add(egui::DragValue::new(&mut value.z).speed(speed));
                ui.add(egui::DragValue::new(&mut value.y).speed(speed));
                ui.add(egui::DragValue::new(&mut value.x).speed(speed));
            },
        );
    });
}

fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.allocate_ui_with_layout(
            ui.available_size(),
            Layout::right_to_left(Align::Center),
            |ui| {
                ui.text_edit_singleline(value);
            },
        );
    });
}

pub struct Gui {
    commands: Sender<EditorCommand>,

    wireframe: bool,
    scene_path: String,
    selected: Option<usize>,

    terminal_input: String,
    terminal_lines: VecDeque<String>,

    viewport: Option<Viewport>,

    frame_count: u32,
    accumulator: Duration,
    last_frame_time: Instant,
    fps: u32,
}

impl Gui {
    pub fn new(commands: Sender<EditorCommand>, scene_path: String) -> Self {
        Self {
            commands,

            wireframe: false,
            scene_path,
            selected: None,

            terminal_input: String::new(),
            terminal_lines: VecDeque::new(),

            viewport: None,

            frame_count: 0,
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            fps: 0,
        }
    }

    pub fn append_terminal(&mut self, text: impl Into<String>) {
        for line in text.into().lines() {
            self.terminal_lines.push_back(line.to_string());
        }
        while self.terminal_lines.len() > MAX_TERMINAL_LINES {
            self.terminal_lines.pop_front();
        }
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// The central panel in GL coordinates, once the UI has been laid out.
    pub fn viewport(&self, window_height: u32) -> Option<Viewport> {
        self.viewport
            .map(|viewport| viewport.flipped(window_height as i32))
    }

    fn send(&mut self, command: EditorCommand) {
        if self.commands.send(command).is_err() {
            self.append_terminal("The editor is no longer accepting commands");
        }
    }

    fn update_fps(&mut self) {
        let now = Instant::now();
        self.accumulator += now - self.last_frame_time;
        self.last_frame_time = now;
        self.frame_count += 1;

        // If 0.1 seconds have passed then update the fps indicator
        if self.accumulator >= Duration::from_secs_f32(0.1) {
            self.fps = (self.frame_count as f32 / self.accumulator.as_secs_f32()) as u32;
            self.accumulator = Duration::ZERO;
            self.frame_count = 0;
        }
    }

    pub fn update(
        &mut self,
        raw_input: egui::RawInput,
        ctx: &egui::Context,
        editor: &mut Editor,
        camera: &mut PerspectiveCamera,
        delta_time: f32,
    ) -> egui::FullOutput {
        self.update_fps();

        ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("Toolbar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Scene file");
                    ui.add(TextEdit::singleline(&mut self.scene_path).desired_width(220.0));
                    if ui.button("Save").clicked() {
                        let path = self.scene_path.trim().into();
                        self.send(EditorCommand::Save(Some(path)));
                    }
                    if ui.button("Load").clicked() {
                        let path = self.scene_path.trim().into();
                        self.send(EditorCommand::Load(Some(path)));
                        self.selected = None;
                    }
                    ui.separator();
                    ui.checkbox(&mut self.wireframe, "Wireframe");
                    ui.allocate_ui_with_layout(
                        ui.available_size(),
                        Layout::right_to_left(Align::Center),
                        |ui| {
                            ui.label(format!("FPS: {}", self.fps));
                        },
                    );
                });
            });

            egui::SidePanel::left("Scene Objects")
                .min_width(170.0)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.collapsing("Add Primitive", |ui| {
                        for shape in PrimitiveShape::ALL {
                            if ui.button(shape.label()).clicked() {
                                self.send(EditorCommand::AddPrimitive(shape));
                            }
                        }
                    });

                    ui.collapsing("Import Model", |ui| {
                        for model in &editor.config().models {
                            if ui.button(model.name.as_str()).clicked() {
                                self.send(EditorCommand::ImportModel(model.name.clone()));
                            }
                        }
                    });

                    ui.separator();
                    ui.heading(format!("Instances ({})", editor.scene().count()));

                    ScrollArea::vertical().show(ui, |ui| {
                        for (i, instance) in editor.scene().iter().enumerate() {
                            let label = format!("{}: {}", i, instance.tag);
                            if ui.selectable_label(self.selected == Some(i), label).clicked() {
                                self.selected = Some(i);
                            }
                        }
                    });
                });

            egui::SidePanel::right("Properties")
                .min_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    let Some(index) = self.selected else {
                        ui.label("No object selected");
                        return;
                    };
                    let Ok(instance) = editor.scene_mut().get_mut(index) else {
                        self.selected = None;
                        ui.label("No object selected");
                        return;
                    };

                    ui.label(format!("Selected instance: {}", index));
                    text_row(ui, "Tag", &mut instance.tag);

                    ui.heading("Transform");
                    vector_row(ui, "Translate", &mut instance.position, 0.05);
                    vector_row(ui, "Rotate", &mut instance.rotation, 1.0);
                    vector_row(ui, "Scale", &mut instance.scale, 0.01);

                    ui.heading("Shading");
                    text_row(ui, "Material", &mut instance.material_tag);
                    text_row(ui, "Texture", &mut instance.texture_tag);
                    ui.horizontal(|ui| {
                        ui.label("UV Scale");
                        ui.allocate_ui_with_layout(
                            ui.available_size(),
                            Layout::right_to_left(Align::Center),
                            |ui| {
                                ui.add(egui::DragValue::new(&mut instance.uv_scale.y).speed(0.05));
                                ui.add(egui::DragValue::new(&mut instance.uv_scale.x).speed(0.05));
                            },
                        );
                    });
                    ui.horizontal(|ui| {
                        ui.label("Color");
                        let mut rgba: [f32; 4] = instance.shader_color.into();
                        if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
                            instance.shader_color = rgba.into();
                        }
                    });
                    ui.checkbox(&mut instance.is_rotating, "Rotating");

                    ui.separator();
                    if ui.button("Delete").clicked() {
                        self.selected = None;
                        self.send(EditorCommand::Remove(index as i64));
                    }
                });

            egui::TopBottomPanel::bottom("Console")
                .min_height(105.0)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.label("Console");
                    ui.separator();

                    // Output area: scrollable multiline, read-only
                    ScrollArea::vertical()
                        .max_height(100.0)
                        .auto_shrink([false; 2])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            for line in &self.terminal_lines {
                                ui.monospace(line);
                            }
                        });

                    let enter_pressed = ui
                        .add(TextEdit::singleline(&mut self.terminal_input).hint_text("Enter command"))
                        .lost_focus()
                        && ui.input(|i| i.key_pressed(Key::Enter));

                    if enter_pressed {
                        let line = std::mem::take(&mut self.terminal_input);
                        let line = line.trim();
                        if !line.is_empty() {
                            self.append_terminal(format!("> {}", line));
                            match parse_console_command(line) {
                                Ok(command) => self.send(command),
                                Err(message) => self.append_terminal(message),
                            }
                        }
                    }

                    // To allow for resizing
                    ui.allocate_space(ui.available_size());
                });

            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    let rect = ui.max_rect();
                    let typing = ctx.wants_keyboard_input();

                    ui.input(|input| {
                        let dragging = input.pointer.button_down(PointerButton::Primary)
                            && input
                                .pointer
                                .press_origin()
                                .is_some_and(|origin| rect.contains(origin));
                        match input.pointer.hover_pos() {
                            Some(pos) if dragging => camera.drag_to(pos),
                            _ => camera.release(),
                        }

                        if typing {
                            return;
                        }
                        let bindings = [
                            (Key::W, Movement::Forward),
                            (Key::S, Movement::Backward),
                            (Key::A, Movement::Left),
                            (Key::D, Movement::Right),
                            (Key::Space, Movement::Up),
                            (Key::ArrowDown, Movement::Down),
                        ];
                        for (key, movement) in bindings {
                            if input.key_down(key) {
                                camera.move_camera(movement, delta_time);
                            }
                        }
                    });

                    let (x, y) = rect.min.into();
                    let (width, height) = rect.size().into();
                    let pixels_per_point = ctx.pixels_per_point();

                    // Set the viewport which the scene will render in
                    self.viewport = Some(Viewport::new(
                        (x * pixels_per_point) as i32,
                        (y * pixels_per_point) as i32,
                        (width * pixels_per_point) as i32,
                        (height * pixels_per_point) as i32,
                    ));
                });
        })
    }
}
