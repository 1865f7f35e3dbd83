use cgmath::{
    Angle, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Quaternion, Rotation, Rotation3, SquareMatrix,
    Vector3,
};
use egui::Pos2;

use crate::config::CameraConfig;
use crate::shaders::{self, ShaderBackend};

/// Largest mouse movement, in pixels, applied in a single frame.
const MAX_LOOK_DELTA: f32 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug)]
pub struct PerspectiveCamera {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,

    pub position: Point3<f32>,
    pub orientation: Vector3<f32>,
    pub up: Vector3<f32>,

    pub fov: f32, // in deg
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub speed: f32,
    pub sensitivity: f32,
    first_click: bool,
    last_mouse_pos: Pos2,
}

impl PerspectiveCamera {
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        let (yaw, pitch) = (Deg(config.yaw), Deg(config.pitch));
        let orientation = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();

        let mut camera = Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),

            position: Point3::from(config.position),
            orientation,
            up: Vector3::unit_y(),

            fov: config.fov,
            aspect_ratio,
            near_plane: config.near,
            far_plane: config.far,
            speed: config.speed,
            sensitivity: config.sensitivity,
            first_click: true,
            last_mouse_pos: Pos2::new(0.0, 0.0),
        };
        camera.update_matrices();
        camera
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    pub fn update_matrices(&mut self) {
        self.view = Matrix4::look_at_rh(self.position, self.position + self.orientation, self.up);
        self.projection = cgmath::perspective(
            Deg(self.fov),
            self.aspect_ratio,
            self.near_plane,
            self.far_plane,
        );
    }

    /// Pushes `view`, `projection` and `viewPosition`.
    pub fn apply(&mut self, shader: &mut dyn ShaderBackend) {
        self.update_matrices();
        shader.set_mat4(shaders::VIEW, &self.view);
        shader.set_mat4(shaders::PROJECTION, &self.projection);
        shader.set_vec3(shaders::VIEW_POSITION, self.position.to_vec());
    }

    fn right(&self) -> Vector3<f32> {
        self.orientation.cross(self.up).normalize()
    }

    pub fn move_camera(&mut self, movement: Movement, delta_seconds: f32) {
        let direction = match movement {
            Movement::Forward => self.orientation,
            Movement::Backward => -self.orientation,
            Movement::Left => -self.right(),
            Movement::Right => self.right(),
            Movement::Up => self.up,
            Movement::Down => -self.up,
        };
        self.position += direction * self.speed * delta_seconds;
    }

    /// Turns the camera by a mouse movement in pixels. Pitch stops short of
    /// looking straight up or down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let dx = dx.clamp(-MAX_LOOK_DELTA, MAX_LOOK_DELTA);
        let dy = dy.clamp(-MAX_LOOK_DELTA, MAX_LOOK_DELTA);

        let pitch = Quaternion::from_axis_angle(self.right(), Deg(-self.sensitivity * dy));
        let pitched = pitch.rotate_vector(self.orientation);
        if pitched.dot(self.up).abs() < 0.99 {
            self.orientation = pitched;
        }

        let yaw = Quaternion::from_axis_angle(self.up, Deg(-self.sensitivity * dx));
        self.orientation = yaw.rotate_vector(self.orientation).normalize();
    }

    /// Feeds a drag position; the first position of a drag only anchors it.
    pub fn drag_to(&mut self, pos: Pos2) {
        if self.first_click {
            self.first_click = false;
        } else {
            self.look(pos.x - self.last_mouse_pos.x, pos.y - self.last_mouse_pos.y);
        }
        self.last_mouse_pos = pos;
    }

    pub fn release(&mut self) {
        self.first_click = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingShader, Uniform};
    use approx::assert_abs_diff_eq;
    use cgmath::{vec3, Transform};

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = camera();
        assert!(camera.orientation.z < -0.9);
        assert!(camera.orientation.y < 0.0);
        assert_abs_diff_eq!(camera.orientation.magnitude(), 1.0, epsilon = 1e-5);

        let eye = camera.view.transform_point(camera.position);
        assert_abs_diff_eq!(eye.to_vec().magnitude(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn pushes_view_projection_and_position() {
        let mut camera = camera();
        let mut shader = RecordingShader::default();

        camera.apply(&mut shader);

        assert!(matches!(shader.value("view"), Some(Uniform::Mat4(_))));
        assert!(matches!(shader.value("projection"), Some(Uniform::Mat4(_))));
        assert_eq!(
            shader.value("viewPosition"),
            Some(&Uniform::Vec3(vec3(0.0, 5.5, 14.0)))
        );
    }

    #[test]
    fn movement_scales_with_time() {
        let mut camera = camera();
        let start = camera.position;

        camera.move_camera(Movement::Up, 2.0);
        assert_abs_diff_eq!(camera.position.y - start.y, 2.0 * camera.speed, epsilon = 1e-5);

        camera.move_camera(Movement::Right, 1.0);
        assert!(camera.position.x > start.x);
    }

    #[test]
    fn pitch_stops_before_vertical() {
        let mut camera = camera();
        for _ in 0..100 {
            camera.look(0.0, -MAX_LOOK_DELTA);
        }
        assert!(camera.orientation.dot(camera.up) < 0.99);
        assert!(camera.orientation.y > 0.5);
    }

    #[test]
    fn first_drag_position_only_anchors() {
        let mut camera = camera();
        let before = camera.orientation;

        camera.drag_to(Pos2::new(200.0, 100.0));
        assert_eq!(camera.orientation, before);

        camera.drag_to(Pos2::new(220.0, 100.0));
        assert_ne!(camera.orientation, before);

        camera.release();
        let after = camera.orientation;
        camera.drag_to(Pos2::new(0.0, 0.0));
        assert_eq!(camera.orientation, after);
    }

    #[test]
    fn degenerate_aspect_ratios_are_ignored() {
        let mut camera = camera();
        camera.set_aspect_ratio(0.0);
        camera.set_aspect_ratio(f32::NAN);
        assert_eq!(camera.aspect_ratio, 16.0 / 9.0);
    }
}
