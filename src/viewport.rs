/// Pixel rectangle the scene is rendered into, with a bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Converts a top-left-origin rectangle to GL's bottom-left origin.
    pub fn flipped(self, window_height: i32) -> Self {
        Self {
            y: window_height - self.y - self.height,
            ..self
        }
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}
