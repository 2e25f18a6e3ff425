/// Logical surface size and simulation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    /// Simulation steps per second.
    pub fps: u32,
}

impl GameConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { width: 640, height: 480, fps: 60 }
    }
}
