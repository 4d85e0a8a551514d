use std::path::PathBuf;

use crate::world::Rgba;

/// Fixed viewer parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub world_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub target_fps: u32,
    pub circle_radius: i32,
    pub background: Rgba,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            world_path: PathBuf::from("test.json"),
            width: 800,
            height: 800,
            title: "sector parsing".to_string(),
            target_fps: 120,
            circle_radius: 10,
            background: Rgba::BLACK,
        }
    }
}
