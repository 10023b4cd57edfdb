//! The demo scene: a walled 10x10 room with a few interior blocks.

use crate::camera::Pose;
use crate::config::{EngineConfig, ScreenConfig};
use crate::level::Level;
use crate::renderer::Palette;

pub const DEMO_LEVEL: [[u8; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 1, 1, 0, 1, 0, 0, 1],
    [1, 0, 0, 1, 0, 0, 1, 0, 0, 1],
    [1, 0, 0, 1, 0, 0, 1, 0, 0, 1],
    [1, 0, 0, 1, 0, 1, 1, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

pub fn demo_level() -> Level {
    // The constant is closed on all four sides.
    Level::from_rows(&DEMO_LEVEL).unwrap_or_else(|e| unreachable!("demo level: {e}"))
}

pub fn demo_config() -> EngineConfig {
    EngineConfig {
        screen: ScreenConfig {
            width: 640,
            height: 480,
        },
        fov: 60.0,
        rate: 64.0,
        velocity: 1.0,
        rotation: 2.0,
        pose: Pose::new(2.0, 2.0, 90.0),
    }
}

pub fn demo_palette() -> Palette {
    Palette::from_hex("#3E94D1", "#FF7340", "#92F23C")
        .unwrap_or_else(|| unreachable!("demo palette is well formed"))
}
