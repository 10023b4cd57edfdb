//! Grid raycaster: turns a camera pose over a 2D occupancy grid into one wall
//! height per screen column and composites those into ceiling, wall and floor.

pub mod camera;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod input;
pub mod level;
pub mod renderer;
pub mod scaler;
pub mod scene;

pub use camera::{Camera, Pose};
pub use config::{EngineConfig, Projection, ScreenConfig};
pub use driver::FrameDriver;
pub use engine::Engine;
pub use error::EngineError;
pub use input::Command;
pub use level::Level;
pub use renderer::{ColumnCompositor, ColumnSink, FrameRecorder, Palette};
