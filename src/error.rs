use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Floored coordinates fell outside the level grid.
    #[error("cell ({x}, {y}) is outside the level grid")]
    OutOfBounds { x: i64, y: i64 },

    /// A march step no longer moved the sample point.
    #[error("ray at {angle} degrees stopped advancing at ({x}, {y})")]
    StalledRay { angle: f64, x: f64, y: f64 },

    #[error("invalid level: {0}")]
    InvalidLevel(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
