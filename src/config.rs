use crate::camera::Pose;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenConfig {
    pub width: usize,  // columns, one ray each
    pub height: usize, // pixel rows
}

/// Everything an engine needs at construction. No field has a default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub screen: ScreenConfig,
    /// Horizontal field of view in degrees.
    pub fov: f64,
    /// March subdivisions per world unit.
    pub rate: f64,
    /// Divisor applied to the unit heading vector on every move.
    pub velocity: f64,
    /// Degrees turned per rotation command.
    pub rotation: f64,
    pub pose: Pose,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(EngineError::InvalidConfig(msg.to_string()));

        if self.screen.width == 0 || self.screen.height == 0 {
            return invalid("screen width and height must be non-zero");
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return invalid("fov must lie in (0, 180) degrees");
        }
        // Steps longer than one cell could skip the boundary ring.
        if !(self.rate.is_finite() && self.rate >= 1.0) {
            return invalid("rate must be finite and at least 1");
        }
        if !(self.velocity.is_finite() && self.velocity >= 1.0) {
            return invalid("velocity must be finite and at least 1");
        }
        if !self.rotation.is_finite() {
            return invalid("rotation must be finite");
        }
        let p = self.pose;
        if !(p.x.is_finite() && p.y.is_finite() && p.heading.is_finite()) {
            return invalid("initial pose must be finite");
        }
        Ok(())
    }
}

/// Values derived once from the screen and field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub width: usize,
    pub height: usize,
    pub half_height: f64,
    pub fov: f64,
    pub half_fov: f64,
    pub ray_step: f64, // degrees between neighbouring columns
    pub rate: f64,
}

impl Projection {
    pub fn new(config: &EngineConfig) -> Self {
        let ScreenConfig { width, height } = config.screen;
        Self {
            width,
            height,
            half_height: height as f64 / 2.0,
            fov: config.fov,
            half_fov: config.fov / 2.0,
            ray_step: config.fov / width as f64,
            rate: config.rate,
        }
    }

    /// Heading offset of column `i` relative to the left edge of the view.
    #[inline]
    pub fn column_angle(&self, heading: f64, i: usize) -> f64 {
        heading - self.half_fov + i as f64 * self.ray_step
    }
}
