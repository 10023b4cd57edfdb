use std::f64::consts::FRAC_1_SQRT_2;

use log::{debug, info, trace};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::camera::{Camera, Pose, should_render};
use crate::config::{EngineConfig, Projection};
use crate::error::{EngineError, Result};
use crate::input::Command;
use crate::level::Level;
use crate::renderer::ColumnSink;

/// Raycasting engine: owns the camera and the level, turns a pose into one
/// half wall height per screen column.
pub struct Engine {
    level: Level,
    camera: Camera,
    projection: Projection,
    velocity: f64,
    rotation: f64,
    heights: Vec<u32>, // reused every frame
}

impl Engine {
    pub fn new(config: &EngineConfig, level: Level) -> Result<Self> {
        config.validate()?;
        let pose = config.pose;
        level.cell_of(pose.x, pose.y)?;

        // The larger step component is at least rate^-1 / sqrt(2); it has to
        // stay above the float spacing at the far edge of the grid.
        let (sx, sy) = level.size();
        let extent = sx.max(sy) as f64;
        if FRAC_1_SQRT_2 / config.rate <= extent * f64::EPSILON {
            return Err(EngineError::InvalidConfig(format!(
                "rate {} is too fine for a {sx}x{sy} level",
                config.rate
            )));
        }

        let projection = Projection::new(config);
        info!(
            "engine ready: {}x{} screen, {sx}x{sy} level, fov {}, rate {}",
            projection.width, projection.height, projection.fov, projection.rate
        );

        Ok(Self {
            level,
            camera: Camera::new(pose),
            projection,
            velocity: config.velocity,
            rotation: config.rotation,
            heights: vec![0; projection.width],
        })
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.camera.pose()
    }

    #[inline]
    pub fn previous(&self) -> Option<Pose> {
        self.camera.previous()
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Half wall heights from the most recent `cast_rays`.
    #[inline]
    pub fn heights(&self) -> &[u32] {
        &self.heights
    }

    /// Applies one input command. Returns whether the pose changed.
    pub fn apply(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::MoveForward => self.move_forward(),
            Command::MoveBack => self.move_back(),
            Command::RotateLeft => {
                self.rotate_left();
                Ok(true)
            }
            Command::RotateRight => {
                self.rotate_right();
                Ok(true)
            }
        }
    }

    pub fn move_forward(&mut self) -> Result<bool> {
        let (x, y, dx, dy) = self.displacement();
        self.try_move(x + dx, y + dy)
    }

    pub fn move_back(&mut self) -> Result<bool> {
        let (x, y, dx, dy) = self.displacement();
        self.try_move(x - dx, y - dy)
    }

    fn displacement(&self) -> (f64, f64, f64, f64) {
        let pose = self.camera.pose();
        let (cos, sin) = Pose::direction(pose.heading);
        (pose.x, pose.y, cos / self.velocity, sin / self.velocity)
    }

    // All or nothing: a blocked move leaves position and snapshot untouched.
    fn try_move(&mut self, x: f64, y: f64) -> Result<bool> {
        let pose = self.camera.pose();
        if x == pose.x && y == pose.y {
            // displacement rounded away
            return Ok(false);
        }
        if self.has_collision(x, y)? {
            debug!("move to ({x:.3}, {y:.3}) blocked");
            return Ok(false);
        }
        self.camera.set_position(x, y);
        Ok(true)
    }

    pub fn rotate_left(&mut self) {
        self.camera.turn(-self.rotation);
    }

    pub fn rotate_right(&mut self) {
        self.camera.turn(self.rotation);
    }

    #[inline]
    pub fn has_collision(&self, x: f64, y: f64) -> Result<bool> {
        self.level.is_occupied(x, y)
    }

    pub fn should_render(&self) -> bool {
        should_render(&self.camera.pose(), self.camera.previous().as_ref())
    }

    /// Fisheye-corrected distance to the first wall along `angle` degrees.
    pub fn cast_ray(&self, angle: f64) -> Result<f64> {
        march(&self.level, &self.camera.pose(), angle, self.projection.rate)
    }

    /// Casts one ray per column into the height buffer.
    pub fn cast_rays(&mut self) -> Result<()> {
        let pose = self.camera.pose();
        let level = &self.level;
        let proj = self.projection;

        self.heights
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, h)| -> Result<()> {
                let angle = proj.column_angle(pose.heading, i);
                let distance = march(level, &pose, angle, proj.rate)?;
                *h = project(proj.half_height, distance);
                Ok(())
            })
    }

    /// One frame: recompute and hand the buffer to `sink` only if the camera
    /// moved since the last render. Returns whether a frame was produced.
    pub fn tick<S: ColumnSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if !self.should_render() {
            return Ok(false);
        }
        self.cast_rays()?;
        sink.render(&self.heights);
        self.camera.snapshot();

        let pose = self.camera.pose();
        trace!(
            "rendered frame at ({:.3}, {:.3}) heading {}",
            pose.x, pose.y, pose.heading
        );
        Ok(true)
    }
}

/// Fixed-step march from `origin` until the stepped point lands in a wall.
///
/// Every level has an occupied outer ring and a step is never longer than
/// one cell (`rate >= 1`), so the march ends on a wall as long as each step
/// moves the point. A step that rounds away fails with `StalledRay`.
pub fn march(level: &Level, origin: &Pose, angle: f64, rate: f64) -> Result<f64> {
    let (cos, sin) = Pose::direction(angle);
    let (step_x, step_y) = (cos / rate, sin / rate);

    let (mut x, mut y) = (origin.x, origin.y);
    while !level.is_occupied(x, y)? {
        let (nx, ny) = (x + step_x, y + step_y);
        if nx == x && ny == y {
            return Err(EngineError::StalledRay { angle, x, y });
        }
        x = nx;
        y = ny;
    }

    let euclidean = ((x - origin.x).powi(2) + (y - origin.y).powi(2)).sqrt();
    let corrected = euclidean * (angle - origin.heading).to_radians().cos();
    Ok(corrected.max(0.0))
}

/// Half wall height for a corrected distance. Zero, negative and non-finite
/// distances fill the whole column.
#[inline]
pub fn project(half_height: f64, distance: f64) -> u32 {
    if distance > 0.0 && distance.is_finite() {
        // float to int casts saturate
        (half_height / distance).floor() as u32
    } else {
        half_height.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use crate::renderer::FrameRecorder;
    use crate::scene;

    fn engine_at(pose: Pose) -> Engine {
        let mut config = scene::demo_config();
        config.pose = pose;
        Engine::new(&config, scene::demo_level()).unwrap()
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut engine = engine_at(Pose::new(2.0, 2.0, 90.0));
        engine.rotate_left();
        assert_eq!(engine.pose().heading, 88.0);
        engine.rotate_right();
        assert_eq!(engine.pose().heading, 90.0);
    }

    #[test]
    fn test_heading_is_unbounded() {
        let mut engine = engine_at(Pose::new(2.0, 2.0, 358.0));
        engine.rotate_right();
        engine.rotate_right();
        assert_eq!(engine.pose().heading, 362.0);
    }

    #[test]
    fn test_move_forward_updates_position_and_previous() {
        let mut engine = engine_at(Pose::new(2.0, 2.0, 90.0));
        let mut sink = FrameRecorder::default();
        assert!(engine.tick(&mut sink).unwrap());

        assert!(engine.move_forward().unwrap());
        let pose = engine.pose();
        assert_eq!(pose.x, 2.0);
        assert_eq!(pose.y, 3.0);
        let prev = engine.previous().unwrap();
        assert_eq!((prev.x, prev.y), (2.0, 2.0));
        // only y moved
        assert!(engine.should_render());
    }

    #[test]
    fn test_blocked_move_is_noop() {
        // Facing the outer wall at x = 0 from (1.5, 5.5).
        let mut engine = engine_at(Pose::new(1.5, 5.5, 180.0));
        let mut sink = FrameRecorder::default();
        engine.tick(&mut sink).unwrap();
        let before = engine.pose();
        let prev_before = engine.previous();

        assert!(!engine.move_forward().unwrap());
        assert_eq!(engine.pose(), before);
        assert_eq!(engine.previous(), prev_before);
        assert!(!engine.should_render());
    }

    #[test]
    fn test_move_back() {
        let mut engine = engine_at(Pose::new(2.0, 4.0, 90.0));
        assert!(engine.move_back().unwrap());
        assert_eq!(engine.pose().y, 3.0);
        // (2, 2) after a second step, then (2, 1) is still open
        assert!(engine.move_back().unwrap());
        assert!(engine.move_back().unwrap());
        assert_eq!(engine.pose().y, 1.0);
        // (2, 0) is the outer wall
        assert!(!engine.move_back().unwrap());
        assert_eq!(engine.pose().y, 1.0);
    }

    #[test]
    fn test_should_render_cycle() {
        let mut engine = engine_at(Pose::new(2.0, 2.0, 90.0));
        let mut sink = FrameRecorder::default();

        assert!(engine.should_render());
        assert!(engine.tick(&mut sink).unwrap());
        assert!(!engine.should_render());
        assert!(!engine.tick(&mut sink).unwrap());
        assert_eq!(sink.frame_count(), 1);

        engine.rotate_left();
        assert!(engine.should_render());
        assert!(engine.tick(&mut sink).unwrap());
        assert!(!engine.should_render());

        engine.apply(Command::MoveForward).unwrap();
        assert!(engine.should_render());
    }

    #[test]
    fn test_center_ray_distance() {
        // Straight down column x = 2: open until the wall at y = 9.
        let engine = engine_at(Pose::new(2.0, 2.0, 90.0));
        let d = engine.cast_ray(90.0).unwrap();
        assert_eq!(d, 7.0);
        assert_eq!(project(240.0, d), 34);
    }

    #[test]
    fn test_ray_into_adjacent_wall() {
        let engine = engine_at(Pose::new(1.01, 5.5, 180.0));
        let d = engine.cast_ray(180.0).unwrap();
        assert!(d >= 0.0);
        assert!(d.is_finite());
        assert!(d < 0.05);
    }

    #[test]
    fn test_ray_distances_are_non_negative() {
        let engine = engine_at(Pose::new(4.5, 4.5, 37.0));
        for k in 0..72 {
            let angle = 37.0 - 30.0 + k as f64 * (60.0 / 72.0);
            let d = engine.cast_ray(angle).unwrap();
            assert!(d >= 0.0 && d.is_finite(), "angle {angle}: {d}");
            let h = project(240.0, d);
            assert!((h as f64).is_finite());
        }
    }

    #[test]
    fn test_embedded_camera() {
        // (3.5, 3.5) sits inside the inner wall block.
        let mut engine = engine_at(Pose::new(3.5, 3.5, 0.0));
        assert_eq!(engine.cast_ray(0.0).unwrap(), 0.0);
        engine.cast_rays().unwrap();
        assert!(engine.heights().iter().all(|&h| h == 240));
    }

    #[test]
    fn test_project_degenerate() {
        assert_eq!(project(240.0, 0.0), 240);
        assert_eq!(project(240.0, -1.0), 240);
        assert_eq!(project(240.0, f64::NAN), 240);
        assert_eq!(project(240.0, 1e-300), u32::MAX);
        assert_eq!(project(240.0, 2.0), 120);
    }

    #[test]
    fn test_project_odd_height() {
        // 481 rows: the half height keeps its fraction
        assert_eq!(project(240.5, 0.5), 481);
        assert_eq!(project(240.0, 0.5), 480);
        assert_eq!(project(240.5, f64::NAN), 241);
    }

    #[test]
    fn test_rejects_rate_too_fine_for_level() {
        let mut config = scene::demo_config();
        config.rate = 1e17;
        assert!(config.validate().is_ok());
        assert!(matches!(
            Engine::new(&config, scene::demo_level()),
            Err(crate::error::EngineError::InvalidConfig(_))
        ));

        config.rate = 1e6;
        assert!(Engine::new(&config, scene::demo_level()).is_ok());
    }

    #[test]
    fn test_march_fails_when_step_vanishes() {
        let level = scene::demo_level();
        let origin = Pose::new(2.0, 2.0, 90.0);
        assert!(matches!(
            march(&level, &origin, 90.0, 1e17),
            Err(crate::error::EngineError::StalledRay { .. })
        ));
    }

    #[test]
    fn test_vanishing_move_reports_no_change() {
        let mut config = scene::demo_config();
        config.velocity = 1e20;
        let mut engine = Engine::new(&config, scene::demo_level()).unwrap();
        let mut sink = FrameRecorder::default();
        engine.tick(&mut sink).unwrap();
        let prev = engine.previous();

        assert!(!engine.move_forward().unwrap());
        assert!(!engine.move_back().unwrap());
        assert_eq!(engine.pose(), Pose::new(2.0, 2.0, 90.0));
        assert_eq!(engine.previous(), prev);
        assert!(!engine.should_render());
    }

    #[test]
    fn test_buffer_is_reused() {
        let mut engine = engine_at(Pose::new(2.0, 2.0, 90.0));
        engine.cast_rays().unwrap();
        let ptr = engine.heights().as_ptr();
        engine.rotate_right();
        engine.cast_rays().unwrap();
        assert_eq!(engine.heights().as_ptr(), ptr);
        assert_eq!(engine.heights().len(), 640);
    }

    #[test]
    fn test_rejects_pose_outside_level() {
        let mut config = scene::demo_config();
        config.pose = Pose::new(12.0, 2.0, 0.0);
        assert!(matches!(
            Engine::new(&config, scene::demo_level()),
            Err(crate::error::EngineError::OutOfBounds { .. })
        ));

        config.pose = Pose::new(2.0, 2.0, 0.0);
        config.screen = ScreenConfig {
            width: 0,
            height: 10,
        };
        assert!(Engine::new(&config, scene::demo_level()).is_err());
    }
}
