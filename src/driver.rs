use log::info;

use crate::engine::Engine;
use crate::error::Result;
use crate::input::Command;
use crate::renderer::ColumnSink;

/// Drives one engine tick per display refresh.
///
/// The host calls `on_refresh` from its redraw callback and schedules the
/// next refresh only while it returns `true`. `tick` steps synchronously
/// regardless of the running flag.
pub struct FrameDriver<S: ColumnSink> {
    engine: Engine,
    sink: S,
    running: bool,
    frames_rendered: u64,
    frames_skipped: u64,
}

impl<S: ColumnSink> FrameDriver<S> {
    pub fn new(engine: Engine, sink: S) -> Self {
        Self {
            engine,
            sink,
            running: false,
            frames_rendered: 0,
            frames_skipped: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("frame driver started");
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(
                "frame driver stopped after {} rendered, {} skipped frames",
                self.frames_rendered, self.frames_skipped
            );
            self.running = false;
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One engine step. Returns whether the sink received a new frame.
    pub fn tick(&mut self) -> Result<bool> {
        let rendered = self.engine.tick(&mut self.sink)?;
        if rendered {
            self.frames_rendered += 1;
        } else {
            self.frames_skipped += 1;
        }
        Ok(rendered)
    }

    /// Refresh callback. Returns whether another refresh should be scheduled.
    pub fn on_refresh(&mut self) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }
        self.tick()?;
        Ok(self.running)
    }

    /// Forwards an input command to the engine immediately.
    pub fn command(&mut self, command: Command) -> Result<bool> {
        self.engine.apply(command)
    }

    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    #[inline]
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FrameRecorder;
    use crate::scene;

    fn driver() -> FrameDriver<FrameRecorder> {
        let engine = Engine::new(&scene::demo_config(), scene::demo_level()).unwrap();
        FrameDriver::new(engine, FrameRecorder::default())
    }

    #[test]
    fn test_refresh_requires_start() {
        let mut d = driver();
        assert!(!d.is_running());
        assert!(!d.on_refresh().unwrap());
        assert_eq!(d.sink().frame_count(), 0);

        d.start();
        assert!(d.on_refresh().unwrap());
        assert_eq!(d.sink().frame_count(), 1);

        d.stop();
        assert!(!d.on_refresh().unwrap());
        assert_eq!(d.frames_rendered(), 1);
    }

    #[test]
    fn test_stationary_frames_are_skipped() {
        let mut d = driver();
        d.start();
        for _ in 0..5 {
            d.on_refresh().unwrap();
        }
        assert_eq!(d.frames_rendered(), 1);
        assert_eq!(d.frames_skipped(), 4);
    }

    #[test]
    fn test_inputs_coalesce_between_frames() {
        let mut d = driver();
        assert!(d.tick().unwrap());

        d.command(Command::RotateLeft).unwrap();
        d.command(Command::RotateLeft).unwrap();
        d.command(Command::MoveForward).unwrap();
        assert!(d.tick().unwrap());
        assert!(!d.tick().unwrap());

        assert_eq!(d.sink().frame_count(), 2);
        assert_eq!(d.engine().pose().heading, 86.0);
    }

    #[test]
    fn test_tick_hands_engine_buffer_to_sink() {
        let mut d = driver();
        d.tick().unwrap();
        assert_eq!(d.sink().last(), Some(d.engine().heights()));
        assert_eq!(d.sink().last().map(<[u32]>::len), Some(640));
    }
}
