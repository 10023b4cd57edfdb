use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_caster::scaler::{ScaleLut, blit_nearest};
use grid_caster::{ColumnCompositor, Command, Engine, FrameDriver, scene};

type Surface = softbuffer::Surface<Rc<Window>, Rc<Window>>;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<Surface>,
    driver: FrameDriver<ColumnCompositor>,
    scale_lut: ScaleLut,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
}

impl App {
    fn new() -> Result<Self> {
        let config = scene::demo_config();
        let engine = Engine::new(&config, scene::demo_level())?;
        let compositor = ColumnCompositor::new(
            config.screen.width,
            config.screen.height,
            scene::demo_palette(),
        )?;

        Ok(Self {
            window: None,
            surface: None,
            driver: FrameDriver::new(engine, compositor),
            scale_lut: ScaleLut::new(0, 0, 0, 0),
            frame_counter: 0,
            last_fps_print: Instant::now(),
        })
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (fb_w, fb_h) = self.driver.sink().size();
        let attributes = Window::default_attributes()
            .with_title("Grid Caster")
            .with_inner_size(LogicalSize::new(fb_w as f64, fb_h as f64));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("create window")?,
        );
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("softbuffer surface: {e}"))?;

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        let (fb_w, fb_h) = self.driver.sink().size();
        self.scale_lut = ScaleLut::new(dst_w, dst_h, fb_w, fb_h);
    }

    fn present(&mut self, id: WindowId) -> Result<()> {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        if self.scale_lut.dst_size() != (dw.get() as usize, dh.get() as usize) {
            let (fb_w, fb_h) = self.driver.sink().size();
            self.scale_lut = ScaleLut::new(dw.get() as usize, dh.get() as usize, fb_w, fb_h);
        }

        surface
            .resize(dw, dh)
            .map_err(|e| anyhow!("resize surface: {e}"))?;
        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow!("surface buffer: {e}"))?;
        blit_nearest(&mut buf, self.driver.sink().framebuffer(), &self.scale_lut);
        buf.present().map_err(|e| anyhow!("present: {e}"))?;
        Ok(())
    }

    fn report_fps(&mut self) {
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "FPS: {:.1} ({} rendered, {} skipped)",
                self.frame_counter as f32 / elapsed,
                self.driver.frames_rendered(),
                self.driver.frames_skipped()
            );
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.driver.stop();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            error!("{e:#}");
            event_loop.exit();
            return;
        }
        self.driver.start();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; stopping");
                self.shutdown(event_loop);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                } else if let Some(command) = Command::from_key(code) {
                    if let Err(e) = self.driver.command(command) {
                        error!("{command:?}: {e}");
                        self.shutdown(event_loop);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let again = match self.driver.on_refresh() {
                    Ok(again) => again,
                    Err(e) => {
                        error!("frame failed: {e}");
                        self.shutdown(event_loop);
                        return;
                    }
                };

                if let Err(e) = self.present(id) {
                    error!("{e:#}");
                    self.shutdown(event_loop);
                    return;
                }
                self.report_fps();

                if again {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new().context("create event loop")?;
    // Redraws are requested one refresh at a time by the driver.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new()?;
    event_loop.run_app(&mut app).context("run event loop")?;
    Ok(())
}
