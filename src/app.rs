// Frame pump: window events in, engine frames out.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use falsebound::config::GameConfig;
use falsebound::engine::Engine;
use falsebound::input::{Action, InputState};
use falsebound::math::{Mat4, Vec3};
use falsebound::render::FrameRecorder;
use falsebound::setup::build_game;
use log::{error, info, trace};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::renderer::GpuRenderer;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 500.0;

fn action_for(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::KeyA => Some(Action::MoveLeft),
        KeyCode::KeyD => Some(Action::MoveRight),
        KeyCode::KeyW => Some(Action::MoveForward),
        KeyCode::KeyS => Some(Action::MoveBack),
        KeyCode::KeyF => Some(Action::Confirm),
        KeyCode::KeyE => Some(Action::ScaleUp),
        KeyCode::KeyR => Some(Action::ScaleReset),
        _ => None,
    }
}

struct App {
    window: Arc<Window>,
    renderer: GpuRenderer,
    engine: Engine,
    recorder: FrameRecorder,
    input: InputState,
    camera_offset: Vec3,
    fov_y: f32,
    last_frame: Instant,
}

impl App {
    fn handle_keyboard_input(&mut self, event: KeyEvent) {
        let PhysicalKey::Code(keycode) = event.physical_key else {
            return;
        };
        let is_pressed = event.state == ElementState::Pressed;
        if keycode == KeyCode::Escape {
            if is_pressed {
                self.engine.request_close();
            }
            return;
        }
        if let Some(action) = action_for(keycode) {
            self.input.set(action, is_pressed);
        }
    }

    /// Perspective view looking down at the focused actor.
    fn view_projection(&self) -> Mat4 {
        let focus = self.engine.focus_position().unwrap_or(Vec3::ZERO);
        let eye = focus + self.camera_offset;
        let target = Vec3::new(focus.x, 0.0, focus.z);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let aspect = self.renderer.aspect_ratio();
        let proj = Mat4::perspective_rh(self.fov_y, aspect, NEAR_PLANE, FAR_PLANE);
        proj * view
    }

    fn update_and_render(&mut self) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if let Err(err) = self.engine.update(delta_time, &self.input) {
            error!("frame update failed: {err}");
            self.engine.request_close();
            return;
        }
        self.input.end_frame();

        self.recorder.clear();
        if let Err(err) = self.engine.draw(&mut self.recorder) {
            error!("frame draw failed: {err}");
            return;
        }
        // No glyph pipeline yet; UI text only reaches the log.
        for text in &self.recorder.texts {
            if !text.text.is_empty() {
                trace!("ui text at {}: {:?}", text.position, text.text);
            }
        }
        let view_proj = self.view_projection();
        self.renderer.render(view_proj, &self.recorder.shapes);
    }

    fn handle_event(&mut self, event: Event<()>, target: &EventLoopWindowTarget<()>) {
        match event {
            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
            } if window_id == self.window.id() => {
                self.engine.request_close();
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(physical_size),
                window_id,
            } if window_id == self.window.id() => {
                self.renderer.resize(physical_size);
            }
            Event::AboutToWait => {
                if self.engine.is_running() {
                    self.window.request_redraw();
                } else {
                    if let Err(err) = self.engine.end() {
                        error!("failed to end scene: {err}");
                    }
                    target.exit();
                }
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                window_id,
            } if window_id == self.window.id() => {
                if self.engine.is_running() {
                    self.update_and_render();
                }
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                window_id,
            } if window_id == self.window.id() => {
                self.handle_keyboard_input(event);
            }
            _ => {}
        }
    }
}

pub async fn run(config: GameConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.as_str())
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let renderer = GpuRenderer::new(Arc::clone(&window)).await?;
    let (mut engine, _) = build_game(&config)?;
    engine.start()?;
    info!("starting {}", config.window_title);

    let mut app = App {
        window,
        renderer,
        engine,
        recorder: FrameRecorder::new(),
        input: InputState::new(),
        camera_offset: Vec3::from_array(config.camera_offset),
        fov_y: config.field_of_view_degrees.to_radians(),
        last_frame: Instant::now(),
    };

    event_loop.run(move |event, target| {
        target.set_control_flow(ControlFlow::Poll);
        app.handle_event(event, target);
    })?;
    Ok(())
}
