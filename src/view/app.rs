use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use super::gpu_init::GpuContext;
use super::render::SceneRenderer;
use super::ui::{self, FpsCounter};
use crate::config::SceneConfig;
use crate::controller::{CursorMode, FrameLoopContext, InputEvent, InputState, Key, MouseButton};
use crate::error::ViewerError;
use crate::model::SimulationState;

/// Trackpads report pixels; the zoom works in wheel lines.
const PIXELS_PER_LINE: f64 = 40.0;

pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit9,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
    }
}

/// Translate a window event into the platform-independent form.
pub fn translate_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                physical_key: PhysicalKey::Code(code),
                state,
                ..
            },
            ..
        } => {
            let key = map_key(*code)?;
            Some(match state {
                ElementState::Pressed => InputEvent::KeyDown(key),
                ElementState::Released => InputEvent::KeyUp(key),
            })
        }
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x,
            y: position.y,
        }),
        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
            button: map_button(*button)?,
            pressed: *state == ElementState::Pressed,
        }),
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
            delta_y: scroll_lines(*delta),
        }),
        WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
        _ => None,
    }
}

/// Events that must reach the scene even when the HUD consumed them, so no
/// key or button is left latched down.
pub fn passes_through_ui(input: &InputEvent) -> bool {
    matches!(
        input,
        InputEvent::KeyDown(_)
            | InputEvent::KeyUp(_)
            | InputEvent::FocusLost
            | InputEvent::MouseButton { pressed: false, .. }
    )
}

/// Everything that exists once the window is up.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SceneRenderer,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    state: SimulationState,
    input: InputState,
    frame_loop: FrameLoopContext,
    fps: FpsCounter,
    started: Instant,
    day: Vec3,
    sunset: Vec3,
}

impl Viewer {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> Result<Self, ViewerError> {
        let gpu = GpuContext::new(window.clone()).await?;
        let renderer = SceneRenderer::new(&gpu.device, gpu.format, gpu.config.width, gpu.config.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format, egui_wgpu::RendererOptions::default());

        let state = config.build_state();
        for object in &state.objects {
            debug!(name = %object.name, kind = object.animation.kind(), "scene object");
        }

        Ok(Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            egui_renderer,
            state,
            input: InputState::new(),
            frame_loop: FrameLoopContext::new(config.build_sampler(), config.max_frame_delta),
            fps: FpsCounter::default(),
            started: Instant::now(),
            day: config.day_color(),
            sunset: config.sunset_color(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.renderer.resize(&self.gpu.device, width, height);
    }

    fn set_cursor_mode(&self, mode: CursorMode) {
        match mode {
            CursorMode::Captured => {
                let grabbed = self
                    .window
                    .set_cursor_grab(CursorGrabMode::Confined)
                    .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
                if let Err(e) = grabbed {
                    warn!("cursor grab unavailable: {e}");
                }
                self.window.set_cursor_visible(false);
            }
            CursorMode::Free => {
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                    warn!("cursor release failed: {e}");
                }
                self.window.set_cursor_visible(true);
            }
        }
    }

    /// One frame: simulate, then draw. Returns true when the scene asked to quit.
    fn frame(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let now = self.started.elapsed().as_secs_f64();
        let requests = self.frame_loop.tick(&mut self.state, &mut self.input, now);
        self.fps.record(self.frame_loop.last_dt());
        if let Some(mode) = requests.cursor {
            self.set_cursor_mode(mode);
        }

        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("surface error: {e:?}"),
        }
        requests.quit
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .prepare(&self.gpu.device, &self.gpu.queue, &self.state, self.gpu.aspect());

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let fps = self.fps.fps();
        let output = self.egui_ctx.run(raw_input, |ctx| {
            ui::build_ui(ctx, &self.state, self.frame_loop.sampler.bindings(), fps);
        });
        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = self.window.scale_factor() as f32;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point,
        };
        let primitives = self.egui_ctx.tessellate(output.shapes, pixels_per_point);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        for (id, image_delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }
        let egui_commands = self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &primitives,
            &screen_descriptor,
        );

        let sky = self.state.sky_color(self.day, self.sunset);
        self.renderer.draw(&mut encoder, &view, sky);

        // HUD on top of the scene
        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gpu
            .queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }
}

/// winit application: owns the scene description until the window exists.
pub struct ViewerApp {
    config: SceneConfig,
    viewer: Option<Viewer>,
    error: Option<ViewerError>,
}

impl ViewerApp {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            viewer: None,
            error: None,
        }
    }

    fn open(&self, event_loop: &ActiveEventLoop) -> Result<Viewer, ViewerError> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);
        pollster::block_on(Viewer::new(window, &self.config))
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(viewer) => {
                info!(title = %self.config.title, "window open");
                self.viewer = Some(viewer);
            }
            Err(e) => {
                error!("viewer startup failed: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                viewer.resize(size.width, size.height);
                return;
            }
            WindowEvent::RedrawRequested => {
                if viewer.frame(event_loop) {
                    info!("quit requested");
                    event_loop.exit();
                }
                return;
            }
            _ => {}
        }

        // First let egui process the event
        let consumed = viewer
            .egui_state
            .on_window_event(viewer.window.as_ref(), &event)
            .consumed;
        let Some(input) = translate_event(&event) else {
            return;
        };
        if consumed && !passes_through_ui(&input) {
            return;
        }
        viewer.input.process_event(input);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }
}

/// Open the window and run until the scene quits or the window closes.
pub fn run(config: SceneConfig) -> Result<(), ViewerError> {
    config.validate()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_scene_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::Digit4), Some(Key::Digit4));
        assert_eq!(map_key(KeyCode::Numpad1), Some(Key::Digit1));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::F5), None);
    }

    #[test]
    fn releases_reach_the_scene_past_the_hud() {
        let release = InputEvent::MouseButton { button: MouseButton::Right, pressed: false };
        assert!(passes_through_ui(&release));
        let left_release = InputEvent::MouseButton { button: MouseButton::Left, pressed: false };
        assert!(passes_through_ui(&left_release));
        assert!(passes_through_ui(&InputEvent::KeyUp(Key::W)));
        assert!(passes_through_ui(&InputEvent::FocusLost));

        let press = InputEvent::MouseButton { button: MouseButton::Right, pressed: true };
        assert!(!passes_through_ui(&press));
        assert!(!passes_through_ui(&InputEvent::CursorMoved { x: 1.0, y: 2.0 }));
        assert!(!passes_through_ui(&InputEvent::Scroll { delta_y: 1.0 }));
    }

    #[test]
    fn focus_loss_and_wheel_translate() {
        assert_eq!(translate_event(&WindowEvent::Focused(false)), Some(InputEvent::FocusLost));
        assert_eq!(translate_event(&WindowEvent::Focused(true)), None);
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = winit::dpi::PhysicalPosition::new(0.0, -80.0);
        assert_eq!(scroll_lines(MouseScrollDelta::PixelDelta(pixels)), -2.0);
    }
}
