use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gpu::GpuContext;
use crate::mesh_pass::{MeshPass, ShaderSource};
use crate::scene::SceneState;

/// Opens the window and runs the viewer until it is closed.
///
/// Initialization failures are returned once the event loop has shut down.
///
/// # Example
/// ```no_run
/// let config = landfall::ViewerConfig::new().title("Fjord").size(1600, 900);
/// landfall::run(config).unwrap();
/// ```
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ViewerApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum ViewerApp {
    Pending {
        config: ViewerConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        mesh_pass: MeshPass,
        scene: SceneState,
        clear_color: wgpu::Color,
        last_frame: Instant,
        minimized: bool,
    },
    Failed(ViewerError),
    Finished,
}

impl ViewerApp {
    /// Window, GPU, shader, then scene content.
    fn start(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let shader = ShaderSource::load(&config.shader_path())?;
        let mut mesh_pass = MeshPass::new(&gpu, &shader)?;

        let scene = SceneState::load(&gpu, config)?;
        mesh_pass.set_texture(&gpu, scene.terrain_texture.as_ref());

        window.request_redraw();
        Ok(ViewerApp::Running {
            window,
            gpu,
            mesh_pass,
            scene,
            clear_color: config.clear_color(),
            last_frame: Instant::now(),
            minimized: false,
        })
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ViewerApp::Pending { config } = std::mem::replace(self, ViewerApp::Finished) else {
            return;
        };

        match Self::start(event_loop, &config) {
            Ok(running) => *self = running,
            Err(err) => {
                *self = ViewerApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running {
            window,
            gpu,
            mesh_pass,
            scene,
            clear_color,
            last_frame,
            minimized,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    scene.input.set_key(code, event.state);
                    if code == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Right,
                ..
            } => {
                let captured = scene.input.toggle_mouse_capture();
                set_cursor_captured(window, captured);
            }
            WindowEvent::Focused(false) => {
                scene.input.clear_keys();
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    *minimized = true;
                    event_loop.set_control_flow(ControlFlow::Wait);
                } else {
                    gpu.resize(size.width, size.height);
                    if *minimized {
                        *minimized = false;
                        *last_frame = Instant::now();
                        event_loop.set_control_flow(ControlFlow::Poll);
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if *minimized {
                    return;
                }

                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                scene.update(dt);
                let plan = scene.plan(gpu.aspect());

                let output = match gpu.surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure();
                        window.request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Surface timed out, skipping frame");
                        window.request_redraw();
                        return;
                    }
                    Err(err) => {
                        log::error!("Surface error: {err}");
                        event_loop.exit();
                        return;
                    }
                };
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                mesh_pass.render(gpu, &view, *clear_color, scene, &plan);
                output.present();

                window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        let ViewerApp::Running { scene, .. } = self else {
            return;
        };

        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if !scene.input.mouse_active {
                return;
            }
            let cursor = scene.input.accumulate_motion(dx, dy);
            if let Some(delta) = scene.input.cursor_delta(cursor.x, cursor.y) {
                scene.controller.mouse_look(&mut scene.camera, delta);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // A failed start keeps its error for `run`.
        if !matches!(self, ViewerApp::Running { .. }) {
            return;
        }
        if let ViewerApp::Running {
            mesh_pass, scene, ..
        } = std::mem::replace(self, ViewerApp::Finished)
        {
            scene.release();
            mesh_pass.destroy();
            log::info!("Shut down");
        }
    }
}

/// Grabs and hides the cursor for mouselook, or releases it.
fn set_cursor_captured(window: &Window, captured: bool) {
    if captured {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(err) = grabbed {
            log::warn!("Cursor grab unavailable: {err}");
        }
    } else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
        log::warn!("Cursor release failed: {err}");
    }
    window.set_cursor_visible(!captured);
}
