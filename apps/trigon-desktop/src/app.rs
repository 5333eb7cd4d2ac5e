use crate::config::AppConfig;
use crate::gpu::{GpuContext, StartupError};
use anyhow::Context as _;
use trigon_input::{Action, InputEvent, Key, map_event};
use trigon_kernel::{Lifecycle, RenderState};
use trigon_render::DrawOutcome;
use trigon_render_wgpu::CompiledShader;
use winit::application::ApplicationHandler;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

/// The render loop: owns the render state, the lifecycle, and the GPU context.
pub struct DesktopApp {
    config: AppConfig,
    lifecycle: Lifecycle,
    state: RenderState,
    gpu: Option<GpuContext>,
    failure: Option<anyhow::Error>,
    frames: u64,
}

impl DesktopApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            state: RenderState::default(),
            gpu: None,
            failure: None,
            frames: 0,
        }
    }

    /// `Ok` after a normal close, the startup error otherwise.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Load and compile the configured WGSL on the CPU.
    fn compile_shader(&self) -> anyhow::Result<CompiledShader> {
        let (label, source) = self
            .config
            .shader
            .load()
            .with_context(|| format!("failed to read shader {:?}", self.config.shader))?;
        let shader = CompiledShader::compile(label, source).map_err(StartupError::from)?;
        Ok(shader)
    }

    /// `Idle -> Ready`: verify the shader, then bring up window, device, and renderer.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let shader = self.compile_shader()?;

        let gpu = GpuContext::new(event_loop, &self.config, &shader)?;
        self.gpu = Some(gpu);
        self.lifecycle.enter_ready()?;
        tracing::info!(
            geometry_indices = self.config.frame.geometry.index_count(),
            overlay = self.config.overlay,
            "renderer ready"
        );
        Ok(())
    }

    /// `Idle -> Terminated`: drop anything half-built and remember why.
    fn fail_startup(&mut self, error: anyhow::Error) {
        tracing::error!("startup failed: {error:#}");
        self.gpu = None;
        if let Err(e) = self.lifecycle.terminate() {
            tracing::debug!("terminate after failed startup ignored: {e}");
        }
        self.failure = Some(error);
    }

    /// `Ready -> Terminated`: release GPU resources and leave the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.lifecycle.terminate() {
            tracing::debug!("shutdown ignored: {e}");
            return;
        }
        if let Some(gpu) = self.gpu.take() {
            gpu.release();
        }
        tracing::info!(frames = self.frames, "renderer terminated");
        event_loop.exit();
    }

    fn apply(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        match action {
            Action::RequestClose => self.shutdown(event_loop),
            Action::ResizeViewport(viewport) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(viewport.width, viewport.height);
                }
            }
            Action::Noop => {}
        }
    }

    fn redraw(&mut self) {
        if !self.lifecycle.is_ready() {
            return;
        }
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // The overlay only runs for frames that will be presented, and its
        // edits land in the state before the uniforms are pushed.
        let overlay_frame = match gpu.overlay.as_mut() {
            Some(overlay) => Some(overlay.run(&gpu.window, &mut self.state)),
            None => None,
        };

        let outcome = gpu
            .renderer
            .render_frame(&gpu.device, &gpu.queue, &view, &self.state);
        if outcome == DrawOutcome::NoTarget {
            tracing::trace!("frame skipped: empty viewport");
        }

        if let (Some(overlay), Some(frame)) = (gpu.overlay.as_mut(), overlay_frame) {
            overlay.paint(
                &gpu.device,
                &gpu.queue,
                &view,
                frame,
                [gpu.config.width, gpu.config.height],
            );
        }

        output.present();
        self.frames += 1;
        gpu.window.request_redraw();
    }
}

/// Strip a winit event down to what the input mapping understands.
fn translate(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        WindowEvent::Resized(size) => Some(InputEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key,
                    state,
                    ..
                },
            ..
        } => {
            let key = match physical_key {
                PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
                _ => Key::Other,
            };
            Some(if state.is_pressed() {
                InputEvent::KeyPressed(key)
            } else {
                InputEvent::KeyReleased(key)
            })
        }
        _ => None,
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle != Lifecycle::Idle {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail_startup(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let mut consumed = false;
        if let Some(gpu) = &mut self.gpu {
            if let Some(overlay) = &mut gpu.overlay {
                consumed = overlay.on_window_event(&gpu.window, &event);
            }
        }

        if let WindowEvent::RedrawRequested = event {
            self.redraw();
            return;
        }

        let Some(input) = translate(&event) else {
            return;
        };
        // Keys typed into the overlay stay there; window-level events always apply.
        if consumed && matches!(input, InputEvent::KeyPressed(_) | InputEvent::KeyReleased(_)) {
            return;
        }
        self.apply(map_event(&input), event_loop);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}
