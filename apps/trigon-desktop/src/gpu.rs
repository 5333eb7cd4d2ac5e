use crate::config::AppConfig;
use crate::overlay::OverlayLayer;
use std::sync::Arc;
use trigon_render_wgpu::{CompiledShader, ShaderError, WgpuFrameRenderer};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

/// Fatal startup failures. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Window, surface, device, and the Frame Renderer bound to them.
///
/// Field order is drop order: the renderer's program and buffers go first,
/// then the overlay, then the surface, device, and window.
pub struct GpuContext {
    pub renderer: WgpuFrameRenderer,
    pub overlay: Option<OverlayLayer>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub window: Arc<Window>,
}

impl GpuContext {
    pub fn new(
        event_loop: &ActiveEventLoop,
        app: &AppConfig,
        shader: &CompiledShader,
    ) -> Result<Self, StartupError> {
        let attrs = Window::default_attributes()
            .with_title(app.title.as_str())
            .with_inner_size(PhysicalSize::new(app.width, app.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(StartupError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("trigon_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // A non-sRGB target stores the uniform color unchanged.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(StartupError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuFrameRenderer::new(
            &device,
            surface_format,
            shader,
            app.frame.clone(),
            config.width,
            config.height,
        )?;

        let overlay = app
            .overlay
            .then(|| OverlayLayer::new(&window, &device, surface_format));

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        Ok(Self {
            renderer,
            overlay,
            surface,
            device,
            queue,
            config,
            window,
        })
    }

    /// Reconfigure the surface and move the renderer's viewport to `(0, 0, width, height)`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(self.config.width, self.config.height);
    }

    /// Release everything in a fixed order: program and geometry, then the context.
    pub fn release(self) {
        let GpuContext {
            renderer,
            overlay,
            surface,
            device,
            queue,
            config: _,
            window,
        } = self;
        drop(renderer);
        tracing::debug!("program and geometry released");
        drop(overlay);
        drop(surface);
        drop(queue);
        drop(device);
        drop(window);
        tracing::debug!("context released");
    }
}
