use egui::Context as EguiContext;
use trigon_kernel::RenderState;
use trigon_overlay::ControlPanel;
use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated overlay output for one frame, painted after the scene.
pub struct OverlayFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    pixels_per_point: f32,
}

/// Texture updates egui has emitted but the painter has not applied yet.
///
/// egui sends the font atlas once; a frame that is never painted must not
/// lose it.
#[derive(Default)]
struct PendingTextures {
    delta: egui::TexturesDelta,
}

impl PendingTextures {
    fn push(&mut self, delta: egui::TexturesDelta) {
        self.delta.append(delta);
    }

    fn take(&mut self) -> egui::TexturesDelta {
        std::mem::take(&mut self.delta)
    }
}

/// egui context plus its winit input adapter and wgpu painter.
pub struct OverlayLayer {
    renderer: egui_wgpu::Renderer,
    winit: egui_winit::State,
    ctx: EguiContext,
    panel: ControlPanel,
    textures: PendingTextures,
}

impl OverlayLayer {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = EguiContext::default();
        let winit = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            renderer,
            winit,
            ctx,
            panel: ControlPanel::default(),
            textures: PendingTextures::default(),
        }
    }

    /// Feed a window event to egui. Returns `true` if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit.on_window_event(window, event).consumed
    }

    /// Run the control panel, writing edits into `state`.
    pub fn run(&mut self, window: &Window, state: &mut RenderState) -> OverlayFrame {
        let raw_input = self.winit.take_egui_input(window);
        let panel = &self.panel;
        let full_output = self.ctx.run(raw_input, |ctx| {
            panel.show(ctx, state);
        });

        self.winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        self.textures.push(full_output.textures_delta);

        OverlayFrame {
            paint_jobs,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// Draw the overlay on top of whatever is already in `view`.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: OverlayFrame,
        size_in_pixels: [u32; 2],
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: frame.pixels_per_point,
        };

        let textures_delta = self.textures.take();
        for (id, image_delta) in &textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("overlay_encoder"),
        });
        self.renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &frame.paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &frame.paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));

        for id in &textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
