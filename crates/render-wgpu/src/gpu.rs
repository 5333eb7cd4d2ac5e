use crate::program::{CompiledShader, ShaderError, ShaderProgram};
use bytemuck::{Pod, Zeroable};
use trigon_common::Viewport;
use trigon_kernel::RenderState;
use trigon_render::{DrawOutcome, FrameConfig};
use wgpu::util::DeviceExt;

/// Mirrors the WGSL `Uniforms` struct: `vec4` color, then `size`, padded to 32 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Uniforms {
    color: [f32; 4],
    size: f32,
    _pad: [f32; 3],
}

impl Uniforms {
    fn from_state(state: &RenderState) -> Self {
        Self {
            color: state.color().to_array(),
            size: state.size(),
            _pad: [0.0; 3],
        }
    }
}

/// GPU Frame Renderer: one program, one vertex/index buffer pair, one draw.
///
/// Field order is drop order: buffers and the program are released before
/// whatever owns the device.
pub struct WgpuFrameRenderer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    program: ShaderProgram,
    clear_color: wgpu::Color,
    viewport: Viewport,
    /// Last values written to `uniform_buffer`.
    uploaded: Option<Uniforms>,
    uploads: u64,
}

impl WgpuFrameRenderer {
    /// Link `shader` for `surface_format` and upload the configured geometry.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader: &CompiledShader,
        config: FrameConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, ShaderError> {
        let program = ShaderProgram::link(device, shader, surface_format)?;

        let initial = Uniforms::from_state(&RenderState::default());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &program.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let geometry = &config.geometry;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: bytemuck::cast_slice(geometry.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("index_buffer"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let c = config.clear_color;
        let clear_color = wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        };

        tracing::info!(
            vertices = geometry.vertex_count(),
            indices = geometry.index_count(),
            "geometry uploaded"
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.index_count(),
            uniform_buffer,
            uniform_bind_group,
            program,
            clear_color,
            viewport: Viewport::full(width, height),
            uploaded: Some(initial),
            uploads: 0,
        })
    }

    /// New target size; the viewport becomes `(0, 0, width, height)` for the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::full(width, height);
        tracing::debug!(viewport = %self.viewport, "viewport updated");
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Uniform writes issued by `render_frame` so far.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Render one frame into `view`: clear, then draw if `state` is visible.
    pub fn render_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        state: &RenderState,
    ) -> DrawOutcome {
        if self.viewport.is_empty() {
            return DrawOutcome::NoTarget;
        }

        if state.visible() {
            let uniforms = Uniforms::from_state(state);
            if self.uploaded != Some(uniforms) {
                queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                self.uploaded = Some(uniforms);
                self.uploads += 1;
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if state.visible() {
                let vp = self.viewport;
                pass.set_viewport(
                    vp.x as f32,
                    vp.y as f32,
                    vp.width as f32,
                    vp.height as f32,
                    0.0,
                    1.0,
                );
                pass.set_pipeline(&self.program.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));

        if state.visible() {
            DrawOutcome::Drawn {
                index_count: self.index_count,
            }
        } else {
            DrawOutcome::Hidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::TRIANGLE_SHADER;
    use trigon_common::Color;
    use trigon_geometry::GeometryPreset;

    const TARGET: u32 = 64;
    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// A device without a surface, or `None` on machines with no adapter.
    fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None)).ok()
    }

    fn target(device: &wgpu::Device) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: wgpu::Extent3d {
                width: TARGET,
                height: TARGET,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Copy `texture` back as tightly packed RGBA8 rows.
    fn read_back(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Vec<[u8; 4]> {
        // 64 px * 4 bytes is already a multiple of the 256-byte row alignment.
        let bytes_per_row = TARGET * 4;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test_readback"),
            size: (bytes_per_row * TARGET) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(TARGET),
                },
            },
            texture.size(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |r| r.unwrap());
        device.poll(wgpu::Maintain::Wait);
        let pixels = bytemuck::cast_slice::<u8, [u8; 4]>(&slice.get_mapped_range()).to_vec();
        buffer.unmap();
        pixels
    }

    fn pixel(pixels: &[[u8; 4]], x: u32, y: u32) -> [u8; 4] {
        pixels[(y * TARGET + x) as usize]
    }

    fn near(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
    }

    #[test]
    fn render_frame_draws_gates_and_skips_uploads() {
        let Some((device, queue)) = headless_device() else {
            eprintln!("no wgpu adapter; skipping");
            return;
        };
        let shader = CompiledShader::compile("triangle", TRIANGLE_SHADER).unwrap();
        let config = FrameConfig::with_preset(GeometryPreset::Quad);
        let background = config.clear_color.to_rgba8();
        let mut renderer =
            WgpuFrameRenderer::new(&device, TARGET_FORMAT, &shader, config, TARGET, TARGET).unwrap();

        let texture = target(&device);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let green = RenderState::with_values(true, 1.0, Color::new(0.0, 1.0, 0.0, 1.0));

        let outcome = renderer.render_frame(&device, &queue, &view, &green);
        assert_eq!(outcome, DrawOutcome::Drawn { index_count: 6 });
        assert_eq!(renderer.uploads(), 1);
        let pixels = read_back(&device, &queue, &texture);
        // Unit quad spans 16..48 on a 64 px target.
        assert_eq!(pixel(&pixels, 20, 44), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 44, 20), [0, 255, 0, 255]);
        assert!(near(pixel(&pixels, 2, 2), background));
        assert!(near(pixel(&pixels, 60, 32), background));

        // Same values: no second upload.
        renderer.render_frame(&device, &queue, &view, &green);
        assert_eq!(renderer.uploads(), 1);

        let hidden = RenderState::with_values(false, 1.0, Color::new(1.0, 0.0, 0.0, 1.0));
        let outcome = renderer.render_frame(&device, &queue, &view, &hidden);
        assert_eq!(outcome, DrawOutcome::Hidden);
        assert_eq!(renderer.uploads(), 1);
        let pixels = read_back(&device, &queue, &texture);
        assert!(near(pixel(&pixels, 32, 32), background));
        assert!(near(pixel(&pixels, 20, 44), background));
    }

    #[test]
    fn uniforms_match_wgsl_layout() {
        // vec4<f32> (16) + f32 (4), rounded up to the struct alignment of 16.
        assert_eq!(std::mem::size_of::<Uniforms>(), 32);
        assert_eq!(std::mem::offset_of!(Uniforms, size), 16);
    }

    #[test]
    fn uniforms_follow_state() {
        let state = RenderState::with_values(true, 1.5, Color::new(0.0, 0.5, 1.0, 1.0));
        let u = Uniforms::from_state(&state);
        assert_eq!(u.size, 1.5);
        assert_eq!(u.color, [0.0, 0.5, 1.0, 1.0]);
        assert_ne!(u, Uniforms::from_state(&RenderState::default()));
    }
}
