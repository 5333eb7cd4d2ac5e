use std::borrow::Cow;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Position-only vertex, matching `@location(0) position: vec3<f32>`.
pub(crate) const VERTEX_STRIDE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

/// Errors from building the shader program. All carry a non-empty diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("shader compilation failed:\n{diagnostic}")]
    Compile { diagnostic: String },
    #[error("shader has no {stage} entry point named `{name}`")]
    MissingEntryPoint { stage: &'static str, name: &'static str },
    #[error("shader program failed to link:\n{diagnostic}")]
    Link { diagnostic: String },
}

impl ShaderError {
    /// Human-readable diagnostic text.
    pub fn diagnostic(&self) -> String {
        match self {
            ShaderError::Compile { diagnostic } | ShaderError::Link { diagnostic } => {
                diagnostic.clone()
            }
            other => other.to_string(),
        }
    }

    fn non_empty(diagnostic: String, fallback: &str) -> String {
        if diagnostic.trim().is_empty() {
            fallback.to_string()
        } else {
            diagnostic
        }
    }
}

/// WGSL source that parsed, validated, and exposes both entry points.
///
/// Compilation runs on the CPU through naga, so it can be checked before any
/// device exists.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    label: String,
    source: Cow<'static, str>,
}

impl CompiledShader {
    pub fn compile(
        label: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Result<Self, ShaderError> {
        let label = label.into();
        let source = source.into();

        let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Compile {
            diagnostic: ShaderError::non_empty(e.emit_to_string(&source), "WGSL parse error"),
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator
            .validate(&module)
            .map_err(|e| ShaderError::Compile {
                diagnostic: ShaderError::non_empty(
                    e.emit_to_string(&source),
                    "WGSL validation error",
                ),
            })?;

        for (stage, name, kind) in [
            (naga::ShaderStage::Vertex, VERTEX_ENTRY, "vertex"),
            (naga::ShaderStage::Fragment, FRAGMENT_ENTRY, "fragment"),
        ] {
            let found = module
                .entry_points
                .iter()
                .any(|ep| ep.stage == stage && ep.name == name);
            if !found {
                return Err(ShaderError::MissingEntryPoint { stage: kind, name });
            }
        }

        tracing::debug!(label = %label, "shader compiled");
        Ok(Self { label, source })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A linked render pipeline plus the layout of its uniform slot.
pub struct ShaderProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_layout: wgpu::BindGroupLayout,
}

impl ShaderProgram {
    /// Create the module and pipeline inside a validation error scope.
    ///
    /// Any error the device reports while linking is returned instead of
    /// being deferred to the first draw.
    pub fn link(
        device: &wgpu::Device,
        shader: &CompiledShader,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label()),
            source: wgpu::ShaderSource::Wgsl(shader.source().into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frame_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                diagnostic: ShaderError::non_empty(err.to_string(), "pipeline validation error"),
            });
        }

        tracing::info!(label = shader.label(), format = ?target_format, "shader program linked");
        Ok(Self {
            pipeline,
            uniform_layout,
        })
    }
}
