use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trigon_common::Color;
use trigon_geometry::GeometryPreset;
use trigon_kernel::RenderState;
use trigon_render::{FrameConfig, FrameRenderer, FrameReport, SoftwareRenderer};
use trigon_render_wgpu::{CompiledShader, TRIANGLE_SHADER};

#[derive(Parser)]
#[command(name = "trigon-cli", about = "Headless tooling for the trigon renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and default parameters
    Info,
    /// Render one frame on the CPU and report its coverage
    Render {
        #[arg(long, default_value = "200")]
        width: u32,
        #[arg(long, default_value = "200")]
        height: u32,
        /// Geometry to draw: triangle or quad
        #[arg(short, long, default_value_t = GeometryPreset::Triangle)]
        geometry: GeometryPreset,
        /// Uniform scale, clamped to [0.5, 2.0]
        #[arg(short, long, default_value_t = RenderState::DEFAULT_SIZE)]
        size: f32,
        /// Fill color as r,g,b,a in [0, 1]
        #[arg(short, long, value_parser = parse_color)]
        color: Option<Color>,
        /// Render with the draw disabled
        #[arg(long)]
        hidden: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile a WGSL program and report diagnostics
    CheckShader {
        /// WGSL file to check; the built-in program if omitted
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

/// Everything `render` prints.
#[derive(Debug, Serialize)]
struct RenderSummary {
    geometry: GeometryPreset,
    state: RenderState,
    drew: bool,
    report: FrameReport,
}

fn parse_color(s: &str) -> Result<Color, String> {
    let channels: Vec<f32> = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("bad channel {c:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match channels[..] {
        [r, g, b] => Ok(Color::new(r, g, b, 1.0)),
        [r, g, b, a] => Ok(Color::new(r, g, b, a)),
        _ => Err(format!("expected 3 or 4 channels, got {}", channels.len())),
    }
}

fn render_summary(
    geometry: GeometryPreset,
    width: u32,
    height: u32,
    state: RenderState,
) -> RenderSummary {
    let mut renderer = SoftwareRenderer::new(FrameConfig::with_preset(geometry), width, height);
    let outcome = renderer.render_frame(&state);
    tracing::debug!(?outcome, "frame rendered");
    RenderSummary {
        geometry,
        state,
        drew: outcome.drew(),
        report: renderer.report(&state),
    }
}

fn check_shader(path: Option<PathBuf>) -> anyhow::Result<String> {
    let (label, source) = match path {
        Some(p) => {
            let source = std::fs::read_to_string(&p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            (p.display().to_string(), source)
        }
        None => ("triangle".to_string(), TRIANGLE_SHADER.to_string()),
    };
    let shader = CompiledShader::compile(label, source)?;
    Ok(shader.label().to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("trigon-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", trigon_render::crate_info());
            let defaults = RenderState::default();
            println!(
                "defaults: visible={} size={} color={:?}",
                defaults.visible(),
                defaults.size(),
                defaults.color().to_array()
            );
            println!(
                "size range: [{}, {}]",
                RenderState::MIN_SIZE,
                RenderState::MAX_SIZE
            );
            println!(
                "background: {:?}",
                FrameConfig::DEFAULT_CLEAR.to_array()
            );
            for preset in GeometryPreset::ALL {
                let g = preset.build();
                println!(
                    "geometry {preset}: vertices={} triangles={}",
                    g.vertex_count(),
                    g.triangle_count()
                );
            }
        }
        Commands::Render {
            width,
            height,
            geometry,
            size,
            color,
            hidden,
            json,
        } => {
            let state = RenderState::with_values(
                !hidden,
                size,
                color.unwrap_or(RenderState::DEFAULT_COLOR),
            );
            let summary = render_summary(geometry, width, height, state);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let r = &summary.report;
                println!(
                    "Frame {}x{}: geometry={} drew={} covered={} uniform_fill={}",
                    r.width, r.height, summary.geometry, summary.drew, r.covered_pixels, r.uniform_fill
                );
                match r.bounds {
                    Some(b) => println!(
                        "Bounds: x={}..={} y={}..={} ({}x{})",
                        b.min_x,
                        b.max_x,
                        b.min_y,
                        b.max_y,
                        b.width(),
                        b.height()
                    ),
                    None => println!("Bounds: none (background only)"),
                }
            }
        }
        Commands::CheckShader { path } => match check_shader(path) {
            Ok(label) => println!("{label}: OK"),
            Err(e) => {
                eprintln!("{e:#}");
                anyhow::bail!("shader check failed");
            }
        },
    }

    Ok(())
}
