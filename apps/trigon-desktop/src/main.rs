mod app;
mod config;
mod gpu;
mod overlay;

use app::DesktopApp;
use clap::Parser;
use config::{AppConfig, ShaderOrigin};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use trigon_geometry::GeometryPreset;
use winit::event_loop::{ControlFlow, EventLoop};

/// Process status for any startup failure (`-1` as an exit byte).
const STARTUP_FAILURE: u8 = 255;

#[derive(Parser)]
#[command(
    name = "trigon-desktop",
    about = "Uniform-driven triangle renderer with a live control overlay"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in pixels
    #[arg(long, default_value_t = AppConfig::DEFAULT_WIDTH)]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = AppConfig::DEFAULT_HEIGHT)]
    height: u32,

    /// Geometry to draw: triangle or quad
    #[arg(short, long, default_value_t = GeometryPreset::Triangle)]
    geometry: GeometryPreset,

    /// Hide the control overlay; parameters stay at their defaults
    #[arg(long)]
    no_overlay: bool,

    /// Load the WGSL program from a file instead of the built-in one
    #[arg(long)]
    shader: Option<PathBuf>,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let mut config = AppConfig::new(cli.geometry);
        config.width = cli.width.max(1);
        config.height = cli.height.max(1);
        config.overlay = !cli.no_overlay;
        if let Some(path) = cli.shader {
            config.shader = ShaderOrigin::File(path);
        }
        config
    }
}

fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(config);
    event_loop.run_app(&mut app)?;
    app.into_result()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("trigon-desktop starting");

    match run(AppConfig::from(cli)) {
        Ok(()) => {
            tracing::info!("trigon-desktop exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("trigon-desktop failed: {e:#}");
            ExitCode::from(STARTUP_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_maps_to_config() {
        let cli = Cli::parse_from([
            "trigon-desktop",
            "--width",
            "1024",
            "--height",
            "0",
            "--geometry",
            "quad",
            "--no-overlay",
        ]);
        let config = AppConfig::from(cli);
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 1);
        assert!(!config.overlay);
        assert_eq!(config.frame.geometry.index_count(), 6);
        assert_eq!(config.shader, ShaderOrigin::Builtin);
    }

    #[test]
    fn shader_flag_selects_file() {
        let cli = Cli::parse_from(["trigon-desktop", "--shader", "custom.wgsl"]);
        let config = AppConfig::from(cli);
        assert_eq!(config.shader, ShaderOrigin::File(PathBuf::from("custom.wgsl")));
    }
}
