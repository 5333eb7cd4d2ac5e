use std::borrow::Cow;
use std::path::PathBuf;
use trigon_geometry::GeometryPreset;
use trigon_render::FrameConfig;
use trigon_render_wgpu::TRIANGLE_SHADER;

/// Where the shader program's WGSL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderOrigin {
    Builtin,
    File(PathBuf),
}

impl ShaderOrigin {
    /// Label plus source text.
    pub fn load(&self) -> std::io::Result<(String, Cow<'static, str>)> {
        match self {
            ShaderOrigin::Builtin => Ok(("triangle".to_string(), Cow::Borrowed(TRIANGLE_SHADER))),
            ShaderOrigin::File(path) => {
                let source = std::fs::read_to_string(path)?;
                Ok((path.display().to_string(), Cow::Owned(source)))
            }
        }
    }
}

/// Everything the desktop app needs at startup, built once from the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub frame: FrameConfig,
    pub overlay: bool,
    pub shader: ShaderOrigin,
}

impl AppConfig {
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;

    pub fn new(geometry: GeometryPreset) -> Self {
        Self {
            title: "trigon".to_string(),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            frame: FrameConfig::with_preset(geometry),
            overlay: true,
            shader: ShaderOrigin::Builtin,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(GeometryPreset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert!(cfg.overlay);
        assert_eq!(cfg.shader, ShaderOrigin::Builtin);
        assert_eq!(cfg.frame.geometry.index_count(), 3);
    }

    #[test]
    fn builtin_shader_loads() {
        let (label, source) = ShaderOrigin::Builtin.load().unwrap();
        assert_eq!(label, "triangle");
        assert!(source.contains("fs_main"));
    }

    #[test]
    fn missing_shader_file_is_an_error() {
        let origin = ShaderOrigin::File(PathBuf::from("/nonexistent/trigon/shader.wgsl"));
        assert!(origin.load().is_err());
    }
}
