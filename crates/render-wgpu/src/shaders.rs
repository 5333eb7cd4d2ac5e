/// WGSL program: positions scaled by `size`, filled with a flat `color`.
pub const TRIANGLE_SHADER: &str = r#"
struct Uniforms {
    color: vec4<f32>,
    size: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(uniforms.size * position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return uniforms.color;
}
"#;
