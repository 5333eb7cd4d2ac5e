use crate::renderer::{DrawOutcome, FrameConfig, FrameRenderer};
use glam::{Vec2, Vec3};
use serde::Serialize;
use trigon_common::{Color, Viewport};
use trigon_kernel::RenderState;

/// RGBA8 color target, row 0 at the top.
///
/// Alongside the colors it counts the fragments written to each pixel, so
/// coverage does not depend on the fill differing from the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    fragments: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
            fragments: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Fragments written to `(x, y)` since the last clear.
    pub fn fragments(&self, x: u32, y: u32) -> u8 {
        self.fragments[(y * self.width + x) as usize]
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        self.pixels.fill(rgba);
        self.fragments.fill(0);
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y * self.width + x) as usize;
        self.pixels[i] = rgba;
        self.fragments[i] = self.fragments[i].saturating_add(1);
    }

    /// Summarize the pixels written since the last clear.
    pub fn report(&self, fill: Color) -> FrameReport {
        let fg = fill.to_rgba8();
        let mut covered = 0usize;
        let mut uniform = true;
        let mut bounds: Option<PixelBounds> = None;

        for (i, (px, frags)) in self.pixels.iter().zip(&self.fragments).enumerate() {
            if *frags == 0 {
                continue;
            }
            covered += 1;
            uniform &= *px == fg;
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            bounds = Some(match bounds {
                None => PixelBounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => PixelBounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }

        FrameReport {
            width: self.width,
            height: self.height,
            covered_pixels: covered,
            bounds,
            uniform_fill: uniform,
        }
    }
}

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Center in pixel units (edges, not pixel centers).
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x + 1) as f32 / 2.0,
            (self.min_y + self.max_y + 1) as f32 / 2.0,
        )
    }
}

/// Coverage summary of one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub width: u32,
    pub height: u32,
    /// Pixels written by at least one fragment.
    pub covered_pixels: usize,
    pub bounds: Option<PixelBounds>,
    /// Every covered pixel equals the fill color.
    pub uniform_fill: bool,
}

/// CPU reference implementation of the frame contract.
///
/// Mirrors the GPU pipeline: positions are scaled by `size` into clip space,
/// mapped through the viewport, and filled with `color` at pixel centers.
/// No culling, no blending, no depth.
pub struct SoftwareRenderer {
    config: FrameConfig,
    viewport: Viewport,
    target: Framebuffer,
}

impl SoftwareRenderer {
    pub fn new(config: FrameConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            viewport: Viewport::full(width, height),
            target: Framebuffer::new(width, height),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// The last rendered frame.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.target
    }

    /// Coverage report of the last frame against `state`'s color.
    pub fn report(&self, state: &RenderState) -> FrameReport {
        self.target.report(state.color())
    }

    fn to_screen(&self, p: Vec3, size: f32) -> Vec2 {
        let ndc = p.truncate() * size;
        let vp = self.viewport;
        Vec2::new(
            vp.x as f32 + (ndc.x + 1.0) * 0.5 * vp.width as f32,
            vp.y as f32 + (1.0 - ndc.y) * 0.5 * vp.height as f32,
        )
    }

    fn fill_triangle(&mut self, [a, b, c]: [Vec2; 3], rgba: [u8; 4]) {
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        // Both windings are drawn; normalize to positive area.
        let (b, c) = if area > 0.0 { (b, c) } else { (c, b) };

        let vp = self.viewport;
        let x_end = (vp.x + vp.width).min(self.target.width) as f32;
        let y_end = (vp.y + vp.height).min(self.target.height) as f32;
        let x0 = a.x.min(b.x).min(c.x).floor().max(vp.x as f32) as u32;
        let y0 = a.y.min(b.y).min(c.y).floor().max(vp.y as f32) as u32;
        let x1 = a.x.max(b.x).max(c.x).ceil().min(x_end) as u32;
        let y1 = a.y.max(b.y).max(c.y).ceil().min(y_end) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let inside = covers(b, c, p) && covers(c, a, p) && covers(a, b, p);
                if inside {
                    self.target.put(x, y, rgba);
                }
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left fill rule: a centre exactly on an edge belongs to the triangle
/// only if that edge is a top or left edge. Shared edges are written once.
fn covers(a: Vec2, b: Vec2, p: Vec2) -> bool {
    let w = edge(a, b, p);
    w > 0.0 || (w == 0.0 && is_top_left(a, b))
}

/// For positive-area triangles in y-down screen space.
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    (a.y == b.y && b.x > a.x) || b.y < a.y
}

impl FrameRenderer for SoftwareRenderer {
    type Output = DrawOutcome;

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::full(width, height);
        self.target = Framebuffer::new(width, height);
        tracing::debug!(viewport = %self.viewport, "software target resized");
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render_frame(&mut self, state: &RenderState) -> DrawOutcome {
        if self.viewport.is_empty() {
            return DrawOutcome::NoTarget;
        }

        self.target.clear(self.config.clear_color.to_rgba8());
        if !state.visible() {
            return DrawOutcome::Hidden;
        }

        let rgba = state.color().to_rgba8();
        let size = state.size();
        let triangles: Vec<[Vec2; 3]> = self
            .config
            .geometry
            .triangle_positions()
            .map(|t| t.map(|p| self.to_screen(p, size)))
            .collect();
        for tri in triangles {
            self.fill_triangle(tri, rgba);
        }

        DrawOutcome::Drawn {
            index_count: self.config.geometry.index_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigon_geometry::GeometryPreset;

    fn renderer(preset: GeometryPreset, w: u32, h: u32) -> SoftwareRenderer {
        SoftwareRenderer::new(FrameConfig::with_preset(preset), w, h)
    }

    fn state(visible: bool, size: f32, color: Color) -> RenderState {
        RenderState::with_values(visible, size, color)
    }

    #[test]
    fn hidden_frame_is_pure_background() {
        let mut r = renderer(GeometryPreset::Quad, 64, 48);
        let outcome = r.render_frame(&state(false, 2.0, Color::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(outcome, DrawOutcome::Hidden);

        let bg = FrameConfig::DEFAULT_CLEAR.to_rgba8();
        assert!(r.framebuffer().pixels().iter().all(|px| *px == bg));
    }

    #[test]
    fn covered_pixels_equal_the_uniform_color() {
        let color = Color::new(0.1, 0.9, 0.4, 0.5);
        for preset in GeometryPreset::ALL {
            let mut r = renderer(preset, 120, 90);
            let s = state(true, 1.0, color);
            r.render_frame(&s);
            let report = r.report(&s);
            assert!(report.covered_pixels > 0, "{preset} drew nothing");
            assert!(report.uniform_fill, "{preset} has blended pixels");
        }
    }

    #[test]
    fn draw_covers_full_index_sequence() {
        let mut r = renderer(GeometryPreset::Quad, 32, 32);
        assert_eq!(
            r.render_frame(&RenderState::default()),
            DrawOutcome::Drawn { index_count: 6 }
        );
        let mut r = renderer(GeometryPreset::Triangle, 32, 32);
        assert_eq!(
            r.render_frame(&RenderState::default()),
            DrawOutcome::Drawn { index_count: 3 }
        );
    }

    #[test]
    fn quad_extent_scales_linearly_about_the_center() {
        let mut r = renderer(GeometryPreset::Quad, 200, 200);
        for (size, expected) in [(0.5, 50), (1.0, 100), (1.5, 150), (2.0, 200)] {
            let s = state(true, size, RenderState::DEFAULT_COLOR);
            r.render_frame(&s);
            let bounds = r.report(&s).bounds.unwrap();
            assert_eq!(bounds.width(), expected, "size {size}");
            assert_eq!(bounds.height(), expected, "size {size}");
            assert_eq!(bounds.center(), (100.0, 100.0), "size {size}");
        }
    }

    #[test]
    fn triangle_extent_scales_linearly() {
        let mut r = renderer(GeometryPreset::Triangle, 400, 400);
        let base = {
            let s = state(true, 1.0, RenderState::DEFAULT_COLOR);
            r.render_frame(&s);
            r.report(&s).bounds.unwrap()
        };
        for size in [0.5_f32, 1.5] {
            let s = state(true, size, RenderState::DEFAULT_COLOR);
            r.render_frame(&s);
            let b = r.report(&s).bounds.unwrap();
            let expected_w = base.width() as f32 * size;
            let expected_h = base.height() as f32 * size;
            assert!((b.width() as f32 - expected_w).abs() <= 2.0, "size {size}");
            assert!((b.height() as f32 - expected_h).abs() <= 2.0, "size {size}");
            // Horizontally symmetric about the viewport center.
            assert!((b.center().0 - 200.0).abs() <= 1.0, "size {size}");
        }
    }

    #[test]
    fn resize_updates_viewport_before_next_frame() {
        let mut r = renderer(GeometryPreset::Quad, 200, 200);
        r.resize(320, 240);
        assert_eq!(r.viewport(), Viewport::full(320, 240));

        let s = RenderState::default();
        r.render_frame(&s);
        assert_eq!(r.framebuffer().width(), 320);
        assert_eq!(r.framebuffer().height(), 240);

        // Unit quad keeps covering half of each axis: no stretching.
        let b = r.report(&s).bounds.unwrap();
        assert_eq!((b.width(), b.height()), (160, 120));
        assert_eq!(b.center(), (160.0, 120.0));
    }

    #[test]
    fn fill_matching_background_still_counts_as_covered() {
        let mut r = renderer(GeometryPreset::Quad, 100, 100);
        let s = state(true, 1.0, FrameConfig::DEFAULT_CLEAR);
        assert!(r.render_frame(&s).drew());

        let report = r.report(&s);
        assert_eq!(report.covered_pixels, 50 * 50);
        assert!(report.uniform_fill);
        let b = report.bounds.unwrap();
        assert_eq!((b.width(), b.height()), (50, 50));
    }

    #[test]
    fn quad_shared_edge_is_written_once() {
        let mut r = renderer(GeometryPreset::Quad, 100, 100);
        let s = RenderState::default();
        r.render_frame(&s);

        let fb = r.framebuffer();
        // Centres on the diagonal (1,3) sit exactly on both triangles' edge.
        for i in 25..75 {
            assert_eq!(fb.fragments(i, i), 1, "diagonal pixel ({i}, {i})");
        }
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                assert!(fb.fragments(x, y) <= 1, "overdraw at ({x}, {y})");
            }
        }
        assert_eq!(r.report(&s).covered_pixels, 50 * 50);
    }

    #[test]
    fn hidden_frame_clears_previous_coverage() {
        let mut r = renderer(GeometryPreset::Triangle, 64, 64);
        r.render_frame(&RenderState::default());
        let hidden = state(false, 1.0, RenderState::DEFAULT_COLOR);
        r.render_frame(&hidden);
        let report = r.report(&hidden);
        assert_eq!(report.covered_pixels, 0);
        assert!(report.bounds.is_none());
    }

    #[test]
    fn zero_sized_target_draws_nothing() {
        let mut r = renderer(GeometryPreset::Triangle, 100, 100);
        r.resize(0, 0);
        assert_eq!(r.render_frame(&RenderState::default()), DrawOutcome::NoTarget);
    }
}
