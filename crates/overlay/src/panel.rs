use trigon_common::Color;
use trigon_kernel::RenderState;

/// Editable copy of the render parameters, as the widgets see them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlValues {
    pub visible: bool,
    pub size: f32,
    /// Unmultiplied RGBA.
    pub color: [f32; 4],
}

impl ControlValues {
    pub fn from_state(state: &RenderState) -> Self {
        Self {
            visible: state.visible(),
            size: state.size(),
            color: state.color().to_array(),
        }
    }

    /// Write the values back through the state's clamping setters.
    /// Returns `true` if anything changed.
    pub fn apply(&self, state: &mut RenderState) -> bool {
        let mut changed = state.set_visible(self.visible);
        changed |= state.set_size(self.size);
        changed |= state.set_color(Color::from_array(self.color));
        changed
    }
}

/// Floating window with a checkbox, a size slider, and a color editor.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    title: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new("Triangle Controls")
    }
}

impl ControlPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lay out the panel for this frame and apply any edits to `state`.
    pub fn show(&self, ctx: &egui::Context, state: &mut RenderState) -> bool {
        let mut values = ControlValues::from_state(state);
        let before = values;

        egui::Window::new(self.title.as_str())
            .resizable(false)
            .default_pos(egui::pos2(16.0, 16.0))
            .show(ctx, |ui| {
                ui.label("Welcome to trigon");
                ui.checkbox(&mut values.visible, "Draw Triangle");
                ui.add(
                    egui::Slider::new(
                        &mut values.size,
                        RenderState::MIN_SIZE..=RenderState::MAX_SIZE,
                    )
                    .text("Size"),
                );
                ui.horizontal(|ui| {
                    // The picker round-trips through HSVA; only take its output on edit.
                    let mut color = values.color;
                    if ui.color_edit_button_rgba_unmultiplied(&mut color).changed() {
                        values.color = color;
                    }
                    ui.label("Color");
                });
                ui.separator();
                ui.small(format!("generation {}", state.generation()));
            });

        if values == before {
            return false;
        }
        let changed = values.apply(state);
        if changed {
            tracing::debug!(
                visible = state.visible(),
                size = state.size(),
                "overlay updated render state"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_roundtrip_state() {
        let state = RenderState::with_values(false, 1.25, Color::new(0.1, 0.2, 0.3, 0.4));
        let values = ControlValues::from_state(&state);
        assert!(!values.visible);
        assert_eq!(values.size, 1.25);
        assert_eq!(values.color, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn apply_clamps_through_setters() {
        let mut state = RenderState::default();
        let values = ControlValues {
            visible: false,
            size: 7.0,
            color: [2.0, 0.5, -1.0, 1.0],
        };
        assert!(values.apply(&mut state));
        assert!(!state.visible());
        assert_eq!(state.size(), RenderState::MAX_SIZE);
        assert_eq!(state.color(), Color::new(1.0, 0.5, 0.0, 1.0));
    }

    #[test]
    fn apply_unchanged_values_is_a_noop() {
        let mut state = RenderState::default();
        let values = ControlValues::from_state(&state);
        assert!(!values.apply(&mut state));
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn idle_frame_leaves_state_untouched() {
        let ctx = egui::Context::default();
        let panel = ControlPanel::default();
        let mut state = RenderState::default();
        let mut changed = true;

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed = panel.show(ctx, &mut state);
        });

        assert!(!changed);
        assert_eq!(state, RenderState::default());
    }

    #[test]
    fn default_title() {
        assert_eq!(ControlPanel::default().title(), "Triangle Controls");
    }
}
