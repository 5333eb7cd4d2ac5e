use trigon_common::Viewport;

/// Keys the render loop distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// A window/platform event, already stripped of platform types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(Key),
    KeyReleased(Key),
    /// Framebuffer size in physical pixels.
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// A high-level action the render loop applies between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the loop and release resources.
    RequestClose,
    /// Use this viewport from the next frame on.
    ResizeViewport(Viewport),
    /// Nothing to do.
    Noop,
}

/// Map one input event to the action it triggers.
pub fn map_event(event: &InputEvent) -> Action {
    let action = match *event {
        InputEvent::CloseRequested | InputEvent::KeyPressed(Key::Escape) => Action::RequestClose,
        InputEvent::Resized { width, height } => {
            let viewport = Viewport::full(width, height);
            if viewport.is_empty() {
                Action::Noop
            } else {
                Action::ResizeViewport(viewport)
            }
        }
        InputEvent::KeyPressed(Key::Other) | InputEvent::KeyReleased(_) => Action::Noop,
    };
    if action != Action::Noop {
        tracing::trace!(?event, ?action, "input mapped");
    }
    action
}
