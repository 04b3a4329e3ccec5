/// A key the viewer reacts to. Backends map their own key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKey {
    /// Move along the view direction.
    Forward,
    /// Move against the view direction.
    Backward,
    /// Strafe against the right vector.
    Left,
    /// Strafe along the right vector.
    Right,
    /// Request the viewer to close.
    Close,
}

impl ViewKey {
    /// The four keys sampled every frame for movement.
    pub const MOVEMENT: [ViewKey; 4] = [
        ViewKey::Forward,
        ViewKey::Backward,
        ViewKey::Left,
        ViewKey::Right,
    ];
}

/// A high-level input event produced by the windowing backend.
///
/// Events are queued as they arrive and drained once per frame by the
/// frame driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key transition. Auto-repeat is not reported as a new press.
    Key { key: ViewKey, pressed: bool },
    /// Cursor position in physical window pixels.
    CursorMoved { x: f32, y: f32 },
    /// Vertical scroll in lines; positive scrolls away from the user.
    Scroll { dy: f32 },
    /// The window lost keyboard focus; releases may never arrive.
    FocusLost,
    /// The window manager asked the window to close.
    CloseRequested,
}

impl InputEvent {
    pub fn press(key: ViewKey) -> Self {
        Self::Key { key, pressed: true }
    }

    pub fn release(key: ViewKey) -> Self {
        Self::Key {
            key,
            pressed: false,
        }
    }

    /// Whether this event asks the viewer to stop.
    pub fn is_close_request(&self) -> bool {
        matches!(
            self,
            InputEvent::CloseRequested
                | InputEvent::Key {
                    key: ViewKey::Close,
                    pressed: true
                }
        )
    }
}
