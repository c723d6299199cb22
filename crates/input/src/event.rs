/// Keys the viewer responds to. Anything else maps to [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    S,
    A,
    D,
    Q,
    E,
    I,
    K,
    J,
    L,
    U,
    O,
    P,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

impl ButtonState {
    pub fn is_pressed(self) -> bool {
        self == ButtonState::Pressed
    }
}

/// A window-system independent input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key edge. `repeat` is set for auto-repeat presses.
    Key {
        key: Key,
        state: ButtonState,
        repeat: bool,
    },
    /// Any mouse button edge.
    MouseButton { state: ButtonState },
    /// Absolute cursor position in window pixels.
    CursorMoved { x: f64, y: f64 },
    /// Raw pointer motion, used while the cursor is captured.
    MouseMotion { dx: f64, dy: f64 },
    /// New viewport size in pixels.
    Resized { width: u32, height: u32 },
}

impl InputEvent {
    pub fn press(key: Key) -> Self {
        InputEvent::Key {
            key,
            state: ButtonState::Pressed,
            repeat: false,
        }
    }

    pub fn release(key: Key) -> Self {
        InputEvent::Key {
            key,
            state: ButtonState::Released,
            repeat: false,
        }
    }

    pub fn repeat(key: Key) -> Self {
        InputEvent::Key {
            key,
            state: ButtonState::Pressed,
            repeat: true,
        }
    }
}
