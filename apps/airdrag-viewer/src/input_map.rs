//! winit events to [`InputEvent`].

use airdrag_input::{ButtonState, InputEvent, Key};
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub fn key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::Space => Key::Space,
        _ => Key::Other,
    }
}

fn button_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Window events the router cares about. Everything else is `None`.
pub fn window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    repeat,
                    ..
                },
            ..
        } => Some(InputEvent::Key {
            key: key(*code),
            state: button_state(*state),
            repeat: *repeat,
        }),
        WindowEvent::MouseInput { state, .. } => Some(InputEvent::MouseButton {
            state: button_state(*state),
        }),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x,
            y: position.y,
        }),
        WindowEvent::Resized(size) => Some(InputEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        _ => None,
    }
}

pub fn device_event(event: &DeviceEvent) -> Option<InputEvent> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => {
            Some(InputEvent::MouseMotion { dx: *dx, dy: *dy })
        }
        _ => None,
    }
}
