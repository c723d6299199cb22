use crate::event::Key;
use airdrag_camera::Axis;

/// What a key does. The mapping is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// Translate along `axis`; `sign` scales the configured move step.
    Move { axis: Axis, sign: f32 },
    /// Rotate about `axis`; `sign` scales the configured rotate step.
    Rotate { axis: Axis, sign: f32 },
    ToggleWireframe,
    ToggleCapture,
}

pub fn binding_for(key: Key) -> Option<Binding> {
    use Binding::*;
    let binding = match key {
        Key::W => Move { axis: Axis::Z, sign: -1.0 },
        Key::S => Move { axis: Axis::Z, sign: 1.0 },
        Key::A => Move { axis: Axis::X, sign: -1.0 },
        Key::D => Move { axis: Axis::X, sign: 1.0 },
        Key::Q => Move { axis: Axis::Y, sign: -1.0 },
        Key::E => Move { axis: Axis::Y, sign: 1.0 },
        Key::I => Rotate { axis: Axis::X, sign: 1.0 },
        Key::K => Rotate { axis: Axis::X, sign: -1.0 },
        Key::J => Rotate { axis: Axis::Y, sign: 1.0 },
        Key::L => Rotate { axis: Axis::Y, sign: -1.0 },
        Key::U => Rotate { axis: Axis::Z, sign: 1.0 },
        Key::O => Rotate { axis: Axis::Z, sign: -1.0 },
        Key::P => ToggleWireframe,
        Key::Space => ToggleCapture,
        Key::Other => return None,
    };
    Some(binding)
}
