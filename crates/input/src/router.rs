use crate::bindings::{Binding, binding_for};
use crate::event::{ButtonState, InputEvent};
use airdrag_camera::{Camera, CameraSettings};
use glam::{DVec2, Vec3};
use std::f64::consts::PI;

/// A view toggle flipped by the router. The windowing layer applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Wireframe(bool),
    Capture(bool),
}

/// Anchor of the current drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    origin: DVec2,
    rotation: Vec3,
}

/// Translates [`InputEvent`]s into camera mutations and toggles.
#[derive(Debug, Clone)]
pub struct InputRouter {
    settings: CameraSettings,
    viewport: DVec2,
    cursor: DVec2,
    /// Set when capture ends: the virtual cursor no longer matches the OS
    /// pointer until the next absolute report.
    cursor_stale: bool,
    mouse_pressed: bool,
    captured: bool,
    wireframe: bool,
    anchor: DragAnchor,
}

impl InputRouter {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        Self {
            settings,
            viewport: viewport(width, height),
            cursor: DVec2::ZERO,
            cursor_stale: false,
            mouse_pressed: false,
            captured: false,
            wireframe: false,
            anchor: DragAnchor {
                origin: DVec2::ZERO,
                rotation: Vec3::ZERO,
            },
        }
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn captured(&self) -> bool {
        self.captured
    }

    /// Whether pointer motion currently rotates the camera.
    pub fn dragging(&self) -> bool {
        self.mouse_pressed || self.captured
    }

    /// Apply one event. Returns the toggle it flipped, if any.
    pub fn handle(&mut self, event: InputEvent, camera: &mut Camera) -> Option<Toggle> {
        match event {
            InputEvent::Key { repeat: true, .. } => None,
            InputEvent::Key { key, state, .. } => {
                let binding = binding_for(key)?;
                self.apply_binding(binding, state, camera)
            }
            InputEvent::MouseButton { state } => {
                self.mouse_pressed = state.is_pressed();
                if self.mouse_pressed {
                    self.reanchor(camera);
                }
                None
            }
            InputEvent::CursorMoved { x, y } => {
                // A captured cursor is pinned by the window system; raw
                // motion drives the virtual cursor instead.
                if self.captured {
                    return None;
                }
                let to = DVec2::new(x, y);
                if self.cursor_stale {
                    self.cursor_stale = false;
                    self.cursor = to;
                    self.reanchor(camera);
                } else {
                    self.move_cursor(to, camera);
                }
                None
            }
            InputEvent::MouseMotion { dx, dy } => {
                if self.captured {
                    self.move_cursor(self.cursor + DVec2::new(dx, dy), camera);
                }
                None
            }
            InputEvent::Resized { width, height } => {
                self.viewport = viewport(width, height);
                None
            }
        }
    }

    fn apply_binding(
        &mut self,
        binding: Binding,
        state: ButtonState,
        camera: &mut Camera,
    ) -> Option<Toggle> {
        let pressed = state.is_pressed();
        match binding {
            Binding::Move { axis, sign } => {
                let step = sign * self.settings.move_step;
                if pressed {
                    camera.set_velocity_axis(axis, step);
                } else {
                    camera.release_velocity_axis(axis, step);
                }
                None
            }
            Binding::Rotate { axis, sign } => {
                let step = sign * self.settings.rotate_step;
                if pressed {
                    camera.set_rotation_velocity_axis(axis, step);
                } else {
                    camera.release_rotation_velocity_axis(axis, step);
                }
                None
            }
            Binding::ToggleWireframe if pressed => {
                self.wireframe = !self.wireframe;
                tracing::debug!(wireframe = self.wireframe, "toggled polygon mode");
                Some(Toggle::Wireframe(self.wireframe))
            }
            Binding::ToggleCapture if pressed => {
                self.captured = !self.captured;
                self.cursor_stale = !self.captured;
                self.reanchor(camera);
                tracing::debug!(captured = self.captured, "toggled mouse capture");
                Some(Toggle::Capture(self.captured))
            }
            Binding::ToggleWireframe | Binding::ToggleCapture => None,
        }
    }

    fn reanchor(&mut self, camera: &Camera) {
        self.anchor = DragAnchor {
            origin: self.cursor,
            rotation: camera.rotation,
        };
    }

    fn move_cursor(&mut self, to: DVec2, camera: &mut Camera) {
        self.cursor = to;
        if !self.dragging() {
            return;
        }
        let delta = (self.cursor - self.anchor.origin) / self.viewport * PI;
        // Horizontal motion yaws, vertical motion pitches.
        let offset = Vec3::new(-delta.y as f32, -delta.x as f32, 0.0);
        camera.set_rotation(self.anchor.rotation + offset);
    }
}

fn viewport(width: u32, height: u32) -> DVec2 {
    DVec2::new(width.max(1) as f64, height.max(1) as f64)
}
