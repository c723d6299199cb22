//! Operator camera for the airdrag viewer.
//!
//! Position and euler rotation advance once per render tick by fixed-step
//! velocities. Velocities change only on discrete key edges; the drag gesture
//! overwrites rotation absolutely.
//!
//! # Invariants
//! - Every velocity component is zero or exactly one configured step.
//! - `update` is the only place state integrates over time.
//! - The view matrix is a pure function of position and rotation.

mod camera;

pub use camera::{Axis, Camera, CameraSettings};
