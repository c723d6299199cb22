//! Input routing: raw key/mouse edges mapped onto camera state and toggles.
//!
//! The windowing layer translates its native events into [`InputEvent`] and
//! feeds them to [`InputRouter::handle`]. Nothing here depends on a window,
//! so every gesture can be replayed in tests.
//!
//! # Invariants
//! - Auto-repeat key events never touch camera state.
//! - Drag rotation is always snapshot + displacement, never incremental.

pub mod bindings;
pub mod event;
pub mod router;

pub use bindings::{Binding, binding_for};
pub use event::{ButtonState, InputEvent, Key};
pub use router::{InputRouter, Toggle};
