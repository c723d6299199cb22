//! Force Accumulation Buffer (FAB) protocol.
//!
//! A fixed-layout block of integer accumulators is written concurrently by
//! fragment invocations (atomic adds) and read back by the host once per frame.
//!
//! # Invariants
//! - The accumulators read zero at the start of every frame's draw.
//! - During a draw they are only ever incremented.
//! - The host reads only after the barrier, and the read is followed by a
//!   reset before any further draw. Contents never carry across frames.
//! - There is exactly one binding point, [`FORCE_SUMS_BINDING`].

pub mod binding;
pub mod fragment;
pub mod protocol;
pub mod reference;
pub mod sums;

pub use binding::{BindingPoint, FORCE_SUMS_BINDING};
pub use fragment::{FORCE_SCALE, Fragment};
pub use protocol::{AccumError, AccumPhase, AccumulationCycle};
pub use reference::{CpuForceTarget, sequential_sums};
pub use sums::{ForceSums, FrameReport};
