use std::fmt;

/// A storage-block binding slot: bind group index plus binding index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingPoint {
    pub group: u32,
    pub binding: u32,
}

impl fmt::Display for BindingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@group({}) @binding({})", self.group, self.binding)
    }
}

/// The one binding point the force accumulators live at.
///
/// Pipeline layout, bind group, and shader source are all derived from this
/// value. Nothing else picks a storage binding index.
pub const FORCE_SUMS_BINDING: BindingPoint = BindingPoint {
    group: 0,
    binding: 1,
};
