use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Host mirror of the GPU accumulator block.
///
/// Layout must match the WGSL `ForceSums` struct exactly: two `array<i32, 4>`
/// fields, 16-byte aligned, 32 bytes total. `sum_force.w` counts fragment
/// invocations; `sum_torque.w` is reserved and stays zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ForceSums {
    pub sum_force: [i32; 4],
    pub sum_torque: [i32; 4],
}

impl ForceSums {
    pub const ZERO: Self = Self {
        sum_force: [0; 4],
        sum_torque: [0; 4],
    };

    /// Byte size of the block, as the shader must declare it.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Number of fragment invocations that contributed this frame.
    pub fn invocations(&self) -> i32 {
        self.sum_force[3]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Wrapping component-wise add, matching GPU atomic add semantics.
    pub fn accumulate(&mut self, force: [i32; 4], torque: [i32; 4]) {
        for i in 0..4 {
            self.sum_force[i] = self.sum_force[i].wrapping_add(force[i]);
            self.sum_torque[i] = self.sum_torque[i].wrapping_add(torque[i]);
        }
    }
}

/// One frame's console report.
///
/// Format (version 1):
///
/// ```text
/// frame: 7
/// torque for frame: (1,2,3,0)
/// summed Force for frame: (4,5,6,9)
///
///
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub sums: ForceSums,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [tx, ty, tz, tw] = self.sums.sum_torque;
        let [fx, fy, fz, fw] = self.sums.sum_force;
        writeln!(f, "frame: {}", self.frame)?;
        writeln!(f, "torque for frame: ({tx},{ty},{tz},{tw})")?;
        writeln!(f, "summed Force for frame: ({fx},{fy},{fz},{fw})")?;
        writeln!(f)?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_32_bytes() {
        assert_eq!(ForceSums::SIZE, 32);
        assert_eq!(std::mem::align_of::<ForceSums>(), 4);
    }

    #[test]
    fn bytes_are_force_then_torque() {
        let sums = ForceSums {
            sum_force: [1, 2, 3, 4],
            sum_torque: [5, 6, 7, 8],
        };
        let words: &[i32] = bytemuck::cast_slice(bytemuck::bytes_of(&sums));
        assert_eq!(words, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn accumulate_wraps_like_atomics() {
        let mut sums = ForceSums::ZERO;
        sums.accumulate([i32::MAX, 0, 0, 1], [0; 4]);
        sums.accumulate([1, -2, 0, 1], [3, 0, 0, 0]);
        assert_eq!(sums.sum_force, [i32::MIN, -2, 0, 2]);
        assert_eq!(sums.sum_torque, [3, 0, 0, 0]);
        assert_eq!(sums.invocations(), 2);
    }

    #[test]
    fn report_format() {
        let report = FrameReport {
            frame: 3,
            sums: ForceSums {
                sum_force: [-10, 20, 0, 42],
                sum_torque: [1, -2, 3, 0],
            },
        };
        assert_eq!(
            report.to_string(),
            "frame: 3\n\
             torque for frame: (1,-2,3,0)\n\
             summed Force for frame: (-10,20,0,42)\n\
             \n\
             \n"
        );
    }
}
