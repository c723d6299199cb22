use crate::binding::BindingPoint;

/// Phase of the per-frame accumulation cycle.
///
/// `Zeroed -> Bound -> Written -> Barriered -> Mapped -> Reported -> Zeroed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumPhase {
    /// Accumulators hold zero; ready for the next draw.
    Zeroed,
    /// Buffer bound at the pipeline's storage binding.
    Bound,
    /// Draw recorded/issued; GPU-side writes may be in flight.
    Written,
    /// All writes are visible to the host.
    Barriered,
    /// Host holds a read mapping.
    Mapped,
    /// Values copied out and handed to the report sink.
    Reported,
}

impl AccumPhase {
    fn next(self) -> AccumPhase {
        match self {
            AccumPhase::Zeroed => AccumPhase::Bound,
            AccumPhase::Bound => AccumPhase::Written,
            AccumPhase::Written => AccumPhase::Barriered,
            AccumPhase::Barriered => AccumPhase::Mapped,
            AccumPhase::Mapped => AccumPhase::Reported,
            AccumPhase::Reported => AccumPhase::Zeroed,
        }
    }
}

/// Errors from the accumulation protocol.
#[derive(Debug, thiserror::Error)]
pub enum AccumError {
    #[error("accumulation cycle out of order: {from:?} cannot advance to {to:?}")]
    OutOfOrder { from: AccumPhase, to: AccumPhase },
    #[error("force buffer bound at {actual}, pipeline declares {expected}")]
    BindingMismatch {
        expected: BindingPoint,
        actual: BindingPoint,
    },
    #[error("force buffer map failed: {0}")]
    Map(String),
    #[error("accumulation worker panicked")]
    WorkerPanicked,
}

/// Tracks one force buffer through its per-frame cycle.
///
/// Every backend drives the same transitions; skipping the barrier or
/// drawing into an unreset buffer is an [`AccumError::OutOfOrder`].
#[derive(Debug, Clone)]
pub struct AccumulationCycle {
    phase: AccumPhase,
    binding: BindingPoint,
    frame: u64,
}

impl AccumulationCycle {
    pub fn new(binding: BindingPoint) -> Self {
        Self {
            phase: AccumPhase::Zeroed,
            binding,
            frame: 0,
        }
    }

    pub fn phase(&self) -> AccumPhase {
        self.phase
    }

    /// Binding point the pipeline was configured with.
    pub fn binding(&self) -> BindingPoint {
        self.binding
    }

    /// Index of the frame currently in the cycle. Starts at 0.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn bind(&mut self, at: BindingPoint) -> Result<(), AccumError> {
        if at != self.binding {
            return Err(AccumError::BindingMismatch {
                expected: self.binding,
                actual: at,
            });
        }
        self.advance(AccumPhase::Bound)
    }

    pub fn written(&mut self) -> Result<(), AccumError> {
        self.advance(AccumPhase::Written)
    }

    pub fn barrier(&mut self) -> Result<(), AccumError> {
        self.advance(AccumPhase::Barriered)
    }

    pub fn mapped(&mut self) -> Result<(), AccumError> {
        self.advance(AccumPhase::Mapped)
    }

    pub fn reported(&mut self) -> Result<(), AccumError> {
        self.advance(AccumPhase::Reported)
    }

    /// Close the cycle: the buffer is zeroed and the next frame begins.
    pub fn reset(&mut self) -> Result<(), AccumError> {
        self.advance(AccumPhase::Zeroed)?;
        self.frame += 1;
        Ok(())
    }

    fn advance(&mut self, to: AccumPhase) -> Result<(), AccumError> {
        if self.phase.next() != to {
            return Err(AccumError::OutOfOrder {
                from: self.phase,
                to,
            });
        }
        tracing::trace!(frame = self.frame, from = ?self.phase, ?to, "accumulation phase");
        self.phase = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FORCE_SUMS_BINDING;

    fn run_frame(cycle: &mut AccumulationCycle) {
        cycle.bind(FORCE_SUMS_BINDING).unwrap();
        cycle.written().unwrap();
        cycle.barrier().unwrap();
        cycle.mapped().unwrap();
        cycle.reported().unwrap();
        cycle.reset().unwrap();
    }

    #[test]
    fn full_cycle_returns_to_zeroed() {
        let mut cycle = AccumulationCycle::new(FORCE_SUMS_BINDING);
        run_frame(&mut cycle);
        assert_eq!(cycle.phase(), AccumPhase::Zeroed);
        assert_eq!(cycle.frame(), 1);
        run_frame(&mut cycle);
        assert_eq!(cycle.frame(), 2);
    }

    #[test]
    fn read_before_barrier_is_rejected() {
        let mut cycle = AccumulationCycle::new(FORCE_SUMS_BINDING);
        cycle.bind(FORCE_SUMS_BINDING).unwrap();
        cycle.written().unwrap();
        let err = cycle.mapped().unwrap_err();
        assert!(matches!(
            err,
            AccumError::OutOfOrder {
                from: AccumPhase::Written,
                to: AccumPhase::Mapped
            }
        ));
        assert_eq!(cycle.phase(), AccumPhase::Written);
    }

    #[test]
    fn draw_into_unreset_buffer_is_rejected() {
        let mut cycle = AccumulationCycle::new(FORCE_SUMS_BINDING);
        cycle.bind(FORCE_SUMS_BINDING).unwrap();
        cycle.written().unwrap();
        cycle.barrier().unwrap();
        cycle.mapped().unwrap();
        cycle.reported().unwrap();
        assert!(cycle.bind(FORCE_SUMS_BINDING).is_err());
    }

    #[test]
    fn binding_mismatch_is_rejected() {
        let mut cycle = AccumulationCycle::new(FORCE_SUMS_BINDING);
        let other = BindingPoint {
            group: 0,
            binding: 2,
        };
        let err = cycle.bind(other).unwrap_err();
        assert!(matches!(err, AccumError::BindingMismatch { .. }));
        assert_eq!(cycle.phase(), AccumPhase::Zeroed);
    }
}
