//! Host-side implementation of the accumulation protocol.
//!
//! Worker threads stand in for fragment invocations: each performs unordered
//! atomic adds into a shared block, and `barrier` joins them. Used by the
//! viewer's headless run and to check the protocol against a sequential
//! reference without a GPU.

use crate::binding::BindingPoint;
use crate::fragment::Fragment;
use crate::protocol::{AccumError, AccumulationCycle};
use crate::sums::{ForceSums, FrameReport};
use glam::Vec3;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::JoinHandle;

const LANES: usize = 8;

/// Single-threaded sum of every fragment's contribution.
pub fn sequential_sums(fragments: &[Fragment], flow: Vec3, center: Vec3) -> ForceSums {
    let mut sums = ForceSums::ZERO;
    for fragment in fragments {
        let (force, torque) = fragment.contribution(flow, center);
        sums.accumulate(force, torque);
    }
    sums
}

/// CPU force accumulation target with GPU-like write concurrency.
pub struct CpuForceTarget {
    lanes: Arc<[AtomicI32; LANES]>,
    in_flight: Vec<JoinHandle<()>>,
    cycle: AccumulationCycle,
}

impl CpuForceTarget {
    pub fn new(binding: BindingPoint) -> Self {
        Self {
            lanes: Arc::new(std::array::from_fn(|_| AtomicI32::new(0))),
            in_flight: Vec::new(),
            cycle: AccumulationCycle::new(binding),
        }
    }

    pub fn cycle(&self) -> &AccumulationCycle {
        &self.cycle
    }

    pub fn bind(&mut self, at: BindingPoint) -> Result<(), AccumError> {
        self.cycle.bind(at)
    }

    /// Launch a draw. Fragments are split across `workers` threads that run
    /// concurrently with the caller until [`CpuForceTarget::barrier`].
    pub fn draw(
        &mut self,
        fragments: &[Fragment],
        flow: Vec3,
        center: Vec3,
        workers: usize,
    ) -> Result<(), AccumError> {
        self.launch(fragments, flow, center, workers, None)
    }

    /// Spawn the workers. With a `gate`, each worker waits on it before its
    /// first write.
    fn launch(
        &mut self,
        fragments: &[Fragment],
        flow: Vec3,
        center: Vec3,
        workers: usize,
        gate: Option<Arc<Barrier>>,
    ) -> Result<(), AccumError> {
        self.cycle.written()?;
        if fragments.is_empty() {
            return Ok(());
        }
        let chunk = fragments.len().div_ceil(workers.max(1));
        for part in fragments.chunks(chunk) {
            let part = part.to_vec();
            let lanes = Arc::clone(&self.lanes);
            let gate = gate.clone();
            self.in_flight.push(std::thread::spawn(move || {
                if let Some(gate) = gate {
                    gate.wait();
                }
                for fragment in part {
                    let (force, torque) = fragment.contribution(flow, center);
                    for i in 0..4 {
                        lanes[i].fetch_add(force[i], Ordering::Relaxed);
                        lanes[4 + i].fetch_add(torque[i], Ordering::Relaxed);
                    }
                }
            }));
        }
        tracing::debug!(
            fragments = fragments.len(),
            workers = self.in_flight.len(),
            "cpu draw launched"
        );
        Ok(())
    }

    /// Wait for every in-flight write; afterwards all of them are visible.
    pub fn barrier(&mut self) -> Result<(), AccumError> {
        let mut panicked = false;
        for handle in self.in_flight.drain(..) {
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(AccumError::WorkerPanicked);
        }
        self.cycle.barrier()
    }

    /// Copy the accumulators out and zero them in one step.
    pub fn read_and_reset(&mut self) -> Result<FrameReport, AccumError> {
        self.cycle.mapped()?;
        let mut words = [0i32; LANES];
        for (word, lane) in words.iter_mut().zip(self.lanes.iter()) {
            *word = lane.swap(0, Ordering::AcqRel);
        }
        let sums: ForceSums = bytemuck::cast(words);
        let frame = self.cycle.frame();
        self.cycle.reported()?;
        self.cycle.reset()?;
        Ok(FrameReport { frame, sums })
    }

    /// Whatever is currently visible, with no synchronization against
    /// in-flight writers. Does not advance the cycle.
    pub fn read_unsynchronized(&self) -> ForceSums {
        let mut words = [0i32; LANES];
        for (word, lane) in words.iter_mut().zip(self.lanes.iter()) {
            *word = lane.load(Ordering::Relaxed);
        }
        bytemuck::cast(words)
    }
}

impl Drop for CpuForceTarget {
    fn drop(&mut self) {
        for handle in self.in_flight.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FORCE_SUMS_BINDING;
    use crate::protocol::AccumPhase;

    const FLOW: Vec3 = Vec3::NEG_Z;
    const CENTER: Vec3 = Vec3::new(0.0, 0.0, -2.0);

    fn frame(
        target: &mut CpuForceTarget,
        fragments: &[Fragment],
        workers: usize,
    ) -> FrameReport {
        target.bind(FORCE_SUMS_BINDING).unwrap();
        target.draw(fragments, FLOW, CENTER, workers).unwrap();
        target.barrier().unwrap();
        target.read_and_reset().unwrap()
    }

    /// A plate facing the flow, sampled on a grid.
    fn plate(n: usize) -> Vec<Fragment> {
        (0..n)
            .map(|i| {
                let x = (i % 64) as f32 * 0.01 - 0.32;
                let y = (i / 64) as f32 * 0.01;
                Fragment::new(Vec3::new(x, y, -2.0), Vec3::Z)
            })
            .collect()
    }

    #[test]
    fn empty_draw_reads_zero_every_frame() {
        let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);
        for i in 0..100 {
            let report = frame(&mut target, &[], 4);
            assert_eq!(report.frame, i);
            assert!(report.sums.is_zero());
        }
    }

    #[test]
    fn each_frame_reports_only_its_own_draw() {
        let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);
        let unit = Fragment::new(CENTER, Vec3::Z);
        let (force, torque) = unit.contribution(FLOW, CENTER);
        for (k, count) in [5usize, 0, 1000, 17, 3].into_iter().enumerate() {
            let fragments = vec![unit; count];
            let report = frame(&mut target, &fragments, 8);
            assert_eq!(report.frame, k as u64);
            assert_eq!(report.sums.invocations(), count as i32);
            assert_eq!(report.sums.sum_force[2], force[2] * count as i32);
            assert_eq!(report.sums.sum_torque, [torque[0] * count as i32, 0, 0, 0]);
        }
    }

    #[test]
    fn barrier_makes_concurrent_sum_match_sequential() {
        let fragments = plate(20_000);
        let expected = sequential_sums(&fragments, FLOW, CENTER);
        assert_eq!(expected.invocations(), 20_000);
        let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);
        for _ in 0..10 {
            let report = frame(&mut target, &fragments, 8);
            assert_eq!(report.sums, expected);
        }
    }

    #[test]
    fn reads_without_barrier_miss_in_flight_writes() {
        let fragments = plate(50_000);
        let expected = sequential_sums(&fragments, FLOW, CENTER);
        let workers = 8;
        let chunks = fragments.len().div_ceil(workers);
        let parties = fragments.chunks(chunks).count() + 1;
        let gate = Arc::new(Barrier::new(parties));

        let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);
        target.bind(FORCE_SUMS_BINDING).unwrap();
        target
            .launch(&fragments, FLOW, CENTER, workers, Some(Arc::clone(&gate)))
            .unwrap();

        // Every worker is parked before its first write.
        let early = target.read_unsynchronized();
        assert!(early.is_zero());
        assert_ne!(early, expected);

        // The protocol refuses to map before the barrier.
        assert!(matches!(
            target.read_and_reset(),
            Err(AccumError::OutOfOrder { .. })
        ));

        gate.wait();
        target.barrier().unwrap();
        assert_eq!(target.read_unsynchronized(), expected);
        let report = target.read_and_reset().unwrap();
        assert_eq!(report.sums, expected);
        assert_eq!(target.cycle().phase(), AccumPhase::Zeroed);
        assert!(target.read_unsynchronized().is_zero());
    }

    #[test]
    fn draw_requires_bind() {
        let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);
        assert!(target.draw(&plate(4), FLOW, CENTER, 1).is_err());
    }
}
