//! Window-free run on the CPU accumulation target.
//!
//! Each triangle contributes one fragment at its centroid, so the magnitudes
//! are per-triangle rather than per-pixel. The frame cycle is the same one the
//! GPU path runs: bind, draw, barrier, read and reset.

use crate::clock::FrameClock;
use airdrag_accum::{CpuForceTarget, FORCE_SUMS_BINDING, Fragment, FrameReport, sequential_sums};
use airdrag_assets::Mesh;
use airdrag_camera::Camera;
use airdrag_render_wgpu::ViewSettings;
use anyhow::{Result, bail};
use glam::{Mat4, Vec3};

/// One fragment per triangle, in world space.
pub fn mesh_fragments(mesh: &Mesh, model: Mat4) -> Vec<Fragment> {
    mesh.indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let mut position = Vec3::ZERO;
            let mut normal = Vec3::ZERO;
            for &i in tri {
                position += *mesh.positions.get(i as usize)?;
                normal += *mesh.normals.get(i as usize)?;
            }
            let normal = model.transform_vector3(normal).try_normalize()?;
            Some(Fragment::new(
                model.transform_point3(position / 3.0),
                normal,
            ))
        })
        .collect()
}

/// Run `frames` ticks, handing each report to `sink`.
pub fn drive(
    mesh: &Mesh,
    frames: u64,
    workers: usize,
    mut sink: impl FnMut(&FrameReport) -> Result<()>,
) -> Result<()> {
    let settings = ViewSettings::default();
    let fragments = mesh_fragments(mesh, settings.model());
    let center = settings.torque_center;
    let mut camera = Camera::new();
    let mut clock = FrameClock::new(std::time::Instant::now());
    let mut target = CpuForceTarget::new(FORCE_SUMS_BINDING);

    tracing::info!(
        fragments = fragments.len(),
        frames,
        workers,
        "headless run"
    );

    while clock.frames() < frames {
        clock.tick();
        camera.update();
        let flow = camera.forward();

        target.bind(FORCE_SUMS_BINDING)?;
        target.draw(&fragments, flow, center, workers)?;
        tracing::trace!(
            visible = target.read_unsynchronized().invocations(),
            "before barrier"
        );
        target.barrier()?;
        let report = target.read_and_reset()?;

        if report.sums != sequential_sums(&fragments, flow, center) {
            bail!(
                "frame {}: concurrent sums differ from the sequential reference",
                report.frame
            );
        }
        sink(&report)?;
    }
    Ok(())
}
