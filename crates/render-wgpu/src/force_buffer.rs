//! GPU side of the force accumulation buffer.
//!
//! Per frame:
//! 1. [`ForceBuffer::bind`] inside the render pass, before the draw.
//! 2. [`ForceBuffer::written`] once the draw is recorded.
//! 3. [`ForceBuffer::barrier`] with the finished pass's encoder: copy-out and
//!    clear are appended after the draw in the same submission, the host waits
//!    for completion and maps the copy.
//! 4. [`MappedSums::read_and_reset`] copies the values out and releases the
//!    mapping. The storage block was already cleared by step 3, so the next
//!    draw starts from zero.

use crate::RenderError;
use airdrag_accum::{
    AccumError, AccumPhase, AccumulationCycle, FORCE_SUMS_BINDING, ForceSums, FrameReport,
};
use std::sync::mpsc;
use wgpu::util::DeviceExt;

pub struct ForceBuffer {
    storage: wgpu::Buffer,
    readback: wgpu::Buffer,
    cycle: AccumulationCycle,
}

impl ForceBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let storage = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("force_sums"),
            contents: bytemuck::bytes_of(&ForceSums::ZERO),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("force_sums_readback"),
            size: ForceSums::SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            storage,
            readback,
            cycle: AccumulationCycle::new(FORCE_SUMS_BINDING),
        }
    }

    /// Layout entry for the storage block, sized to the host mirror.
    pub fn layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: FORCE_SUMS_BINDING.binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(ForceSums::SIZE),
            },
            count: None,
        }
    }

    pub fn bind_group_entry(&self) -> wgpu::BindGroupEntry<'_> {
        wgpu::BindGroupEntry {
            binding: FORCE_SUMS_BINDING.binding,
            resource: self.storage.as_entire_binding(),
        }
    }

    /// Bind the block (via the bind group that contains it) for the draw.
    pub fn bind(
        &mut self,
        pass: &mut wgpu::RenderPass<'_>,
        bind_group: &wgpu::BindGroup,
    ) -> Result<(), AccumError> {
        self.cycle.bind(FORCE_SUMS_BINDING)?;
        pass.set_bind_group(FORCE_SUMS_BINDING.group, bind_group, &[]);
        Ok(())
    }

    /// Mark the draw that writes the block as recorded.
    pub fn written(&mut self) -> Result<(), AccumError> {
        self.cycle.written()
    }

    /// Submit `encoder` with copy-out and clear appended, then wait until the
    /// copy is host-visible. The returned guard unmaps on drop.
    pub fn barrier(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mut encoder: wgpu::CommandEncoder,
    ) -> Result<MappedSums<'_>, RenderError> {
        if self.cycle.phase() != AccumPhase::Written {
            return Err(AccumError::OutOfOrder {
                from: self.cycle.phase(),
                to: AccumPhase::Barriered,
            }
            .into());
        }

        encoder.copy_buffer_to_buffer(&self.storage, 0, &self.readback, 0, ForceSums::SIZE);
        encoder.clear_buffer(&self.storage, 0, None);
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        self.readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        let _ = device.poll(wgpu::Maintain::Wait);
        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(AccumError::Map(e.to_string()).into()),
            Err(_) => {
                return Err(AccumError::Map("map callback never ran".into()).into());
            }
        }

        self.cycle.barrier()?;
        let view = self.readback.slice(..).get_mapped_range();
        Ok(MappedSums {
            buffer: &self.readback,
            cycle: &mut self.cycle,
            view: Some(view),
        })
    }
}

/// Host read mapping of the frame's sums. Unmapped on drop on every path.
pub struct MappedSums<'a> {
    buffer: &'a wgpu::Buffer,
    cycle: &'a mut AccumulationCycle,
    view: Option<wgpu::BufferView<'a>>,
}

impl MappedSums<'_> {
    /// Copy the sums out, release the mapping and close the frame's cycle.
    pub fn read_and_reset(mut self) -> Result<FrameReport, AccumError> {
        self.cycle.mapped()?;
        let sums: ForceSums = match &self.view {
            Some(view) => bytemuck::pod_read_unaligned(&view[..ForceSums::SIZE as usize]),
            None => return Err(AccumError::Map("mapping already released".into())),
        };
        let frame = self.cycle.frame();
        self.cycle.reported()?;
        self.release();
        self.cycle.reset()?;
        Ok(FrameReport { frame, sums })
    }

    fn release(&mut self) {
        if let Some(view) = self.view.take() {
            drop(view);
            self.buffer.unmap();
        }
    }
}

impl Drop for MappedSums<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
