use crate::RenderError;
use crate::force_buffer::ForceBuffer;
use crate::layout::validate_force_block;
use crate::scene::{FrameView, ViewSettings};
use crate::shaders::{self, UNIFORM_BINDING};
use airdrag_accum::{FORCE_SUMS_BINDING, FrameReport};
use airdrag_assets::Mesh;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

// One bind group carries both the uniforms and the force sums.
const _: () = assert!(FORCE_SUMS_BINDING.group == 0);
const _: () = assert!(FORCE_SUMS_BINDING.binding != UNIFORM_BINDING);

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    center: [f32; 4],
    flow: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

fn vertices(mesh: &Mesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| Vertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect()
}

/// Check the adapter can run the accumulation pass. Returns the optional
/// features worth requesting.
pub fn required_features(adapter: &wgpu::Adapter) -> Result<wgpu::Features, RenderError> {
    let downlevel = adapter.get_downlevel_capabilities();
    if !downlevel
        .flags
        .contains(wgpu::DownlevelFlags::FRAGMENT_WRITABLE_STORAGE)
    {
        return Err(RenderError::Unsupported(
            "storage buffer writes from the fragment stage",
        ));
    }
    Ok(adapter.features() & wgpu::Features::POLYGON_MODE_LINE)
}

/// Draws the airfoil and accumulates fragment forces into a [`ForceBuffer`].
pub struct DragRenderer {
    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: Option<wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
    depth_texture: wgpu::TextureView,
    force: ForceBuffer,
    settings: ViewSettings,
}

impl DragRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        mesh: &Mesh,
        settings: ViewSettings,
    ) -> Result<Self, RenderError> {
        let source = shaders::drag_shader(FORCE_SUMS_BINDING);
        validate_force_block(&source, FORCE_SUMS_BINDING)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let force = ForceBuffer::new(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drag_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: UNIFORM_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                ForceBuffer::layout_entry(),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drag_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: uniform_buffer.as_entire_binding(),
                },
                force.bind_group_entry(),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("drag_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("drag_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let fill_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PolygonMode::Fill,
        );
        let line_pipeline = device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| {
                Self::create_pipeline(
                    device,
                    &pipeline_layout,
                    &shader,
                    surface_format,
                    wgpu::PolygonMode::Line,
                )
            });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::Pipeline(err.to_string()));
        }

        let index_count = mesh.indices.len() as u32;
        let (vertex_buffer, index_buffer) = if index_count == 0 {
            tracing::warn!(mesh = %mesh.name, "mesh has no triangles; nothing will be drawn");
            (None, None)
        } else {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("airfoil_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices(mesh)),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("airfoil_index_buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (Some(vertex_buffer), Some(index_buffer))
        };

        let depth_texture = Self::create_depth_texture(device, width, height);

        Ok(Self {
            fill_pipeline,
            line_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count,
            depth_texture,
            force,
            settings,
        })
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn supports_wireframe(&self) -> bool {
        self.line_pipeline.is_some()
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame and return its accumulated forces.
    ///
    /// The force buffer is read back and zeroed before this returns, so each
    /// report covers exactly this frame's draw.
    pub fn render_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        frame: &FrameView,
        wireframe: bool,
    ) -> Result<FrameReport, RenderError> {
        let center = self.settings.torque_center;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                model: self.settings.model().to_cols_array_2d(),
                view: frame.view.to_cols_array_2d(),
                proj: frame.projection.to_cols_array_2d(),
                center: center.extend(1.0).to_array(),
                flow: frame.flow.extend(0.0).to_array(),
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("drag_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("drag_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.settings.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let pipeline = match (&self.line_pipeline, wireframe) {
                (Some(line), true) => line,
                _ => &self.fill_pipeline,
            };
            pass.set_pipeline(pipeline);
            self.force.bind(&mut pass, &self.bind_group)?;

            if let (Some(vertices), Some(indices)) = (&self.vertex_buffer, &self.index_buffer) {
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
            self.force.written()?;
        }

        let mapped = self.force.barrier(device, queue, encoder)?;
        Ok(mapped.read_and_reset()?)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        polygon_mode: wgpu::PolygonMode,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(match polygon_mode {
                wgpu::PolygonMode::Line => "drag_pipeline_line",
                _ => "drag_pipeline_fill",
            }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
