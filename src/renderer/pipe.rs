//! Pipe renderer: ring expansion and debug overlays.
//!
//! Three pipelines share one packed vertex buffer:
//! - **Surface pass**: for each consecutive node pair, the vertex shader
//!   generates a triangle strip between the two expansion rings. The ring
//!   math (rotate the tangent about the normal, scale by the radius in the
//!   tangent's w channel) runs entirely on the GPU; the zero radii at the
//!   boundary nodes collapse the cap rings to points, closing the tube.
//! - **Frame-ray pass** (debug): each node's normal (red) and tangent
//!   (green) drawn as short rays.
//! - **Centerline pass** (debug): the spine drawn through the static
//!   line-segment index list.

use crate::controller::PipeVertex;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::DEPTH_FORMAT;
use crate::options::DebugOptions;

/// Radial segments per expansion ring. Must match the shader constant.
const RADIAL_SEGMENTS: u32 = 16;

/// Strip vertices per node pair: two ring vertices per radial step, with
/// the seam vertex repeated to close the ring.
const STRIP_VERTICES: u32 = 2 * (RADIAL_SEGMENTS + 1);

/// Vertices per node in the frame-ray pass: two two-point rays.
const RAY_VERTICES: u32 = 4;

const VERTEX_STRIDE: wgpu::BufferAddress =
    size_of::<PipeVertex>() as wgpu::BufferAddress;

/// Attribute layout of one [`PipeVertex`], starting at `base_location`.
const fn node_attributes(
    base_location: u32,
) -> [wgpu::VertexAttribute; 4] {
    [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: base_location, // position
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: base_location + 1, // normal
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 24,
            shader_location: base_location + 2, // tangent + radius
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 40,
            shader_location: base_location + 3, // color
        },
    ]
}

/// Renders the pipe from the controller's packed vertex data.
pub struct PipeRenderer {
    surface_pipeline: wgpu::RenderPipeline,
    frame_ray_pipeline: wgpu::RenderPipeline,
    centerline_pipeline: wgpu::RenderPipeline,
    vertex_buffer: DynamicBuffer,
    index_buffer: DynamicBuffer,
    index_count: u32,
    node_count: u32,
}

impl PipeRenderer {
    /// Create the renderer and upload the initial vertex and index data.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        vertices: &[PipeVertex],
        indices: &[u32],
    ) -> Self {
        let vertex_buffer = DynamicBuffer::new_with_data(
            &context.device,
            "Pipe Vertex Buffer",
            vertices,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = DynamicBuffer::new_with_data(
            &context.device,
            "Pipe Index Buffer",
            indices,
            wgpu::BufferUsages::INDEX,
        );

        let shader = context
            .device
            .create_shader_module(wgpu::include_wgsl!(
                "../../assets/shaders/pipe.wgsl"
            ));
        let pipeline_layout = context.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Pipe Pipeline Layout"),
                bind_group_layouts: &[camera_layout],
                push_constant_ranges: &[],
            },
        );

        let surface_pipeline =
            Self::create_surface_pipeline(context, &pipeline_layout, &shader);
        let frame_ray_pipeline = Self::create_line_pipeline(
            context,
            &pipeline_layout,
            &shader,
            "Pipe Frame Ray Pipeline",
            "vs_frame_rays",
            "fs_lines",
            wgpu::VertexStepMode::Instance,
        );
        let centerline_pipeline = Self::create_line_pipeline(
            context,
            &pipeline_layout,
            &shader,
            "Pipe Centerline Pipeline",
            "vs_centerline",
            "fs_lines",
            wgpu::VertexStepMode::Vertex,
        );

        Self {
            surface_pipeline,
            frame_ray_pipeline,
            centerline_pipeline,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            node_count: vertices.len() as u32,
        }
    }

    fn create_surface_pipeline(
        context: &RenderContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        // Two views of the same buffer, one node apart: the shader reads
        // the segment's start node from slot 0 and its end node from
        // slot 1, one instance per segment.
        let segment_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &node_attributes(0),
            },
            wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &node_attributes(4),
            },
        ];

        context.device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some("Pipe Surface Pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_surface"),
                    buffers: &segment_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_surface"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: context.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    // Strip winding flips between degenerate cap rings;
                    // shade both sides instead of culling.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            },
        )
    }

    fn create_line_pipeline(
        context: &RenderContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        label: &str,
        vertex_entry: &str,
        fragment_entry: &str,
        step_mode: wgpu::VertexStepMode,
    ) -> wgpu::RenderPipeline {
        let node_layout = [wgpu::VertexBufferLayout {
            array_stride: VERTEX_STRIDE,
            step_mode,
            attributes: &node_attributes(0),
        }];

        context.device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(vertex_entry),
                    buffers: &node_layout,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: context.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            },
        )
    }

    /// Upload this frame's packed vertices. The index list is rewritten
    /// only when the node count changes.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[PipeVertex],
        indices: &[u32],
    ) {
        let _ = self.vertex_buffer.write(device, queue, vertices);
        self.node_count = vertices.len() as u32;

        if indices.len() as u32 != self.index_count {
            let _ = self.index_buffer.write(device, queue, indices);
            self.index_count = indices.len() as u32;
        }
    }

    /// Record draw calls for the surface and any enabled debug overlays.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        debug: &DebugOptions,
    ) {
        if self.node_count < 2 {
            return;
        }

        render_pass.set_bind_group(0, camera_bind_group, &[]);

        render_pass.set_pipeline(&self.surface_pipeline);
        render_pass
            .set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
        render_pass.set_vertex_buffer(
            1,
            self.vertex_buffer.buffer().slice(VERTEX_STRIDE..),
        );
        render_pass.draw(0..STRIP_VERTICES, 0..self.node_count - 1);

        if debug.show_spine && self.index_count > 0 {
            render_pass.set_pipeline(&self.centerline_pipeline);
            render_pass
                .set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.set_index_buffer(
                self.index_buffer.buffer().slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        if debug.show_frames {
            render_pass.set_pipeline(&self.frame_ray_pipeline);
            render_pass
                .set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.draw(0..RAY_VERTICES, 0..self.node_count);
        }
    }
}
